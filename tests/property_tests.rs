//! Property tests for strategy invariants.
//!
//! Uses proptest to verify:
//! 1. Statistics - the average sits inside the window, deviation is never negative
//! 2. Bands - the stop is always twice the entry band
//! 3. State machine - at most one rule fires, entries only from flat, exits only from open
//! 4. Determinism - identical inputs give identical decisions

use proptest::prelude::*;
use rust_decimal::Decimal;

use ocean_reversion::domain::{Direction, Position, PositionState, PriceBar, TradeSide};
use ocean_reversion::strategy::state_machine::{rule_applies, transition};
use ocean_reversion::strategy::{compute, derive_bands, PositionStateMachine, RULE_PRIORITY, STOP_LOSS_MULTIPLIER};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Prices with two decimal places between 0.01 and 10,000
fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_window() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(arb_price(), 2..24)
}

fn arb_state() -> impl Strategy<Value = PositionState> {
    prop_oneof![
        Just(PositionState::INITIAL),
        Just(PositionState::flat()),
        Just(PositionState::long()),
        Just(PositionState::short()),
    ]
}

fn bars(closes: &[Decimal]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| PriceBar::new(*close, 1_700_000_000 + 3600 * i as i64))
        .collect()
}

// ── 1. Statistics ────────────────────────────────────────────────────

proptest! {
    /// The average lies between the smallest and largest close.
    #[test]
    fn average_within_window(closes in arb_window()) {
        let stats = compute(&bars(&closes), closes.len()).unwrap();
        let min = closes.iter().copied().min().unwrap();
        let max = closes.iter().copied().max().unwrap();
        prop_assert!(stats.moving_average >= min);
        prop_assert!(stats.moving_average <= max);
        prop_assert!(stats.standard_deviation >= Decimal::ZERO);
    }

    /// Deviation never exceeds the window's range.
    #[test]
    fn deviation_bounded_by_range(closes in arb_window()) {
        let stats = compute(&bars(&closes), closes.len()).unwrap();
        let min = closes.iter().copied().min().unwrap();
        let max = closes.iter().copied().max().unwrap();
        // Allow for rounding in the square root
        prop_assert!(stats.standard_deviation <= (max - min) + Decimal::new(1, 10));
    }

    /// Only the newest `window` bars matter, whatever order they arrive in.
    #[test]
    fn older_bars_ignored(closes in arb_window(), noise in prop::collection::vec(arb_price(), 0..10)) {
        let window = closes.len();
        let mut all: Vec<PriceBar> = noise
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar::new(*close, 1_600_000_000 + i as i64))
            .collect();
        all.extend(bars(&closes));
        all.reverse();

        let with_noise = compute(&all, window).unwrap();
        let clean = compute(&bars(&closes), window).unwrap();
        prop_assert_eq!(with_noise, clean);
    }
}

// ── 2. Bands ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn stop_is_twice_band(closes in arb_window()) {
        let stats = compute(&bars(&closes), closes.len()).unwrap();
        let bands = derive_bands(stats.standard_deviation).unwrap();
        prop_assert_eq!(bands.position_band, stats.standard_deviation);
        prop_assert_eq!(bands.stop_loss_level, stats.standard_deviation * STOP_LOSS_MULTIPLIER);
        prop_assert!(bands.stop_loss_level >= bands.position_band);
    }
}

// ── 3. State machine ─────────────────────────────────────────────────

proptest! {
    /// Rule guards are mutually exclusive.
    #[test]
    fn at_most_one_rule_applies(
        closes in arb_window(),
        last in arb_price(),
        state in arb_state(),
    ) {
        let stats = compute(&bars(&closes), closes.len()).unwrap();
        let bands = derive_bands(stats.standard_deviation).unwrap();
        let applicable = RULE_PRIORITY
            .iter()
            .filter(|rule| rule_applies(**rule, last, stats.moving_average, &bands, state))
            .count();
        prop_assert!(applicable <= 1);
    }

    /// Entries only from flat, exits only from open, never (in, none).
    #[test]
    fn transitions_respect_position(
        closes in arb_window(),
        last in arb_price(),
        state in arb_state(),
    ) {
        let stats = compute(&bars(&closes), closes.len()).unwrap();
        let bands = derive_bands(stats.standard_deviation).unwrap();
        let evaluation = PositionStateMachine::default().evaluate(last, stats.moving_average, &bands, state);

        prop_assert!(!(evaluation.state.position() == Position::In
            && evaluation.state.direction() == Direction::None));

        match evaluation.decision {
            None => prop_assert_eq!(evaluation.state, state),
            Some(decision) => {
                prop_assert_eq!(decision.rule.is_entry(), state.is_out());
                prop_assert_eq!(transition(decision.rule), (decision.side, evaluation.state));
                if decision.rule.is_entry() {
                    prop_assert_eq!(evaluation.state.position(), Position::In);
                } else {
                    prop_assert!(evaluation.state.is_out());
                }
            }
        }
    }

    /// Entries trade against the move: sell above the band, buy below it.
    #[test]
    fn entries_fade_the_move(closes in arb_window(), last in arb_price()) {
        let stats = compute(&bars(&closes), closes.len()).unwrap();
        let bands = derive_bands(stats.standard_deviation).unwrap();
        let evaluation = PositionStateMachine::default()
            .evaluate(last, stats.moving_average, &bands, PositionState::flat());

        if let Some(decision) = evaluation.decision {
            match decision.side {
                TradeSide::Sell => prop_assert!(last > stats.moving_average),
                TradeSide::Buy => prop_assert!(last < stats.moving_average),
            }
        }
    }
}

// ── 4. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn evaluation_is_deterministic(
        closes in arb_window(),
        last in arb_price(),
        state in arb_state(),
    ) {
        let stats = compute(&bars(&closes), closes.len()).unwrap();
        let bands = derive_bands(stats.standard_deviation).unwrap();
        let machine = PositionStateMachine::default();
        let first = machine.evaluate(last, stats.moving_average, &bands, state);
        let second = machine.evaluate(last, stats.moving_average, &bands, state);
        prop_assert_eq!(first, second);
    }
}
