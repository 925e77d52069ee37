//! Position State Machine
//!
//! Turns the latest price and the window bands into at most one trade
//! decision per evaluation. Rules are checked in a fixed priority order and
//! the first one that applies wins:
//!
//! | # | Rule              | From          | Condition               | Side | To          |
//! |---|-------------------|---------------|-------------------------|------|-------------|
//! | 1 | Short entry       | `Out`         | `last > avg + band`     | Sell | `(In, Short)` |
//! | 2 | Long entry        | `Out`         | `last < avg - band`     | Buy  | `(In, Long)`  |
//! | 3 | Short take-profit | `(In, Short)` | `last < avg`            | Buy  | `(Out, None)` |
//! | 4 | Short stop-loss   | `(In, Short)` | `last > avg + stop`     | Buy  | `(Out, None)` |
//! | 5 | Long take-profit  | `(In, Long)`  | `last > avg`            | Sell | `(Out, None)` |
//! | 6 | Long stop-loss    | `(In, Long)`  | `last < avg - stop`     | Sell | `(Out, None)` |
//!
//! Anything else holds. The machine never mutates state itself; it returns
//! the next state and the caller decides when to commit it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::bands::Bands;
use crate::domain::{PositionState, TradeDecision, TradeSide, TransitionRule};

/// Default share of the quote balance committed per trade
pub const DEFAULT_SIZING_FRACTION: Decimal = dec!(0.95);

/// Rules in evaluation priority order
pub const RULE_PRIORITY: [TransitionRule; 6] = [
    TransitionRule::ShortEntry,
    TransitionRule::LongEntry,
    TransitionRule::ShortTakeProfit,
    TransitionRule::ShortStopLoss,
    TransitionRule::LongTakeProfit,
    TransitionRule::LongStopLoss,
];

/// Outcome of a single evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// State to commit if the decision is carried out (unchanged on hold)
    pub state: PositionState,
    pub decision: Option<TradeDecision>,
}

impl Evaluation {
    pub fn is_hold(&self) -> bool {
        self.decision.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct PositionStateMachine {
    sizing_fraction: Decimal,
}

impl Default for PositionStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_SIZING_FRACTION)
    }
}

impl PositionStateMachine {
    pub fn new(sizing_fraction: Decimal) -> Self {
        Self { sizing_fraction }
    }

    pub fn sizing_fraction(&self) -> Decimal {
        self.sizing_fraction
    }

    /// Evaluate one cycle. Pure: identical inputs give identical outputs.
    pub fn evaluate(
        &self,
        last: Decimal,
        average: Decimal,
        bands: &Bands,
        state: PositionState,
    ) -> Evaluation {
        let fired = RULE_PRIORITY
            .iter()
            .copied()
            .find(|rule| rule_applies(*rule, last, average, bands, state));

        match fired {
            Some(rule) => {
                let (side, next) = transition(rule);
                Evaluation {
                    state: next,
                    decision: Some(TradeDecision {
                        side,
                        sizing_fraction: self.sizing_fraction,
                        rule,
                    }),
                }
            }
            None => Evaluation {
                state,
                decision: None,
            },
        }
    }
}

/// Whether `rule`'s guard holds, ignoring every other rule
pub fn rule_applies(
    rule: TransitionRule,
    last: Decimal,
    average: Decimal,
    bands: &Bands,
    state: PositionState,
) -> bool {
    match rule {
        TransitionRule::ShortEntry => state.is_out() && last > bands.upper_entry(average),
        TransitionRule::LongEntry => state.is_out() && last < bands.lower_entry(average),
        TransitionRule::ShortTakeProfit => state.is_short() && last < average,
        TransitionRule::ShortStopLoss => state.is_short() && last > bands.upper_stop(average),
        TransitionRule::LongTakeProfit => state.is_long() && last > average,
        TransitionRule::LongStopLoss => state.is_long() && last < bands.lower_stop(average),
    }
}

/// Order side and resulting state for a fired rule
pub fn transition(rule: TransitionRule) -> (TradeSide, PositionState) {
    match rule {
        TransitionRule::ShortEntry => (TradeSide::Sell, PositionState::short()),
        TransitionRule::LongEntry => (TradeSide::Buy, PositionState::long()),
        TransitionRule::ShortTakeProfit | TransitionRule::ShortStopLoss => {
            (TradeSide::Buy, PositionState::flat())
        }
        TransitionRule::LongTakeProfit | TransitionRule::LongStopLoss => {
            (TradeSide::Sell, PositionState::flat())
        }
    }
}
