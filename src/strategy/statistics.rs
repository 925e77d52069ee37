//! Window Statistics
//!
//! Moving average and population standard deviation over the `Q` most
//! recent closing prices.
//!
//! Bars may arrive in any order. A copy is sorted ascending by timestamp
//! (stable, so equal timestamps keep their input order) and the `Q` newest
//! are used.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use super::StrategyError;
use crate::domain::PriceBar;

/// Result of the window calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Arithmetic mean of the window closes
    pub moving_average: Decimal,
    /// Population standard deviation of the window closes, never negative
    pub standard_deviation: Decimal,
}

impl Statistics {
    /// Distance of `price` from the average in standard deviations.
    ///
    /// `None` when the window is flat.
    pub fn z_score(&self, price: Decimal) -> Option<Decimal> {
        if self.standard_deviation.is_zero() {
            return None;
        }
        (price - self.moving_average).checked_div(self.standard_deviation)
    }
}

/// Compute statistics over the `window` most recent bars
pub fn compute(bars: &[PriceBar], window: usize) -> Result<Statistics, StrategyError> {
    let closes = latest_closes(bars, window)?;
    let count = Decimal::from(window as u64);

    let sum = checked_sum(closes.iter().copied())?;
    let moving_average = sum / count;

    let squared = closes.iter().map(|&close| {
        let diff = close - moving_average;
        diff.checked_mul(diff)
    });
    let mut sum_sq = Decimal::ZERO;
    for sq in squared {
        let sq = sq.ok_or_else(|| overflow("squared deviation"))?;
        sum_sq = sum_sq
            .checked_add(sq)
            .ok_or_else(|| overflow("sum of squared deviations"))?;
    }
    let variance = sum_sq / count;

    let standard_deviation = variance
        .sqrt()
        .ok_or_else(|| StrategyError::InvalidInput(format!("negative variance: {}", variance)))?;

    Ok(Statistics {
        moving_average,
        standard_deviation,
    })
}

/// Closing prices of the `window` newest bars, oldest first
pub fn latest_closes(bars: &[PriceBar], window: usize) -> Result<Vec<Decimal>, StrategyError> {
    if window == 0 {
        return Err(StrategyError::InvalidInput(
            "window size must be greater than zero".to_string(),
        ));
    }
    if bars.len() < window {
        return Err(StrategyError::InsufficientData {
            required: window,
            available: bars.len(),
        });
    }

    let mut ordered = bars.to_vec();
    ordered.sort_by_key(|bar| bar.timestamp);

    Ok(ordered[ordered.len() - window..]
        .iter()
        .map(|bar| bar.close)
        .collect())
}

fn checked_sum(values: impl Iterator<Item = Decimal>) -> Result<Decimal, StrategyError> {
    let mut sum = Decimal::ZERO;
    for value in values {
        sum = sum.checked_add(value).ok_or_else(|| overflow("sum of closes"))?;
    }
    Ok(sum)
}

fn overflow(what: &str) -> StrategyError {
    StrategyError::InvalidInput(format!("{} overflowed", what))
}
