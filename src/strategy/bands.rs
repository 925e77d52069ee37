//! Entry and stop-loss thresholds derived from window volatility

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::StrategyError;

/// Stop-loss distance as a multiple of the entry band
pub const STOP_LOSS_MULTIPLIER: Decimal = dec!(2);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    /// Entry threshold width around the average
    pub position_band: Decimal,
    /// Exit threshold width for a losing position
    pub stop_loss_level: Decimal,
}

impl Bands {
    /// Price above which a flat book goes short
    pub fn upper_entry(&self, average: Decimal) -> Decimal {
        average.saturating_add(self.position_band)
    }

    /// Price below which a flat book goes long
    pub fn lower_entry(&self, average: Decimal) -> Decimal {
        average.saturating_sub(self.position_band)
    }

    pub fn upper_stop(&self, average: Decimal) -> Decimal {
        average.saturating_add(self.stop_loss_level)
    }

    pub fn lower_stop(&self, average: Decimal) -> Decimal {
        average.saturating_sub(self.stop_loss_level)
    }
}

/// Derive bands from a standard deviation
pub fn derive_bands(std_dev: Decimal) -> Result<Bands, StrategyError> {
    if std_dev.is_sign_negative() && !std_dev.is_zero() {
        return Err(StrategyError::InvalidInput(format!(
            "standard deviation must be non-negative, got {}",
            std_dev
        )));
    }

    let stop_loss_level = std_dev
        .checked_mul(STOP_LOSS_MULTIPLIER)
        .ok_or_else(|| StrategyError::InvalidInput(format!("stop-loss level overflowed for {}", std_dev)))?;

    Ok(Bands {
        position_band: std_dev,
        stop_loss_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_loss_is_twice_band() {
        let bands = derive_bands(dec!(1.5)).unwrap();
        assert_eq!(bands.position_band, dec!(1.5));
        assert_eq!(bands.stop_loss_level, dec!(3.0));
    }

    #[test]
    fn test_zero_std_dev() {
        let bands = derive_bands(Decimal::ZERO).unwrap();
        assert!(bands.position_band.is_zero());
        assert!(bands.stop_loss_level.is_zero());
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(derive_bands(dec!(-0.01)), Err(StrategyError::InvalidInput(_))));
    }

    #[test]
    fn test_thresholds() {
        let bands = derive_bands(dec!(5)).unwrap();
        assert_eq!(bands.upper_entry(dec!(100)), dec!(105));
        assert_eq!(bands.lower_entry(dec!(100)), dec!(95));
        assert_eq!(bands.upper_stop(dec!(100)), dec!(110));
        assert_eq!(bands.lower_stop(dec!(100)), dec!(90));
    }
}
