//! Strategy Parameters
//!
//! Configuration for the band reversion strategy and its decision cycle.
//! Defaults reproduce the hourly, five-bar setup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::state_machine::DEFAULT_SIZING_FRACTION;

/// Largest accepted moving window
pub const MAX_WINDOW_SIZE: usize = 1_000;
/// Largest accepted bar interval (one week)
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 3600;

/// Main strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Number of bars (`Q`) in the moving window
    pub window_size: usize,
    /// Bar width and scheduler period in seconds
    pub interval_secs: u64,
    /// How far before "now" the bar query ends, so the last bar is complete
    pub bar_end_offset_secs: u64,
    /// Share of the quote balance committed per trade
    pub sizing_fraction: Decimal,
    /// Start flat with `Direction::None` instead of the `Short` placeholder
    pub normalize_initial_direction: bool,
    /// Upper bound on any single exchange or node call
    pub call_timeout_secs: u64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            interval_secs: 3600,
            bar_end_offset_secs: 10,
            sizing_fraction: DEFAULT_SIZING_FRACTION,
            normalize_initial_direction: false,
            call_timeout_secs: 30,
        }
    }
}

impl StrategyConfig {
    pub fn with_window(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout_secs: u64) -> Self {
        self.call_timeout_secs = call_timeout_secs;
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size < 2 || self.window_size > MAX_WINDOW_SIZE {
            return Err(ConfigError::InvalidWindow(self.window_size));
        }
        if self.interval_secs == 0 || self.interval_secs > MAX_INTERVAL_SECS {
            return Err(ConfigError::InvalidInterval(self.interval_secs));
        }
        if self.bar_end_offset_secs >= self.interval_secs {
            return Err(ConfigError::InvalidBarOffset(self.bar_end_offset_secs));
        }
        if self.sizing_fraction <= Decimal::ZERO || self.sizing_fraction > Decimal::ONE {
            return Err(ConfigError::InvalidSizingFraction(self.sizing_fraction));
        }
        if self.call_timeout_secs == 0 {
            return Err(ConfigError::InvalidCallTimeout(self.call_timeout_secs));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid window size: {0} (must be 2..=1000)")]
    InvalidWindow(usize),
    #[error("Invalid interval: {0}s (must be 1..=604800)")]
    InvalidInterval(u64),
    #[error("Invalid bar end offset: {0}s (must be shorter than the interval)")]
    InvalidBarOffset(u64),
    #[error("Invalid sizing fraction: {0} (must be 0 < f <= 1)")]
    InvalidSizingFraction(Decimal),
    #[error("Invalid call timeout: {0}s (must be > 0)")]
    InvalidCallTimeout(u64),
}
