//! Strategy Layer - Band Mean Reversion
//!
//! Pure decision core, no I/O:
//! - `statistics`: moving average and population standard deviation over the last `Q` bars
//! - `bands`: entry band and stop-loss level from the standard deviation
//! - `state_machine`: position/direction transitions, one decision per evaluation
//! - `params`: strategy and cycle configuration

pub mod bands;
pub mod params;
pub mod state_machine;
pub mod statistics;

use thiserror::Error;

pub use bands::{derive_bands, Bands, STOP_LOSS_MULTIPLIER};
pub use params::{ConfigError, StrategyConfig};
pub use state_machine::{Evaluation, PositionStateMachine, DEFAULT_SIZING_FRACTION, RULE_PRIORITY};
pub use statistics::{compute, Statistics};

/// Failures of the pure strategy computations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("Insufficient data: requires {required} bars, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
