//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - Market data (historical bars, last price, listed pairs)
//! - Wallet balances on the node
//! - Market order submission
//!
//! The decision cycle depends only on these traits, never on an adapter.

pub mod execution;
pub mod market_data;
pub mod mocks;
pub mod wallet;

use std::time::Duration;
use thiserror::Error;

pub use execution::OrderExecutor;
pub use market_data::MarketDataSource;
pub use wallet::WalletQuery;

/// Common result type for port operations
pub type PortResult<T> = Result<T, PortError>;

/// Error hierarchy for port operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortError {
    /// Network/communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Call did not complete in time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Authentication/authorization error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Response could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// The exchange refused the order
    #[error("Order rejected: {0}")]
    Rejected(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for PortError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PortError::Parse(e.to_string())
        } else if e.status().map_or(false, |s| s.as_u16() == 401 || s.as_u16() == 403) {
            PortError::Authentication(e.to_string())
        } else {
            PortError::Communication(e.to_string())
        }
    }
}
