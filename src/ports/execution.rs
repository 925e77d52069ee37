use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::PortResult;
use crate::domain::{MarketOrder, OrderResult};

/// Order execution port trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    /// Submit a market order.
    ///
    /// An exchange refusal must surface as `PortError::Rejected` so the
    /// caller can tell it apart from a transport failure.
    async fn submit_market_order(&self, order: MarketOrder) -> PortResult<OrderResult>;
}
