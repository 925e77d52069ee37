use async_trait::async_trait;
use rust_decimal::Decimal;

#[cfg(test)]
use mockall::automock;

use super::PortResult;
use crate::domain::{PriceBar, TokenPair};

/// Market data port trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Historical bars for `pair` between `start_time` and `end_time` (unix seconds).
    ///
    /// No ordering is promised; the statistics engine orders bars itself.
    async fn recent_bars(
        &self,
        pair: &TokenPair,
        start_time: i64,
        end_time: i64,
        interval_secs: u64,
    ) -> PortResult<Vec<PriceBar>>;

    /// Most recent traded price for `pair`
    async fn last_price(&self, pair: &TokenPair) -> PortResult<Decimal>;

    /// Pairs the exchange lists, in exchange order
    async fn token_pairs(&self) -> PortResult<Vec<TokenPair>>;
}
