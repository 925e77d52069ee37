//! Paper trading executor: logs orders and fills them at the requested size

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::domain::{MarketOrder, OrderResult};
use crate::ports::{OrderExecutor, PortResult};

#[derive(Debug, Default)]
pub struct PaperExecutor {
    fills: AtomicU64,
}

impl PaperExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_count(&self) -> u64 {
        self.fills.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl OrderExecutor for PaperExecutor {
    async fn submit_market_order(&self, order: MarketOrder) -> PortResult<OrderResult> {
        let n = self.fills.fetch_add(1, Ordering::Relaxed) + 1;

        tracing::info!(
            "PAPER TRADE - {} {} {} (fee option {:?})",
            order.side,
            order.base_amount,
            order.pair.base.symbol,
            order.fee_option
        );

        Ok(OrderResult {
            order_id: format!("paper-{}", n),
            side: order.side,
            filled_amount: order.base_amount,
            average_price: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeeOption, Token, TokenPair, TradeSide};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_paper_fill() {
        let executor = PaperExecutor::new();
        let order = MarketOrder {
            pair: TokenPair {
                base: Token { symbol: "ZRX".into(), address: "0xb".into(), decimals: None },
                quote: Token { symbol: "WETH".into(), address: "0xq".into(), decimals: None },
            },
            side: TradeSide::Buy,
            base_amount: dec!(3.25),
            fee_option: FeeOption::FeeInNative,
        };

        let first = tokio_test::assert_ok!(executor.submit_market_order(order.clone()).await);
        let second = tokio_test::assert_ok!(executor.submit_market_order(order).await);

        assert_eq!(first.order_id, "paper-1");
        assert_eq!(second.order_id, "paper-2");
        assert_eq!(first.filled_amount, dec!(3.25));
        assert_eq!(executor.fill_count(), 2);
    }
}
