//! Scripted port implementations for tests and dry runs.
//!
//! Each fake records its calls and returns whatever it was last configured
//! with, so a test can change market conditions between cycles.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{MarketDataSource, OrderExecutor, PortError, PortResult, WalletQuery};
use crate::domain::{MarketOrder, OrderResult, PriceBar, TokenPair};

/// Arguments of a `recent_bars` call
#[derive(Debug, Clone, PartialEq)]
pub struct BarRequest {
    pub pair: String,
    pub start_time: i64,
    pub end_time: i64,
    pub interval_secs: u64,
}

/// Market data fake with configurable bars, price and latency
#[derive(Debug)]
pub struct ScriptedMarketData {
    bars: Mutex<PortResult<Vec<PriceBar>>>,
    last_price: Mutex<PortResult<Decimal>>,
    pairs: Mutex<Vec<TokenPair>>,
    delay: Mutex<Option<Duration>>,
    bar_requests: Mutex<Vec<BarRequest>>,
}

impl Default for ScriptedMarketData {
    fn default() -> Self {
        Self {
            bars: Mutex::new(Ok(Vec::new())),
            last_price: Mutex::new(Err(PortError::Communication("no price configured".to_string()))),
            pairs: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
            bar_requests: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the closes returned by `recent_bars`, oldest first, hourly
    pub fn with_closes(self, closes: &[Decimal]) -> Self {
        self.set_closes(closes);
        self
    }

    pub fn with_last_price(self, price: Decimal) -> Self {
        self.set_last_price(price);
        self
    }

    pub fn with_pairs(self, pairs: Vec<TokenPair>) -> Self {
        *self.pairs.lock().unwrap() = pairs;
        self
    }

    /// Every call sleeps this long before answering
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn set_closes(&self, closes: &[Decimal]) {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar::new(close, 1_700_000_000 + i as i64 * 3600))
            .collect();
        *self.bars.lock().unwrap() = Ok(bars);
    }

    pub fn set_bars(&self, bars: PortResult<Vec<PriceBar>>) {
        *self.bars.lock().unwrap() = bars;
    }

    pub fn set_last_price(&self, price: Decimal) {
        *self.last_price.lock().unwrap() = Ok(price);
    }

    pub fn fail_last_price(&self, error: PortError) {
        *self.last_price.lock().unwrap() = Err(error);
    }

    /// Get all recorded bar requests
    pub fn bar_requests(&self) -> Vec<BarRequest> {
        self.bar_requests.lock().unwrap().clone()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MarketDataSource for ScriptedMarketData {
    async fn recent_bars(
        &self,
        pair: &TokenPair,
        start_time: i64,
        end_time: i64,
        interval_secs: u64,
    ) -> PortResult<Vec<PriceBar>> {
        self.bar_requests.lock().unwrap().push(BarRequest {
            pair: pair.symbol(),
            start_time,
            end_time,
            interval_secs,
        });
        self.pause().await;
        self.bars.lock().unwrap().clone()
    }

    async fn last_price(&self, _pair: &TokenPair) -> PortResult<Decimal> {
        self.pause().await;
        self.last_price.lock().unwrap().clone()
    }

    async fn token_pairs(&self) -> PortResult<Vec<TokenPair>> {
        Ok(self.pairs.lock().unwrap().clone())
    }
}

/// Wallet fake returning a configurable balance
#[derive(Debug)]
pub struct FixedWallet {
    balance: Mutex<PortResult<Decimal>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FixedWallet {
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance: Mutex::new(Ok(balance)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: PortError) -> Self {
        Self {
            balance: Mutex::new(Err(error)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_balance(&self, balance: PortResult<Decimal>) {
        *self.balance.lock().unwrap() = balance;
    }

    /// Get all recorded `(account, token)` queries
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletQuery for FixedWallet {
    async fn quote_balance(&self, account_address: &str, token_address: &str) -> PortResult<Decimal> {
        self.calls
            .lock()
            .unwrap()
            .push((account_address.to_string(), token_address.to_string()));
        self.balance.lock().unwrap().clone()
    }
}

/// Executor fake that records orders and fills them unless told to reject
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    orders: Mutex<Vec<MarketOrder>>,
    failure: Mutex<Option<PortError>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every submission with `error` until cleared
    pub fn fail_with(&self, error: Option<PortError>) {
        *self.failure.lock().unwrap() = error;
    }

    /// Every submission sleeps this long before answering
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    /// Get all submitted orders, including failed ones
    pub fn orders(&self) -> Vec<MarketOrder> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderExecutor for RecordingExecutor {
    async fn submit_market_order(&self, order: MarketOrder) -> PortResult<OrderResult> {
        let count = {
            let mut orders = self.orders.lock().unwrap();
            orders.push(order.clone());
            orders.len()
        };
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(OrderResult {
            order_id: format!("mock-{}", count),
            side: order.side,
            filled_amount: order.base_amount,
            average_price: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeeOption, Token, TradeSide};
    use rust_decimal_macros::dec;

    fn pair() -> TokenPair {
        TokenPair {
            base: Token { symbol: "ZRX".into(), address: "0xbase".into(), decimals: Some(18) },
            quote: Token { symbol: "WETH".into(), address: "0xquote".into(), decimals: Some(18) },
        }
    }

    #[tokio::test]
    async fn test_scripted_market_data() {
        let mock = ScriptedMarketData::new()
            .with_closes(&[dec!(1), dec!(2)])
            .with_last_price(dec!(3));

        let bars = mock.recent_bars(&pair(), 10, 20, 3600).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(mock.last_price(&pair()).await, Ok(dec!(3)));
        assert_eq!(
            mock.bar_requests(),
            vec![BarRequest { pair: "ZRX/WETH".into(), start_time: 10, end_time: 20, interval_secs: 3600 }]
        );

        mock.fail_last_price(PortError::Timeout(Duration::from_secs(1)));
        assert_eq!(mock.last_price(&pair()).await, Err(PortError::Timeout(Duration::from_secs(1))));
    }

    #[tokio::test]
    async fn test_fixed_wallet() {
        let wallet = FixedWallet::new(dec!(42));
        assert_eq!(wallet.quote_balance("0xacct", "0xquote").await, Ok(dec!(42)));
        assert_eq!(wallet.get_calls(), vec![("0xacct".to_string(), "0xquote".to_string())]);
    }

    #[tokio::test]
    async fn test_recording_executor() {
        let executor = RecordingExecutor::new();
        let order = MarketOrder {
            pair: pair(),
            side: TradeSide::Buy,
            base_amount: dec!(1.5),
            fee_option: FeeOption::FeeInNative,
        };

        let result = executor.submit_market_order(order.clone()).await.unwrap();
        assert_eq!(result.order_id, "mock-1");
        assert_eq!(result.filled_amount, dec!(1.5));

        executor.fail_with(Some(PortError::Rejected("insufficient funds".into())));
        assert!(matches!(
            executor.submit_market_order(order).await,
            Err(PortError::Rejected(_))
        ));
        assert_eq!(executor.orders().len(), 2);
    }
}
