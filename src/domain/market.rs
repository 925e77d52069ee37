use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One historical observation for the traded pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub close: Decimal,
    /// Bar open time, unix seconds
    pub timestamp: i64,
}

impl PriceBar {
    pub fn new(close: Decimal, timestamp: i64) -> Self {
        Self { close, timestamp }
    }
}

/// The single most recent traded price, fetched once per cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub last_price: Decimal,
}

/// A token as listed by the exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub address: String,
    #[serde(default)]
    pub decimals: Option<u32>,
}

/// Base/quote pair the bot trades
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub base: Token,
    pub quote: Token,
}

impl TokenPair {
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base.symbol, self.quote.symbol)
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
