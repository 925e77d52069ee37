use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::market::TokenPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Which transition of the position state machine produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionRule {
    ShortEntry,
    LongEntry,
    ShortTakeProfit,
    ShortStopLoss,
    LongTakeProfit,
    LongStopLoss,
}

impl TransitionRule {
    pub fn is_entry(&self) -> bool {
        matches!(self, TransitionRule::ShortEntry | TransitionRule::LongEntry)
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionRule::ShortEntry => "short entry",
            TransitionRule::LongEntry => "long entry",
            TransitionRule::ShortTakeProfit => "short take-profit",
            TransitionRule::ShortStopLoss => "short stop-loss",
            TransitionRule::LongTakeProfit => "long take-profit",
            TransitionRule::LongStopLoss => "long stop-loss",
        };
        write!(f, "{}", name)
    }
}

/// Trade intent emitted by the state machine. Not a fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub side: TradeSide,
    /// Fraction of the available quote balance to commit
    pub sizing_fraction: Decimal,
    pub rule: TransitionRule,
}

impl TradeDecision {
    /// Base-asset amount for this decision: `quote_balance / last * sizing_fraction`.
    ///
    /// Returns `None` when `last` is not positive or the arithmetic overflows.
    pub fn base_amount(&self, quote_balance: Decimal, last: Decimal) -> Option<Decimal> {
        if last <= Decimal::ZERO {
            return None;
        }
        quote_balance
            .checked_div(last)?
            .checked_mul(self.sizing_fraction)
    }
}

/// How the exchange should charge its fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FeeOption {
    #[default]
    #[serde(rename = "feeInNative")]
    FeeInNative,
    #[serde(rename = "feeInZRX")]
    FeeInZrx,
}

/// Market order handed to the order executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub pair: TokenPair,
    pub side: TradeSide,
    pub base_amount: Decimal,
    pub fee_option: FeeOption,
}

/// Exchange acknowledgement of a submitted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: String,
    pub side: TradeSide,
    pub filled_amount: Decimal,
    #[serde(default)]
    pub average_price: Option<Decimal>,
}
