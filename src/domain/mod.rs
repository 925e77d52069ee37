//! Domain Layer - Core types for the reversion bot
//!
//! Pure data with no I/O. All external interactions happen through the ports layer.

pub mod market;
pub mod position;
pub mod trade;

pub use market::{MarketSnapshot, PriceBar, Token, TokenPair};
pub use position::{Direction, Position, PositionError, PositionState};
pub use trade::{FeeOption, MarketOrder, OrderResult, TradeDecision, TradeSide, TransitionRule};
