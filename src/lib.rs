//! Ocean Reversion - Single-pair band mean reversion bot library
//!
//! Samples hourly closes for one token pair, derives a moving average with a
//! one-sigma entry band and a two-sigma stop, and trades a single long or
//! short position through market orders.
//!
//! # Modules
//!
//! - `domain`: Core types (PositionState, PriceBar, TokenPair, TradeDecision)
//! - `ports`: Trait abstractions (MarketDataSource, WalletQuery, OrderExecutor)
//! - `strategy`: Statistics, bands and the position state machine
//! - `adapters`: External implementations (exchange REST, node RPC, paper, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Decision cycle orchestrator and pair selection

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
