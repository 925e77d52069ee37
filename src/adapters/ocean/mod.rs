//! Exchange Adapter
//!
//! REST client for the relayer API:
//! - token pair listing, candlesticks and ticker for market data
//! - signed market order submission

mod client;
mod types;

pub use client::{OceanClient, OceanConfig, OCEAN_STAGING_API};
