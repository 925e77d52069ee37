//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Ocean: relayer REST API (market data, signed market orders)
//! - Node: ERC-20 balances over Ethereum JSON-RPC
//! - Paper: order executor for dry runs
//! - CLI: Command-line interface definitions

pub mod cli;
pub mod node;
pub mod ocean;
pub mod paper;

pub use cli::CliApp;
pub use node::Erc20BalanceClient;
pub use ocean::{OceanClient, OceanConfig};
pub use paper::PaperExecutor;
