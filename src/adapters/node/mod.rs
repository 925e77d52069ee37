mod erc20;

pub use erc20::{Erc20BalanceClient, DEFAULT_NODE_URL};
