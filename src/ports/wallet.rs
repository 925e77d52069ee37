use async_trait::async_trait;
use rust_decimal::Decimal;

#[cfg(test)]
use mockall::automock;

use super::PortResult;

/// Wallet balance port trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WalletQuery: Send + Sync {
    /// Balance of `token_address` held by `account_address`, in whole token units
    async fn quote_balance(&self, account_address: &str, token_address: &str) -> PortResult<Decimal>;
}
