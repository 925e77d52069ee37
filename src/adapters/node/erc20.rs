use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ports::{PortError, PortResult, WalletQuery};

pub const DEFAULT_NODE_URL: &str = "http://localhost:8545";

/// `balanceOf(address)` selector
const BALANCE_OF_SELECTOR: &str = "70a08231";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// ERC-20 balance reader over Ethereum JSON-RPC
#[derive(Debug)]
pub struct Erc20BalanceClient {
    rpc_url: String,
    http: Client,
    /// Token decimals used to scale raw balances
    decimals: u32,
    next_id: AtomicU64,
}

impl Erc20BalanceClient {
    pub fn new(rpc_url: String, decimals: u32, timeout: Duration) -> Result<Self, PortError> {
        if decimals > 28 {
            return Err(PortError::InvalidInput(format!(
                "token decimals {} exceed supported precision (28)",
                decimals
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Communication(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            rpc_url,
            http,
            decimals,
            next_id: AtomicU64::new(1),
        })
    }

    /// Raw `eth_call` returning the hex result
    async fn eth_call(&self, to: &str, data: &str) -> PortResult<String> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: "eth_call",
            params: json!([{ "to": to, "data": data }, "latest"]),
        };

        let response = self.http.post(&self.rpc_url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(PortError::Communication(format!("node returned HTTP {}", response.status())));
        }
        let body: RpcResponse = response.json().await.map_err(|e| PortError::Parse(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(PortError::Communication(format!("RPC error {}: {}", err.code, err.message)));
        }
        body.result
            .ok_or_else(|| PortError::Parse("eth_call response has no result".to_string()))
    }
}

#[async_trait]
impl WalletQuery for Erc20BalanceClient {
    async fn quote_balance(&self, account_address: &str, token_address: &str) -> PortResult<Decimal> {
        let data = balance_of_call_data(account_address)?;
        validate_address(token_address)?;

        let raw = self.eth_call(token_address, &data).await?;
        let balance = scale_balance(&raw, self.decimals)?;

        tracing::debug!(token = token_address, %balance, "Fetched token balance");
        Ok(balance)
    }
}

fn validate_address(address: &str) -> PortResult<&str> {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PortError::InvalidInput(format!("invalid address: {}", address)));
    }
    Ok(hex)
}

/// ABI-encode `balanceOf(account)`
pub(crate) fn balance_of_call_data(account: &str) -> PortResult<String> {
    let hex = validate_address(account)?;
    Ok(format!("0x{}{:0>64}", BALANCE_OF_SELECTOR, hex.to_lowercase()))
}

/// Decode a uint256 hex word and scale it by `decimals`
pub(crate) fn scale_balance(raw: &str, decimals: u32) -> PortResult<Decimal> {
    let hex = raw.strip_prefix("0x").unwrap_or(raw);
    let digits = hex.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(Decimal::ZERO);
    }
    // Decimal mantissa is 96 bits
    if digits.len() > 24 {
        return Err(PortError::Parse(format!("balance {} exceeds supported range", raw)));
    }
    let value = u128::from_str_radix(digits, 16)
        .map_err(|e| PortError::Parse(format!("invalid balance {}: {}", raw, e)))?;
    let value = i128::try_from(value)
        .map_err(|_| PortError::Parse(format!("balance {} exceeds supported range", raw)))?;

    Decimal::try_from_i128_with_scale(value, decimals)
        .map(|d| d.normalize())
        .map_err(|e| PortError::Parse(format!("balance {} out of range: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const ACCOUNT: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";

    #[test]
    fn test_call_data_layout() {
        let data = balance_of_call_data(ACCOUNT).unwrap();
        assert!(data.starts_with("0x70a08231"));
        // selector (8) + one 32-byte word (64)
        assert_eq!(data.len(), 2 + 8 + 64);
        assert!(data.ends_with("8ba1f109551bd432803012645ac136ddd64dba72"));
        assert_eq!(&data[10..34], "000000000000000000000000");
    }

    #[test]
    fn test_invalid_address_rejected() {
        assert!(matches!(balance_of_call_data("0x1234"), Err(PortError::InvalidInput(_))));
        assert!(matches!(
            balance_of_call_data("0xzz a1f109551bD432803012645Ac136ddd64DBA7"),
            Err(PortError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_scale_balance() {
        // 1.5 tokens with 18 decimals
        let raw = format!("0x{:064x}", 1_500_000_000_000_000_000u128);
        assert_eq!(scale_balance(&raw, 18).unwrap(), dec!(1.5));
    }

    #[test]
    fn test_scale_zero_balance() {
        assert_eq!(scale_balance("0x", 18).unwrap(), Decimal::ZERO);
        assert_eq!(scale_balance(&format!("0x{:064x}", 0), 6).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_scale_overflow_is_parse_error() {
        let raw = format!("0x{}", "f".repeat(64));
        assert!(matches!(scale_balance(&raw, 18), Err(PortError::Parse(_))));
    }

    #[test]
    fn test_decimals_bound() {
        assert!(Erc20BalanceClient::new(DEFAULT_NODE_URL.into(), 30, Duration::from_secs(1)).is_err());
        assert!(Erc20BalanceClient::new(DEFAULT_NODE_URL.into(), 18, Duration::from_secs(1)).is_ok());
    }
}
