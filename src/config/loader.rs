//! Configuration Loader
//!
//! Loads and validates configuration from TOML files. Secrets may be left
//! out of the file and supplied through the environment (or a `.env` file).

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::adapters::node::DEFAULT_NODE_URL;
use crate::adapters::ocean::OCEAN_STAGING_API;
use crate::domain::FeeOption;
use crate::strategy::params::StrategyConfig;
use crate::strategy::DEFAULT_SIZING_FRACTION;

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub strategy: StrategySection,
    #[serde(default)]
    pub exchange: ExchangeSection,
    #[serde(default)]
    pub node: NodeSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Strategy configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategySection {
    /// Bars in the moving window (Q)
    pub window_size: usize,
    /// Bar width and scheduling period in seconds
    pub interval_secs: u64,
    /// Bar query ends this many seconds before now
    pub bar_end_offset_secs: u64,
    /// Fraction of quote balance committed per trade
    pub sizing_fraction: Decimal,
    /// Start with direction `none` instead of the `short` placeholder
    pub normalize_initial_direction: bool,
}

impl Default for StrategySection {
    fn default() -> Self {
        let defaults = StrategyConfig::default();
        Self {
            window_size: defaults.window_size,
            interval_secs: defaults.interval_secs,
            bar_end_offset_secs: defaults.bar_end_offset_secs,
            sizing_fraction: DEFAULT_SIZING_FRACTION,
            normalize_initial_direction: defaults.normalize_initial_direction,
        }
    }
}

/// Exchange API configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeSection {
    /// Relayer REST base URL
    pub api_url: String,
    /// API key (falls back to OCEAN_API_KEY)
    pub api_key: Option<String>,
    /// API secret (falls back to OCEAN_API_SECRET)
    pub api_secret: Option<String>,
    /// Base token symbol; first listed pair when unset
    pub base_symbol: Option<String>,
    /// Quote token symbol
    pub quote_symbol: Option<String>,
    pub fee_option: FeeOption,
    /// Timeout for each exchange or node call
    pub call_timeout_secs: u64,
}

impl Default for ExchangeSection {
    fn default() -> Self {
        Self {
            api_url: OCEAN_STAGING_API.to_string(),
            api_key: None,
            api_secret: None,
            base_symbol: None,
            quote_symbol: None,
            fee_option: FeeOption::FeeInNative,
            call_timeout_secs: StrategyConfig::default().call_timeout_secs,
        }
    }
}

impl ExchangeSection {
    /// Get API key with environment variable fallback
    pub fn get_api_key(&self) -> Option<String> {
        non_empty(&self.api_key).or_else(|| env_non_empty("OCEAN_API_KEY"))
    }

    /// Get API secret with environment variable fallback
    pub fn get_api_secret(&self) -> Option<String> {
        non_empty(&self.api_secret).or_else(|| env_non_empty("OCEAN_API_SECRET"))
    }
}

/// Blockchain node configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// JSON-RPC endpoint (WEB3_URL overrides)
    pub rpc_url: String,
    /// Bot account address (falls back to BOT_ADDRESS)
    pub account_address: Option<String>,
    /// Quote token decimals when the exchange listing omits them
    pub quote_decimals: u32,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_NODE_URL.to_string(),
            account_address: None,
            quote_decimals: 18,
        }
    }
}

impl NodeSection {
    /// Get RPC URL with environment variable override
    /// Checks WEB3_URL env var first, falls back to config value
    pub fn get_rpc_url(&self) -> String {
        env_non_empty("WEB3_URL").unwrap_or_else(|| self.rpc_url.clone())
    }

    /// Get account address with environment variable fallback
    pub fn get_account_address(&self) -> Option<String> {
        non_empty(&self.account_address).or_else(|| env_non_empty("BOT_ADDRESS"))
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// Environment variable, treating blank values as unset
fn env_non_empty(name: &str) -> Option<String> {
    non_empty(&std::env::var(name).ok())
}

/// Load configuration from a TOML file. `~` in the path is expanded.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = shellexpand::tilde(&path.as_ref().to_string_lossy()).into_owned();
    let content = std::fs::read_to_string(&path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        StrategyConfig::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if self.exchange.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "exchange.api_url cannot be empty".to_string(),
            ));
        }

        if self.node.rpc_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "node.rpc_url cannot be empty".to_string(),
            ));
        }

        if self.node.quote_decimals > 28 {
            return Err(ConfigError::ValidationError(format!(
                "node.quote_decimals must be <= 28, got {}",
                self.node.quote_decimals
            )));
        }

        if let Some(address) = non_empty(&self.node.account_address) {
            let hex = address.trim_start_matches("0x");
            if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::ValidationError(format!(
                    "node.account_address is not a valid address: {}",
                    address
                )));
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::ValidationError(format!(
                "logging.level must be trace|debug|info|warn|error, got {}",
                other
            ))),
        }
    }
}

// Conversion from Config to StrategyConfig
impl From<&Config> for StrategyConfig {
    fn from(config: &Config) -> Self {
        StrategyConfig {
            window_size: config.strategy.window_size,
            interval_secs: config.strategy.interval_secs,
            bar_end_offset_secs: config.strategy.bar_end_offset_secs,
            sizing_fraction: config.strategy.sizing_fraction,
            normalize_initial_direction: config.strategy.normalize_initial_direction,
            call_timeout_secs: config.exchange.call_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[strategy]
window_size = 5
interval_secs = 3600
bar_end_offset_secs = 10
sizing_fraction = "0.95"
normalize_initial_direction = false

[exchange]
api_url = "https://api.staging.theocean.trade/api/v0"
base_symbol = "ZRX"
quote_symbol = "WETH"
fee_option = "feeInNative"
call_timeout_secs = 20

[node]
rpc_url = "http://localhost:8545"
account_address = "0x8ba1f109551bD432803012645Ac136ddd64DBA72"
quote_decimals = 18

[logging]
level = "info"
"#
        .to_string()
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.strategy.window_size, 5);
        assert_eq!(config.strategy.sizing_fraction, dec!(0.95));
        assert_eq!(config.exchange.base_symbol.as_deref(), Some("ZRX"));
        assert_eq!(config.exchange.fee_option, FeeOption::FeeInNative);
        assert_eq!(config.exchange.call_timeout_secs, 20);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.strategy.window_size, 5);
        assert_eq!(config.strategy.interval_secs, 3600);
        assert_eq!(config.exchange.api_url, OCEAN_STAGING_API);
        assert_eq!(config.node.rpc_url, DEFAULT_NODE_URL);
        assert!(config.exchange.base_symbol.is_none());
    }

    #[test]
    fn test_invalid_window() {
        let result = parse_config("[strategy]\nwindow_size = 0\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_oversized_interval_rejected() {
        let result = parse_config("[strategy]\ninterval_secs = 9223372036854775807\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));

        let result = parse_config("[strategy]\nwindow_size = 1000000\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_invalid_sizing_fraction() {
        let result = parse_config("[strategy]\nsizing_fraction = \"1.2\"\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_invalid_account_address() {
        let result = parse_config("[node]\naccount_address = \"0x1234\"\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_invalid_log_level() {
        let result = parse_config("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let result = parse_config("[strategy\nwindow_size = 5");
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_config_to_strategy_config() {
        let config = parse_config(&create_valid_config()).unwrap();
        let strategy_config = StrategyConfig::from(&config);

        assert_eq!(strategy_config.window_size, 5);
        assert_eq!(strategy_config.interval_secs, 3600);
        assert_eq!(strategy_config.bar_end_offset_secs, 10);
        assert_eq!(strategy_config.sizing_fraction, dec!(0.95));
        assert_eq!(strategy_config.call_timeout_secs, 20);
    }

    #[test]
    fn test_blank_env_values_count_as_unset() {
        // Variable names unique to this test so parallel tests are unaffected
        std::env::set_var("OCEAN_REVERSION_TEST_BLANK", "   ");
        std::env::set_var("OCEAN_REVERSION_TEST_SET", "key-123");
        std::env::remove_var("OCEAN_REVERSION_TEST_MISSING");

        assert_eq!(env_non_empty("OCEAN_REVERSION_TEST_BLANK"), None);
        assert_eq!(env_non_empty("OCEAN_REVERSION_TEST_MISSING"), None);
        assert_eq!(env_non_empty("OCEAN_REVERSION_TEST_SET").as_deref(), Some("key-123"));
    }

    #[test]
    fn test_configured_secret_wins_over_env() {
        let section = ExchangeSection {
            api_key: Some("from-file".into()),
            ..Default::default()
        };
        assert_eq!(section.get_api_key().as_deref(), Some("from-file"));
    }
}
