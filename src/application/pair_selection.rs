//! Resolve the traded pair from what the exchange lists

use crate::domain::TokenPair;
use crate::ports::{MarketDataSource, PortError};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PairSelectionError {
    #[error("Exchange lists no token pairs")]
    NoPairs,
    #[error("Pair {0} is not listed on the exchange")]
    NotListed(String),
    #[error("Failed to list token pairs: {0}")]
    Port(#[from] PortError),
}

/// Which pair to trade
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairSelector {
    pub base_symbol: Option<String>,
    pub quote_symbol: Option<String>,
}

impl PairSelector {
    /// Pick from `pairs`. With no symbols configured the first listed pair wins.
    pub fn select(&self, pairs: &[TokenPair]) -> Result<TokenPair, PairSelectionError> {
        if pairs.is_empty() {
            return Err(PairSelectionError::NoPairs);
        }

        let matches = |pair: &&TokenPair| {
            let base_ok = self
                .base_symbol
                .as_deref()
                .map_or(true, |s| pair.base.symbol.eq_ignore_ascii_case(s));
            let quote_ok = self
                .quote_symbol
                .as_deref()
                .map_or(true, |s| pair.quote.symbol.eq_ignore_ascii_case(s));
            base_ok && quote_ok
        };

        pairs.iter().find(matches).cloned().ok_or_else(|| {
            PairSelectionError::NotListed(format!(
                "{}/{}",
                self.base_symbol.as_deref().unwrap_or("*"),
                self.quote_symbol.as_deref().unwrap_or("*")
            ))
        })
    }

    /// Fetch the exchange listing and pick the pair
    pub async fn resolve(&self, market: &dyn MarketDataSource) -> Result<TokenPair, PairSelectionError> {
        let pairs = market.token_pairs().await?;
        let pair = self.select(&pairs)?;
        tracing::info!(pair = %pair, listed = pairs.len(), "Selected trading pair");
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Token;
    use crate::ports::mocks::ScriptedMarketData;

    fn token(symbol: &str) -> Token {
        Token {
            symbol: symbol.to_string(),
            address: format!("0x{}", symbol.to_lowercase()),
            decimals: Some(18),
        }
    }

    fn listing() -> Vec<TokenPair> {
        vec![
            TokenPair { base: token("ZRX"), quote: token("WETH") },
            TokenPair { base: token("REP"), quote: token("WETH") },
            TokenPair { base: token("REP"), quote: token("DAI") },
        ]
    }

    #[test]
    fn test_default_takes_first_pair() {
        let pair = PairSelector::default().select(&listing()).unwrap();
        assert_eq!(pair.symbol(), "ZRX/WETH");
    }

    #[test]
    fn test_select_by_symbols() {
        let selector = PairSelector {
            base_symbol: Some("rep".into()),
            quote_symbol: Some("DAI".into()),
        };
        assert_eq!(selector.select(&listing()).unwrap().symbol(), "REP/DAI");
    }

    #[test]
    fn test_select_by_base_only() {
        let selector = PairSelector {
            base_symbol: Some("REP".into()),
            quote_symbol: None,
        };
        assert_eq!(selector.select(&listing()).unwrap().symbol(), "REP/WETH");
    }

    #[test]
    fn test_not_listed() {
        let selector = PairSelector {
            base_symbol: Some("MKR".into()),
            quote_symbol: None,
        };
        assert_eq!(
            selector.select(&listing()),
            Err(PairSelectionError::NotListed("MKR/*".into()))
        );
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(PairSelector::default().select(&[]), Err(PairSelectionError::NoPairs));
    }

    #[tokio::test]
    async fn test_resolve_from_market() {
        let market = ScriptedMarketData::new().with_pairs(listing());
        let pair = PairSelector::default().resolve(&market).await.unwrap();
        assert_eq!(pair.base.address, "0xzrx");
    }
}
