//! Exchange API Client
//!
//! HTTP client for the relayer REST API. Public market data endpoints are
//! plain GETs; order submission is signed with the account's API secret.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;

use super::types::{CandlestickDto, MarketOrderRequest, MarketOrderResponse, TickerDto, TokenPairDto};
use crate::domain::{MarketOrder, OrderResult, PriceBar, TokenPair};
use crate::ports::{MarketDataSource, OrderExecutor, PortError, PortResult};

pub const OCEAN_STAGING_API: &str = "https://api.staging.theocean.trade/api/v0";

const KEY_HEADER: &str = "TOX-ACCESS-KEY";
const SIGN_HEADER: &str = "TOX-ACCESS-SIGN";
const TIMESTAMP_HEADER: &str = "TOX-ACCESS-TIMESTAMP";

/// Exchange client configuration
#[derive(Debug, Clone)]
pub struct OceanConfig {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            api_base_url: OCEAN_STAGING_API.to_string(),
            api_key: None,
            api_secret: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Relayer REST client
#[derive(Debug, Clone)]
pub struct OceanClient {
    config: OceanConfig,
    http: Client,
}

impl OceanClient {
    pub fn new(config: OceanConfig) -> Result<Self, PortError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PortError::Communication(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> PortResult<T> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::decode(response).await
    }

    async fn post_signed<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> PortResult<T> {
        let body = serde_json::to_string(body).map_err(|e| PortError::InvalidInput(e.to_string()))?;
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let (key, signature) = self.sign(&timestamp, &Method::POST, &body)?;

        let response = self
            .http
            .post(self.url(path))
            .header(KEY_HEADER, key)
            .header(SIGN_HEADER, signature)
            .header(TIMESTAMP_HEADER, timestamp)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// `base64(HMAC-SHA256(secret, key + timestamp + METHOD + body))`
    fn sign(&self, timestamp: &str, method: &Method, body: &str) -> PortResult<(String, String)> {
        let key = self
            .config
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PortError::Authentication("API key required".to_string()))?;
        let secret = self
            .config
            .api_secret
            .as_ref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PortError::Authentication("API secret required".to_string()))?;

        let prehash = format!("{}{}{}{}", key, timestamp, method.as_str(), body);
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|e| PortError::Authentication(e.to_string()))?;
        mac.update(prehash.as_bytes());
        let signature = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        Ok((key.clone(), signature))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> PortResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }
        response.json().await.map_err(|e| PortError::Parse(e.to_string()))
    }
}

/// Map a non-success HTTP status to a port error
pub(crate) fn status_error(status: StatusCode, body: String) -> PortError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Authentication(body),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
            PortError::Rejected(body)
        }
        _ => PortError::Communication(format!("HTTP {}: {}", status, body)),
    }
}

fn pair_query(pair: &TokenPair) -> Vec<(&'static str, String)> {
    vec![
        ("baseTokenAddress", pair.base.address.clone()),
        ("quoteTokenAddress", pair.quote.address.clone()),
    ]
}

#[async_trait]
impl MarketDataSource for OceanClient {
    async fn recent_bars(
        &self,
        pair: &TokenPair,
        start_time: i64,
        end_time: i64,
        interval_secs: u64,
    ) -> PortResult<Vec<PriceBar>> {
        let mut query = pair_query(pair);
        query.push(("startTime", start_time.to_string()));
        query.push(("endTime", end_time.to_string()));
        query.push(("interval", interval_secs.to_string()));

        let candles: Vec<CandlestickDto> = self.get("candlesticks", &query).await?;
        tracing::debug!(pair = %pair, count = candles.len(), "Fetched candlesticks");
        Ok(candles.into_iter().map(PriceBar::from).collect())
    }

    async fn last_price(&self, pair: &TokenPair) -> PortResult<Decimal> {
        let ticker: TickerDto = self.get("ticker", &pair_query(pair)).await?;
        ticker
            .snapshot()
            .map(|snapshot| snapshot.last_price)
            .ok_or_else(|| PortError::Parse(format!("ticker for {} has no last price", pair)))
    }

    async fn token_pairs(&self) -> PortResult<Vec<TokenPair>> {
        let pairs: Vec<TokenPairDto> = self.get("token_pairs", &[]).await?;
        Ok(pairs.into_iter().map(TokenPair::from).collect())
    }
}

#[async_trait]
impl OrderExecutor for OceanClient {
    async fn submit_market_order(&self, order: MarketOrder) -> PortResult<OrderResult> {
        let request = MarketOrderRequest {
            base_token_address: order.pair.base.address.clone(),
            quote_token_address: order.pair.quote.address.clone(),
            side: order.side,
            order_amount: order.base_amount,
            fee_option: order.fee_option,
        };

        tracing::info!(
            pair = %order.pair,
            side = %order.side,
            amount = %order.base_amount,
            "Submitting market order"
        );

        let response: MarketOrderResponse = self.post_signed("market_order", &request).await?;
        Ok(response.into_result(order.side, order.base_amount))
    }
}
