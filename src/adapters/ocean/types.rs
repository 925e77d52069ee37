//! Wire types for the exchange REST API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{FeeOption, MarketSnapshot, OrderResult, PriceBar, Token, TokenPair, TradeSide};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDto {
    pub symbol: String,
    pub address: String,
    #[serde(default)]
    pub decimals: Option<u32>,
}

impl From<TokenDto> for Token {
    fn from(dto: TokenDto) -> Self {
        Token {
            symbol: dto.symbol,
            address: dto.address,
            decimals: dto.decimals,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairDto {
    pub base_token: TokenDto,
    pub quote_token: TokenDto,
}

impl From<TokenPairDto> for TokenPair {
    fn from(dto: TokenPairDto) -> Self {
        TokenPair {
            base: dto.base_token.into(),
            quote: dto.quote_token.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlestickDto {
    pub close: Decimal,
    #[serde(alias = "startTime", alias = "timestamp")]
    pub start_block_timestamp: i64,
}

impl From<CandlestickDto> for PriceBar {
    fn from(dto: CandlestickDto) -> Self {
        PriceBar::new(dto.close, dto.start_block_timestamp)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerDto {
    #[serde(default)]
    pub last: Option<Decimal>,
}

impl TickerDto {
    /// `None` when the ticker carries no last trade
    pub fn snapshot(&self) -> Option<MarketSnapshot> {
        self.last.map(|last_price| MarketSnapshot { last_price })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOrderRequest {
    pub base_token_address: String,
    pub quote_token_address: String,
    pub side: TradeSide,
    pub order_amount: Decimal,
    pub fee_option: FeeOption,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOrderResponse {
    #[serde(alias = "orderHash", alias = "id")]
    pub order_id: String,
    #[serde(default)]
    pub filled_amount: Option<Decimal>,
    #[serde(default)]
    pub average_price: Option<Decimal>,
}

impl MarketOrderResponse {
    /// Convert to the domain result; a missing fill amount means the full order filled
    pub fn into_result(self, side: TradeSide, requested: Decimal) -> OrderResult {
        OrderResult {
            order_id: self.order_id,
            side,
            filled_amount: self.filled_amount.unwrap_or(requested),
            average_price: self.average_price,
        }
    }
}
