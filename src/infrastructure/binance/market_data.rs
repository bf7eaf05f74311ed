//! Binance Market Data Service
//!
//! Historical candles (klines) over the public REST API.

use crate::domain::errors::MarketDataError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::MarketDataService;
use crate::domain::trading::types::{Candle, denormalize_crypto_symbol};
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, build_url_with_query};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Binance caps a single klines request at 1000 rows
const MAX_KLINES_LIMIT: usize = 1000;

pub struct BinanceMarketDataService {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    base_url: String,
}

impl BinanceMarketDataService {
    pub fn builder() -> BinanceMarketDataServiceBuilder {
        BinanceMarketDataServiceBuilder::default()
    }
}

#[derive(Default)]
pub struct BinanceMarketDataServiceBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
}

impl BinanceMarketDataServiceBuilder {
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn build(self) -> BinanceMarketDataService {
        let base_url = self
            .base_url
            .unwrap_or_else(|| "https://api.binance.com".to_string());
        let client = HttpClientFactory::create_client(
            self.timeout.unwrap_or(Duration::from_secs(30)),
            self.max_retries.unwrap_or(3),
        );

        BinanceMarketDataService {
            client,
            api_key: self.api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Parses Binance klines rows: `[openTime, "open", "high", "low", "close", "volume", ...]`.
///
/// Malformed rows are skipped.
pub fn parse_klines(pair: &str, klines: &[serde_json::Value]) -> Vec<Candle> {
    let decimal = |v: &serde_json::Value| v.as_str()?.parse::<Decimal>().ok();

    let candles: Vec<Candle> = klines
        .iter()
        .filter_map(|k| {
            let arr = k.as_array()?;
            if arr.len() < 6 {
                return None;
            }

            Some(Candle {
                symbol: pair.to_string(),
                open: decimal(&arr[1])?,
                high: decimal(&arr[2])?,
                low: decimal(&arr[3])?,
                close: decimal(&arr[4])?,
                volume: decimal(&arr[5])?,
                timestamp: arr[0].as_i64()?,
            })
        })
        .collect();

    if candles.len() < klines.len() {
        warn!(
            "BinanceMarketDataService: skipped {} malformed klines for {}",
            klines.len() - candles.len(),
            pair
        );
    }
    candles
}

#[async_trait]
impl MarketDataService for BinanceMarketDataService {
    async fn fetch_candles(
        &self,
        pair: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let api_symbol = denormalize_crypto_symbol(pair);
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit_str = limit.clamp(1, MAX_KLINES_LIMIT).to_string();

        let url_with_query = build_url_with_query(
            &url,
            &[
                ("symbol", api_symbol.as_str()),
                ("interval", timeframe.to_binance_string()),
                ("limit", limit_str.as_str()),
            ],
        );
        debug!("BinanceMarketDataService: GET {}", url_with_query);

        let mut request = self.client.get(&url_with_query);
        if let Some(api_key) = &self.api_key {
            request = request.header("X-MBX-APIKEY", api_key);
        }

        let response = request.send().await.map_err(|e| MarketDataError::Request {
            pair: pair.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ExchangeRejected {
                pair: pair.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let klines: Vec<serde_json::Value> =
            response
                .json()
                .await
                .map_err(|e| MarketDataError::InvalidData {
                    pair: pair.to_string(),
                    reason: format!("Failed to parse klines response: {}", e),
                })?;

        let candles = parse_klines(pair, &klines);
        if candles.is_empty() {
            return Err(MarketDataError::Empty {
                pair: pair.to_string(),
            });
        }

        info!(
            "BinanceMarketDataService: Fetched {} bars for {}",
            candles.len(),
            pair
        );
        Ok(candles)
    }

    fn name(&self) -> &str {
        "binance"
    }
}
