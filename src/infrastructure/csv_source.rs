//! Offline candle replay from CSV files.
//!
//! One file per pair: `{dir}/BTCUSDT.csv` with header
//! `timestamp,open,high,low,close,volume` (timestamp in unix milliseconds).

use crate::domain::errors::MarketDataError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::MarketDataService;
use crate::domain::trading::types::{Candle, denormalize_crypto_symbol};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CandleRecord {
    timestamp: i64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

pub struct CsvMarketDataService {
    dir: PathBuf,
}

impl CsvMarketDataService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, pair: &str) -> PathBuf {
        self.dir
            .join(format!("{}.csv", denormalize_crypto_symbol(pair)))
    }
}

#[async_trait]
impl MarketDataService for CsvMarketDataService {
    /// Returns the last `limit` rows of the file; the timeframe is whatever the file holds.
    async fn fetch_candles(
        &self,
        pair: &str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let path = self.path_for(pair);
        let content = tokio::fs::read(&path)
            .await
            .map_err(|e| MarketDataError::Request {
                pair: pair.to_string(),
                reason: format!("cannot read {:?}: {}", path, e),
            })?;

        let mut rdr = csv::Reader::from_reader(content.as_slice());
        let mut candles: Vec<Candle> = Vec::new();
        let mut skipped = 0usize;

        for result in rdr.deserialize::<CandleRecord>() {
            match result {
                Ok(record) => candles.push(Candle {
                    symbol: pair.to_string(),
                    open: record.open,
                    high: record.high,
                    low: record.low,
                    close: record.close,
                    volume: record.volume,
                    timestamp: record.timestamp,
                }),
                Err(e) => {
                    skipped += 1;
                    debug!("CsvMarketDataService: skipping row in {:?}: {}", path, e);
                }
            }
        }

        if skipped > 0 {
            warn!(
                "CsvMarketDataService: skipped {} malformed rows in {:?}",
                skipped, path
            );
        }
        if candles.is_empty() {
            return Err(MarketDataError::Empty {
                pair: pair.to_string(),
            });
        }

        candles.sort_by_key(|c| c.timestamp);
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
        Ok(candles)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_reads_last_rows_of_pair_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::from("timestamp,open,high,low,close,volume\n");
        for i in 0..5 {
            content.push_str(&format!("{},10,11,9,{}.5,100\n", i * 60_000, 10 + i));
        }
        content.push_str("not,a,valid,row,at,all\n");
        std::fs::write(dir.path().join("ETHUSDT.csv"), content).unwrap();

        let source = CsvMarketDataService::new(dir.path());
        let candles = source
            .fetch_candles("ETH/USDT", Timeframe::OneMin, 3)
            .await
            .unwrap();

        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].timestamp, 120_000);
        assert_eq!(candles[2].close, dec!(14.5));
    }

    #[tokio::test]
    async fn test_missing_file_is_request_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvMarketDataService::new(dir.path())
            .fetch_candles("BTC/USDT", Timeframe::OneHour, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Request { .. }));
    }
}
