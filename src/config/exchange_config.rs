//! Market data source configuration.

use super::{EnvLookup, parse_var, var_or};
use crate::domain::market::timeframe::Timeframe;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Where candles come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Binance,
    Mock,
    Csv,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binance" => Ok(Mode::Binance),
            "mock" => Ok(Mode::Mock),
            "csv" => Ok(Mode::Csv),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'binance', 'mock', or 'csv'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExchangeEnvConfig {
    pub mode: Mode,
    pub binance_base_url: String,
    pub binance_api_key: Option<String>,
    pub timeframe: Timeframe,
    pub candle_limit: usize,
    pub csv_data_dir: PathBuf,
    pub http_timeout_secs: u64,
    pub http_max_retries: u32,
}

impl ExchangeEnvConfig {
    pub fn from_lookup(lookup: EnvLookup) -> Result<Self> {
        let mode = Mode::from_str(&var_or(lookup, "MODE", "binance"))?;
        let timeframe = var_or(lookup, "TIMEFRAME", "1h")
            .parse::<Timeframe>()
            .context("Failed to parse TIMEFRAME")?;

        let candle_limit = parse_var(lookup, "CANDLE_LIMIT", 200usize)?;
        if candle_limit == 0 {
            anyhow::bail!("CANDLE_LIMIT must be greater than 0");
        }

        Ok(Self {
            mode,
            binance_base_url: var_or(lookup, "BINANCE_BASE_URL", "https://api.binance.com"),
            binance_api_key: lookup("BINANCE_API_KEY").filter(|k| !k.trim().is_empty()),
            timeframe,
            candle_limit,
            csv_data_dir: PathBuf::from(var_or(lookup, "CSV_DATA_DIR", "data")),
            http_timeout_secs: parse_var(lookup, "HTTP_TIMEOUT_SECS", 30u64)?,
            http_max_retries: parse_var(lookup, "HTTP_MAX_RETRIES", 3u32)?,
        })
    }
}
