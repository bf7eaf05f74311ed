use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub symbol: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Open time, unix milliseconds
    pub timestamp: i64,
}

impl Candle {
    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or(f64::NAN)
    }
}

/// Side of an advisory trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Entry / stop-loss / take-profit suggestion derived from a forecast.
///
/// Purely advisory: never reconciled against a real order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub pair: String,
    pub direction: Direction,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub predicted: f64,
}

// ===== Symbol Normalization =====

/// Supported quote currencies for crypto pairs, ordered by priority (longest first to prefer USDT over USD)
const CRYPTO_QUOTE_CURRENCIES: &[&str] = &[
    "USDT", "USDC", "BUSD", "TUSD", // Stablecoins (4 chars)
    "USD", "EUR", "GBP", "BTC", "ETH", // Traditional (3 chars)
];

/// Converts an exchange symbol ("BTCUSDT") to the application pair format ("BTC/USDT").
///
/// ```
/// use trade_oracle::domain::trading::types::normalize_crypto_symbol;
///
/// assert_eq!(normalize_crypto_symbol("BTCUSDT").unwrap(), "BTC/USDT");
/// assert_eq!(normalize_crypto_symbol("ETH/USDT").unwrap(), "ETH/USDT");
/// ```
pub fn normalize_crypto_symbol(symbol: &str) -> Result<String, String> {
    if symbol.contains('/') {
        return Ok(symbol.to_string());
    }

    if symbol.is_empty() {
        return Err("Cannot normalize empty symbol".to_string());
    }

    for quote in CRYPTO_QUOTE_CURRENCIES {
        if symbol.ends_with(quote) && symbol.len() > quote.len() {
            let base = &symbol[..symbol.len() - quote.len()];
            if base.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
                return Ok(format!("{}/{}", base, quote));
            }
        }
    }

    Err(format!(
        "Cannot normalize crypto symbol: '{}' - no recognized quote currency",
        symbol
    ))
}

/// Converts "BTC/USDT" to the exchange format "BTCUSDT"
pub fn denormalize_crypto_symbol(symbol: &str) -> String {
    symbol.replace('/', "").to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_denormalize_crypto_symbol() {
        assert_eq!(denormalize_crypto_symbol("BTC/USDT"), "BTCUSDT");
        assert_eq!(denormalize_crypto_symbol("eth/usdt"), "ETHUSDT");
        assert_eq!(denormalize_crypto_symbol("SOLUSDT"), "SOLUSDT");
    }

    #[test]
    fn test_normalize_crypto_symbol() {
        assert_eq!(normalize_crypto_symbol("BTCUSDT").unwrap(), "BTC/USDT");
        assert_eq!(normalize_crypto_symbol("APTUSDT").unwrap(), "APT/USDT");
        assert_eq!(normalize_crypto_symbol("BNB/USDT").unwrap(), "BNB/USDT");
        assert!(normalize_crypto_symbol("").is_err());
        assert!(normalize_crypto_symbol("XYZ").is_err());
    }

    #[test]
    fn test_normalize_denormalize_roundtrip() {
        for pair in ["BTC/USDT", "ETH/USDT", "SOL/USDT"] {
            let exchange = denormalize_crypto_symbol(pair);
            assert_eq!(normalize_crypto_symbol(&exchange).unwrap(), pair);
        }
    }

    #[test]
    fn test_candle_close_f64() {
        let candle = Candle {
            symbol: "BTC/USDT".to_string(),
            open: dec!(100),
            high: dec!(110),
            low: dec!(95),
            close: dec!(105.5),
            volume: dec!(12),
            timestamp: 0,
        };
        assert_eq!(candle.close_f64(), 105.5);
    }
}
