//! HTTP server configuration.

use super::{EnvLookup, parse_var, var_or};
use anyhow::Result;

pub const DEFAULT_SUPPORTED_PAIRS: &[&str] =
    &["BTC/USDT", "ETH/USDT", "APT/USDT", "SOL/USDT", "BNB/USDT"];

#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub bind_address: String,
    pub port: u16,
    /// Pairs accepted by `/api/predictive-values`, in display order
    pub supported_pairs: Vec<String>,
}

impl ServerEnvConfig {
    pub fn from_lookup(lookup: EnvLookup) -> Result<Self> {
        let supported_pairs: Vec<String> = var_or(
            lookup,
            "SUPPORTED_PAIRS",
            &DEFAULT_SUPPORTED_PAIRS.join(","),
        )
        .split(',')
        .map(|p| p.trim().to_uppercase())
        .filter(|p| !p.is_empty())
        .collect();

        if supported_pairs.is_empty() {
            anyhow::bail!("SUPPORTED_PAIRS must list at least one pair");
        }

        Ok(Self {
            bind_address: var_or(lookup, "BIND_ADDRESS", "0.0.0.0"),
            port: parse_var(lookup, "PORT", 5000u16)?,
            supported_pairs,
        })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
