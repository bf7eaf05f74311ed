//! Configuration module for trade-oracle.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by domain: Exchange, Strategy, Model, Server, Loop, and Observability.
//!
//! Every sub-config reads through a lookup function so tests can supply variables
//! without touching the process environment.

mod exchange_config;
mod loop_config;
mod model_config;
mod observability_config;
mod server_config;
mod strategy_config;

pub use exchange_config::{ExchangeEnvConfig, Mode};
pub use loop_config::LoopEnvConfig;
pub use model_config::ModelEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use server_config::ServerEnvConfig;
pub use strategy_config::StrategyEnvConfig;

use crate::application::prediction_service::PredictionSettings;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Source of configuration variables
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads `key`, treating blank values as unset
pub(crate) fn var_or(lookup: EnvLookup, key: &str, default: &str) -> String {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn parse_var<T>(lookup: EnvLookup, key: &str, default: T) -> Result<T>
where
    T: FromStr + ToString,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(lookup, key, &default.to_string())
        .parse::<T>()
        .context(format!("Failed to parse {}", key))
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub exchange: ExchangeEnvConfig,
    pub strategy: StrategyEnvConfig,
    pub model: ModelEnvConfig,
    pub server: ServerEnvConfig,
    pub trading_loop: LoopEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: EnvLookup) -> Result<Self> {
        Ok(Self {
            exchange: ExchangeEnvConfig::from_lookup(lookup)
                .context("Failed to load exchange config")?,
            strategy: StrategyEnvConfig::from_lookup(lookup)
                .context("Failed to load strategy config")?,
            model: ModelEnvConfig::from_lookup(lookup).context("Failed to load model config")?,
            server: ServerEnvConfig::from_lookup(lookup).context("Failed to load server config")?,
            trading_loop: LoopEnvConfig::from_lookup(lookup)
                .context("Failed to load loop config")?,
            observability: ObservabilityEnvConfig::from_lookup(lookup)
                .context("Failed to load observability config")?,
        })
    }

    pub fn prediction_settings(&self) -> PredictionSettings {
        PredictionSettings {
            timeframe: self.exchange.timeframe,
            candle_limit: self.exchange.candle_limit,
            sequence_length: self.strategy.sequence_length,
            levels: self.strategy.trade_levels(),
        }
    }
}
