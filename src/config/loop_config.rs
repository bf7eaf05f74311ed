//! Polling loop configuration.

use super::{EnvLookup, parse_var, var_or};
use crate::application::agents::trading_loop::LoopSettings;
use anyhow::Result;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LoopEnvConfig {
    pub pair: String,
    pub idle_poll_secs: u64,
    pub cycle_interval_secs: u64,
    pub cooldown_secs: u64,
    pub error_backoff_secs: u64,
    /// Initial state of the AI switch
    pub start_enabled: bool,
}

impl LoopEnvConfig {
    pub fn from_lookup(lookup: EnvLookup) -> Result<Self> {
        Ok(Self {
            pair: var_or(lookup, "LOOP_PAIR", "BTC/USDT").to_uppercase(),
            idle_poll_secs: parse_var(lookup, "IDLE_POLL_SECS", 10u64)?,
            cycle_interval_secs: parse_var(lookup, "CYCLE_INTERVAL_SECS", 60u64)?,
            cooldown_secs: parse_var(lookup, "COOLDOWN_SECS", 60u64)?,
            error_backoff_secs: parse_var(lookup, "ERROR_BACKOFF_SECS", 60u64)?,
            start_enabled: parse_var(lookup, "AI_START_ENABLED", false)?,
        })
    }

    pub fn settings(&self) -> LoopSettings {
        LoopSettings {
            pair: self.pair.clone(),
            idle_poll: Duration::from_secs(self.idle_poll_secs),
            cycle_interval: Duration::from_secs(self.cycle_interval_secs),
            cooldown: Duration::from_secs(self.cooldown_secs),
            error_backoff: Duration::from_secs(self.error_backoff_secs),
        }
    }
}
