//! Observability configuration parsing from environment variables.

use super::{EnvLookup, parse_var};
use anyhow::Result;

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    /// Seconds between JSON metric snapshots
    pub interval_secs: u64,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_lookup(lookup: EnvLookup) -> Result<Self> {
        let interval_secs = parse_var(lookup, "OBSERVABILITY_INTERVAL", 60u64)?;
        if interval_secs == 0 {
            anyhow::bail!("OBSERVABILITY_INTERVAL must be greater than 0");
        }

        Ok(Self {
            enabled: parse_var(lookup, "OBSERVABILITY_ENABLED", true)?,
            interval_secs,
        })
    }
}
