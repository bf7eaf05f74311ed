//! Forecasting model and scaler persistence configuration.

use super::{EnvLookup, var_or};
use crate::application::ml::scaler_provider::ScalerMode;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    pub scaler_mode: ScalerMode,
    pub scaler_dir: PathBuf,
}

impl ModelEnvConfig {
    pub fn from_lookup(lookup: EnvLookup) -> Result<Self> {
        Ok(Self {
            model_path: PathBuf::from(var_or(lookup, "MODEL_PATH", "models/lstm_model.onnx")),
            scaler_mode: var_or(lookup, "SCALER_MODE", "persisted")
                .parse::<ScalerMode>()
                .context("Failed to parse SCALER_MODE")?,
            scaler_dir: PathBuf::from(var_or(lookup, "SCALER_DIR", "models/scalers")),
        })
    }
}
