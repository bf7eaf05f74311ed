//! JSON file persistence for fitted scalers.
//!
//! One file per pair: `{dir}/BTCUSDT.scaler.json`.

use crate::domain::errors::PreprocessError;
use crate::domain::ml::scaler::FittedScaler;
use crate::domain::repositories::ScalerRepository;
use crate::domain::trading::types::denormalize_crypto_symbol;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct JsonScalerRepository {
    dir: PathBuf,
}

impl JsonScalerRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, pair: &str) -> PathBuf {
        self.dir
            .join(format!("{}.scaler.json", denormalize_crypto_symbol(pair)))
    }
}

fn persistence_error(path: &Path, reason: impl ToString) -> PreprocessError {
    PreprocessError::Persistence {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

impl ScalerRepository for JsonScalerRepository {
    fn load(&self, pair: &str) -> Result<Option<FittedScaler>, PreprocessError> {
        let path = self.path_for(pair);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| persistence_error(&path, e))?;
        let scaler: FittedScaler =
            serde_json::from_str(&content).map_err(|e| persistence_error(&path, e))?;

        info!("Loaded scaler for {} from {:?}", pair, path);
        Ok(Some(scaler))
    }

    fn save(&self, pair: &str, scaler: &FittedScaler) -> Result<(), PreprocessError> {
        let path = self.path_for(pair);
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| persistence_error(&self.dir, e))?;
        }

        let content =
            serde_json::to_string_pretty(scaler).map_err(|e| persistence_error(&path, e))?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(|e| persistence_error(&temp_path, e))?;
        fs::rename(&temp_path, &path).map_err(|e| persistence_error(&path, e))?;

        info!("Saved scaler for {} to {:?}", pair, path);
        Ok(())
    }
}
