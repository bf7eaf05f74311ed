use crate::domain::errors::PreprocessError;
use crate::domain::ml::scaler::FittedScaler;
use crate::domain::repositories::ScalerRepository;
use anyhow::anyhow;
use ndarray::Array2;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// How scaling parameters are obtained for a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalerMode {
    /// Refit on every fetched window (never persisted)
    PerCycle,
    /// Fit once per pair, then reuse the stored scaler
    Persisted,
}

impl FromStr for ScalerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per_cycle" | "per-cycle" | "percycle" => Ok(ScalerMode::PerCycle),
            "persisted" | "persistent" => Ok(ScalerMode::Persisted),
            other => Err(anyhow!("Unknown scaler mode: {}", other)),
        }
    }
}

pub struct ScalerProvider {
    mode: ScalerMode,
    repository: Option<Arc<dyn ScalerRepository>>,
    cache: RwLock<HashMap<String, Arc<FittedScaler>>>,
}

impl ScalerProvider {
    pub fn new(mode: ScalerMode, repository: Option<Arc<dyn ScalerRepository>>) -> Self {
        if mode == ScalerMode::Persisted && repository.is_none() {
            warn!("ScalerProvider: persisted mode without a repository, scalers live in memory only");
        }
        Self {
            mode,
            repository,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Per-cycle fitting, no storage
    pub fn per_cycle() -> Self {
        Self::new(ScalerMode::PerCycle, None)
    }

    pub fn mode(&self) -> ScalerMode {
        self.mode
    }

    /// Returns the scaler to apply to `matrix` for `pair`.
    pub fn resolve(
        &self,
        pair: &str,
        matrix: &Array2<f64>,
    ) -> Result<Arc<FittedScaler>, PreprocessError> {
        if self.mode == ScalerMode::PerCycle {
            return Ok(Arc::new(FittedScaler::fit(matrix)?));
        }

        if let Some(cached) = self.cached(pair) {
            return Ok(cached);
        }

        if let Some(repository) = &self.repository {
            match repository.load(pair)? {
                Some(stored) if stored.is_compatible() => {
                    let stored = Arc::new(stored);
                    self.remember(pair, stored.clone());
                    return Ok(stored);
                }
                Some(stored) => {
                    warn!(
                        "ScalerProvider: stored scaler for {} is incompatible (version {}, {} columns), refitting",
                        pair,
                        stored.version,
                        stored.columns.len()
                    );
                }
                None => {}
            }
        }

        self.refit(pair, matrix)
    }

    /// Fits a fresh scaler for `pair` and replaces whatever was stored.
    pub fn refit(
        &self,
        pair: &str,
        matrix: &Array2<f64>,
    ) -> Result<Arc<FittedScaler>, PreprocessError> {
        let scaler = FittedScaler::fit(matrix)?;
        if self.mode == ScalerMode::Persisted {
            if let Some(repository) = &self.repository {
                repository.save(pair, &scaler)?;
            }
        }
        info!(
            "ScalerProvider: fitted scaler for {} on {} samples",
            pair, scaler.samples
        );

        let scaler = Arc::new(scaler);
        if self.mode == ScalerMode::Persisted {
            self.remember(pair, scaler.clone());
        }
        Ok(scaler)
    }

    fn cached(&self, pair: &str) -> Option<Arc<FittedScaler>> {
        self.cache.read().ok()?.get(pair).cloned()
    }

    fn remember(&self, pair: &str, scaler: Arc<FittedScaler>) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(pair.to_string(), scaler);
        }
    }
}
