//! Repository abstractions for the little state this service persists.

use crate::domain::errors::PreprocessError;
use crate::domain::ml::scaler::FittedScaler;

/// Storage for per-pair fitted scalers
pub trait ScalerRepository: Send + Sync {
    /// Returns `Ok(None)` when no scaler was stored for `pair`
    fn load(&self, pair: &str) -> Result<Option<FittedScaler>, PreprocessError>;

    fn save(&self, pair: &str, scaler: &FittedScaler) -> Result<(), PreprocessError>;
}
