use crate::domain::errors::PredictionError;
use crate::domain::ml::scaler::FittedScaler;
use ndarray::Array2;
use std::sync::Arc;

/// A scaled input window ready for inference
#[derive(Debug, Clone)]
pub struct PredictionInput {
    /// Last `sequence_length` scaled feature rows, oldest first
    pub window: Array2<f64>,
    /// Unscaled close of the newest row
    pub last_close: f64,
    pub scaler: Arc<FittedScaler>,
}

/// Interface for next-close forecasting models
pub trait PricePredictor: Send + Sync {
    /// Forecast of the next close, in price units
    fn predict(&self, input: &PredictionInput) -> Result<f64, PredictionError>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
