use super::predictor::{PredictionInput, PricePredictor};
use crate::domain::errors::PredictionError;
use crate::domain::ml::feature_registry::{CLOSE_COLUMN, FEATURE_COUNT};
use ort::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};

/// LSTM forecaster served through ONNX Runtime.
///
/// Input is `[1, sequence_length, 9]` f32 scaled features; the first output
/// element is a scaled close, mapped back to price units with the input's scaler.
pub struct OnnxPredictor {
    session: Mutex<Session>,
    model_path: PathBuf,
    sequence_length: usize,
}

impl OnnxPredictor {
    /// Returns `None` when the model file is missing or cannot be loaded.
    pub fn load(model_path: &Path, sequence_length: usize) -> Option<Self> {
        if !model_path.exists() {
            warn!("ONNX Model file not found at {:?}.", model_path);
            return None;
        }

        let builder = match Session::builder() {
            Ok(builder) => builder,
            Err(e) => {
                error!("Failed to create ONNX session builder: {}", e);
                return None;
            }
        };

        match builder.commit_from_file(model_path) {
            Ok(session) => {
                info!("Successfully loaded ONNX model from {:?}", model_path);
                Some(Self {
                    session: Mutex::new(session),
                    model_path: model_path.to_path_buf(),
                    sequence_length,
                })
            }
            Err(e) => {
                error!("Failed to load ONNX model {:?}: {}", model_path, e);
                None
            }
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl PricePredictor for OnnxPredictor {
    fn predict(&self, input: &PredictionInput) -> Result<f64, PredictionError> {
        let (rows, cols) = input.window.dim();
        if rows != self.sequence_length || cols != FEATURE_COUNT {
            return Err(PredictionError::InvalidInput(format!(
                "expected window {}x{}, got {}x{}",
                self.sequence_length, FEATURE_COUNT, rows, cols
            )));
        }

        // Flatten into [batch, seq_len, features], row-major
        let flat_data: Vec<f32> = input.window.iter().map(|v| *v as f32).collect();
        let shape = vec![1, rows, cols];

        let input_value = ort::value::Value::from_array((shape.as_slice(), flat_data))
            .map_err(|e| PredictionError::Backend(format!("Input value creation failed: {}", e)))?;
        let inputs = ort::inputs![input_value];

        let mut session_mutex = self
            .session
            .lock()
            .map_err(|e| PredictionError::Backend(format!("Mutex lock failed: {}", e)))?;

        let outputs = session_mutex
            .run(inputs)
            .map_err(|e| PredictionError::Backend(e.to_string()))?;
        let output_value = outputs
            .iter()
            .next()
            .map(|(_, v)| v)
            .ok_or_else(|| PredictionError::Backend("No output found".to_string()))?;
        let data = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictionError::Backend(e.to_string()))?;
        let scaled = *data
            .1
            .iter()
            .next()
            .ok_or_else(|| PredictionError::Backend("Empty output".to_string()))?
            as f64;

        let forecast = input.scaler.inverse_column(CLOSE_COLUMN, scaled);
        if !forecast.is_finite() {
            return Err(PredictionError::NonFinite(forecast));
        }
        Ok(forecast)
    }

    fn name(&self) -> &str {
        "ONNX Runtime (LSTM)"
    }

    fn version(&self) -> &str {
        "lstm_model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_not_loaded() {
        let predictor = OnnxPredictor::load(Path::new("models/does_not_exist.onnx"), 10);
        assert!(predictor.is_none());
    }

    #[test]
    fn test_unreadable_model_is_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.onnx");
        std::fs::write(&path, b"definitely not a protobuf").unwrap();

        assert!(OnnxPredictor::load(&path, 10).is_none());
    }
}
