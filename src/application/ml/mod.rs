pub mod mock_predictor;
pub mod onnx_predictor;
pub mod predictor;
pub mod scaler_provider;

use mock_predictor::MockPredictor;
use onnx_predictor::OnnxPredictor;
use predictor::PricePredictor;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Loads the ONNX forecaster, falling back to the mock predictor when it is unavailable.
pub fn load_predictor(model_path: &Path, sequence_length: usize) -> Arc<dyn PricePredictor> {
    match OnnxPredictor::load(model_path, sequence_length) {
        Some(predictor) => Arc::new(predictor),
        None => {
            warn!(
                "No usable model at {:?}, using mock predictor (last close + 5%)",
                model_path
            );
            Arc::new(MockPredictor)
        }
    }
}
