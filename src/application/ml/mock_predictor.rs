use super::predictor::{PredictionInput, PricePredictor};
use crate::domain::errors::PredictionError;

/// Stand-in forecaster used when no model is available: last close plus 5%.
pub struct MockPredictor;

const MOCK_UPLIFT: f64 = 1.05;

impl PricePredictor for MockPredictor {
    fn predict(&self, input: &PredictionInput) -> Result<f64, PredictionError> {
        if !input.last_close.is_finite() {
            return Err(PredictionError::InvalidInput(format!(
                "last close is not finite: {}",
                input.last_close
            )));
        }
        Ok(input.last_close * MOCK_UPLIFT)
    }

    fn name(&self) -> &str {
        "Mock (+5%)"
    }

    fn version(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::FEATURE_COUNT;
    use crate::domain::ml::scaler::FittedScaler;
    use ndarray::Array2;
    use std::sync::Arc;

    #[test]
    fn test_mock_is_five_percent_above_last_close() {
        let window = Array2::from_elem((10, FEATURE_COUNT), 0.5);
        let scaler = Arc::new(FittedScaler::fit(&window).unwrap());
        let input = PredictionInput {
            window,
            last_close: 200.0,
            scaler,
        };

        assert_eq!(MockPredictor.predict(&input).unwrap(), 200.0 * 1.05);
    }
}
