use thiserror::Error;

/// Errors related to market data retrieval
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Request for {pair} failed: {reason}")]
    Request { pair: String, reason: String },

    #[error("Exchange rejected request for {pair} (HTTP {status}): {body}")]
    ExchangeRejected {
        pair: String,
        status: u16,
        body: String,
    },

    #[error("Invalid market data for {pair}: {reason}")]
    InvalidData { pair: String, reason: String },

    #[error("No candles returned for {pair}")]
    Empty { pair: String },
}

/// Errors raised while computing the indicator batch.
///
/// Any of these aborts the whole batch.
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("Invalid {indicator} parameters: {reason}")]
    InvalidParameter { indicator: &'static str, reason: String },

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: String },

    #[error("Cannot compute indicators on an empty candle window")]
    EmptyWindow,
}

/// Errors raised while building or scaling the feature matrix
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Insufficient history: need {required} complete rows, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Feature matrix has {actual} columns, scaler expects {expected}")]
    ColumnMismatch { expected: usize, actual: usize },

    #[error("Scaler persistence failed for {path}: {reason}")]
    Persistence { path: String, reason: String },
}

/// Errors raised by a predictor backend
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Model inference failed: {0}")]
    Backend(String),

    #[error("Invalid model input: {0}")]
    InvalidInput(String),

    #[error("Model produced a non-finite forecast: {0}")]
    NonFinite(f64),
}

/// Failure of one fetch → indicators → scale → predict run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error(transparent)]
    Indicators(#[from] IndicatorError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl PipelineError {
    /// Stage label used for metrics and logs
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::MarketData(_) => "fetch_error",
            PipelineError::Indicators(_) => "indicator_error",
            PipelineError::Preprocess(_) => "preprocess_error",
            PipelineError::Prediction(_) => "prediction_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_data_error_formatting() {
        let error = MarketDataError::ExchangeRejected {
            pair: "BTC/USDT".to_string(),
            status: 429,
            body: "Too many requests".to_string(),
        };

        let msg = error.to_string();
        assert!(msg.contains("BTC/USDT"));
        assert!(msg.contains("429"));
    }

    #[test]
    fn test_pipeline_error_stage() {
        let err: PipelineError = PreprocessError::InsufficientHistory {
            required: 10,
            available: 3,
        }
        .into();
        assert_eq!(err.stage(), "preprocess_error");
        assert!(err.to_string().contains("need 10"));

        let err: PipelineError = PredictionError::NonFinite(f64::NAN).into();
        assert_eq!(err.stage(), "prediction_error");
    }
}
