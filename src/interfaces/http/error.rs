use crate::domain::errors::PipelineError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error returned by handlers, rendered as `{"error": message}`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// One fixed message per failed pipeline stage; details stay in the logs
    pub fn pipeline(pair: &str, error: &PipelineError) -> Self {
        let message = match error {
            PipelineError::MarketData(_) => format!("Failed to fetch data for {}", pair),
            PipelineError::Indicators(_) => "Failed to compute indicators".to_string(),
            PipelineError::Preprocess(_) => "Data preprocessing failed".to_string(),
            PipelineError::Prediction(_) => "Prediction failed".to_string(),
        };
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
