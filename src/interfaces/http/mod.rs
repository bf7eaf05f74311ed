//! HTTP surface (axum).

pub mod dto;
pub mod error;
pub mod handlers;

use crate::application::agents::ai_switch::AiSwitch;
use crate::application::agents::trading_loop::SharedLoopStatus;
use crate::application::prediction_service::PredictionService;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub switch: AiSwitch,
    pub status: SharedLoopStatus,
    pub supported_pairs: Arc<Vec<String>>,
    pub loop_pair: String,
}

impl AppState {
    pub fn new(
        service: Arc<PredictionService>,
        switch: AiSwitch,
        status: SharedLoopStatus,
        supported_pairs: Vec<String>,
        loop_pair: String,
    ) -> Self {
        Self {
            service,
            switch,
            status,
            supported_pairs: Arc::new(supported_pairs),
            loop_pair,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/predictive-values", get(handlers::predictive_values))
        .route("/api/trade", post(handlers::submit_trade))
        .route("/api/status", get(handlers::status))
        .route("/predict", post(handlers::predict))
        .route("/toggle_ai", post(handlers::toggle_ai))
        .with_state(state)
}
