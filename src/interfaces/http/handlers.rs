use super::AppState;
use super::dto::{
    MessageResponse, PairQuery, PredictResponse, PredictiveValuesResponse, StatusResponse,
    TradeResponse,
};
use super::error::ApiError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use serde_json::{Value, json};
use tracing::{info, warn};

const DEFAULT_PAIR: &str = "BTC/USDT";

/// Fields `/api/trade` requires, checked in this order
pub const REQUIRED_TRADE_FIELDS: [&str; 4] =
    ["tradingPair", "tradeType", "orderType", "investmentAmount"];

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn predictive_values(
    State(state): State<AppState>,
    Query(query): Query<PairQuery>,
) -> Result<Json<PredictiveValuesResponse>, ApiError> {
    let pair = query.pair.unwrap_or_else(|| DEFAULT_PAIR.to_string());
    info!("Received predictive values request for pair: {}", pair);

    if !state.supported_pairs.iter().any(|p| *p == pair) {
        return Err(ApiError::bad_request(format!(
            "Invalid trading pair. Supported pairs: {}",
            state.supported_pairs.join(", ")
        )));
    }

    let intent = state
        .service
        .predictive_values(&pair)
        .await
        .map_err(|e| ApiError::pipeline(&pair, &e))?;

    let response = PredictiveValuesResponse::from(&intent);
    info!(
        "Predictive values for {}: {} entry={} stop={} target={} predicted={}",
        pair,
        intent.direction,
        response.entry_price,
        response.stop_loss_price,
        response.take_profit_price,
        response.predicted_price
    );
    Ok(Json(response))
}

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let pair = body
        .get("pair")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PAIR)
        .to_string();

    let evaluation = state
        .service
        .evaluate(&pair)
        .await
        .map_err(|e| ApiError::pipeline(&pair, &e))?;

    Ok(Json(PredictResponse {
        pair,
        current_price: evaluation.current_price,
        predicted_price: evaluation.predicted_price,
    }))
}

pub async fn toggle_ai(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let invalid = || ApiError::bad_request("Invalid state. Use 'on' or 'off'.");

    let Json(body) = body.map_err(|_| invalid())?;
    let requested = body
        .get("state")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_lowercase());

    let enabled = match requested.as_deref() {
        Some("on") => true,
        Some("off") => false,
        _ => return Err(invalid()),
    };

    state.switch.set(enabled);
    let label = if enabled { "ON" } else { "OFF" };
    info!("AI Trading is now {}.", label);

    Ok(Json(MessageResponse {
        message: format!("AI Trading has been turned {}.", label),
    }))
}

/// Absent, null, false, zero and empty values all count as missing
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Bool(true)) => false,
    }
}

/// Accepts a trade setup and echoes it back with a mock transaction hash. Nothing is executed.
pub async fn submit_trade(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TradeResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let Some(fields) = body.as_object() else {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    };

    if let Some(missing) = REQUIRED_TRADE_FIELDS
        .iter()
        .find(|field| is_missing(fields.get(**field)))
    {
        warn!("Rejected trade setup: missing {}", missing);
        return Err(ApiError::bad_request(format!(
            "Missing required field: {}",
            missing
        )));
    }

    info!("Trade submitted: {}", body);
    Ok(Json(TradeResponse {
        message: "Trade setup completed successfully".to_string(),
        txn_hash: format!("mock-tx-{}", chrono::Utc::now().timestamp()),
        trade_details: body,
    }))
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let trading_loop = state.status.read().await.clone();
    Json(StatusResponse {
        ai_enabled: state.switch.is_enabled(),
        pair: state.loop_pair.clone(),
        predictor: state.service.predictor_name().to_string(),
        market_source: state.service.market_source().to_string(),
        trading_loop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::agents::ai_switch::AiSwitch;
    use crate::application::agents::trading_loop::LoopStatus;
    use crate::application::market_data::indicator_pipeline::IndicatorPipeline;
    use crate::application::ml::mock_predictor::MockPredictor;
    use crate::application::ml::scaler_provider::ScalerProvider;
    use crate::application::prediction_service::{PredictionService, PredictionSettings};
    use crate::infrastructure::mock::MockMarketDataService;
    use crate::infrastructure::observability::Metrics;
    use axum::http::StatusCode;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn state_with(market: MockMarketDataService) -> AppState {
        let service = PredictionService::new(
            Arc::new(market),
            IndicatorPipeline::default(),
            Arc::new(ScalerProvider::per_cycle()),
            Arc::new(MockPredictor),
            Metrics::new().unwrap(),
            PredictionSettings::default(),
        );
        AppState::new(
            Arc::new(service),
            AiSwitch::default(),
            Arc::new(RwLock::new(LoopStatus::default())),
            vec!["BTC/USDT".to_string(), "ETH/USDT".to_string()],
            "BTC/USDT".to_string(),
        )
    }

    fn pair(p: Option<&str>) -> Query<PairQuery> {
        Query(PairQuery {
            pair: p.map(str::to_string),
        })
    }

    #[test]
    fn test_missing_field_rules() {
        assert!(is_missing(None));
        assert!(is_missing(Some(&json!(null))));
        assert!(is_missing(Some(&json!(""))));
        assert!(is_missing(Some(&json!(0))));
        assert!(is_missing(Some(&json!(0.0))));
        assert!(is_missing(Some(&json!(false))));
        assert!(!is_missing(Some(&json!("BTC/USDT"))));
        assert!(!is_missing(Some(&json!(250))));
        assert!(!is_missing(Some(&json!(true))));
    }

    #[tokio::test]
    async fn test_unsupported_pair_rejected() {
        let state = state_with(MockMarketDataService::new());
        let err = predictive_values(State(state), pair(Some("DOGE/USDT")))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message,
            "Invalid trading pair. Supported pairs: BTC/USDT, ETH/USDT"
        );
    }

    #[tokio::test]
    async fn test_predictive_values_default_pair() {
        let state = state_with(MockMarketDataService::new());
        let Json(response) = predictive_values(State(state), pair(None)).await.unwrap();

        assert_eq!(response.pair, "BTC/USDT");
        assert!(response.predicted_price > response.entry_price);
        assert!(response.stop_loss_price < response.entry_price);
    }

    #[tokio::test]
    async fn test_fetch_failure_maps_to_500() {
        let state = state_with(MockMarketDataService::failing());
        let err = predictive_values(State(state), pair(Some("ETH/USDT")))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to fetch data for ETH/USDT");
    }

    #[tokio::test]
    async fn test_toggle_on_then_off() {
        let state = state_with(MockMarketDataService::new());
        let switch = state.switch.clone();

        let Json(on) = toggle_ai(State(state.clone()), Ok(Json(json!({"state": "ON"}))))
            .await
            .unwrap();
        assert_eq!(on.message, "AI Trading has been turned ON.");
        assert!(switch.is_enabled());

        let Json(off) = toggle_ai(State(state.clone()), Ok(Json(json!({"state": "off"}))))
            .await
            .unwrap();
        assert_eq!(off.message, "AI Trading has been turned OFF.");
        assert!(!switch.is_enabled());

        let err = toggle_ai(State(state), Ok(Json(json!({"state": "maybe"}))))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Invalid state. Use 'on' or 'off'.");
        assert!(!switch.is_enabled());
    }

    #[tokio::test]
    async fn test_trade_validation_order() {
        let err = submit_trade(Ok(Json(json!({
            "tradeType": "buy",
            "orderType": "market",
            "investmentAmount": 0
        }))))
        .await
        .unwrap_err();
        assert_eq!(err.message, "Missing required field: tradingPair");

        let err = submit_trade(Ok(Json(json!({
            "tradingPair": "BTC/USDT",
            "tradeType": "buy",
            "orderType": "market",
            "investmentAmount": 0
        }))))
        .await
        .unwrap_err();
        assert_eq!(err.message, "Missing required field: investmentAmount");

        let err = submit_trade(Ok(Json(json!(["not", "an", "object"]))))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_trade_accepted_echoes_details() {
        let body = json!({
            "tradingPair": "ETH/USDT",
            "tradeType": "buy",
            "orderType": "limit",
            "investmentAmount": 150.5,
            "note": "extra fields are kept"
        });
        let Json(response) = submit_trade(Ok(Json(body.clone()))).await.unwrap();

        assert_eq!(response.message, "Trade setup completed successfully");
        assert!(response.txn_hash.starts_with("mock-tx-"));
        assert_eq!(response.trade_details, body);
    }

    #[tokio::test]
    async fn test_health_has_no_side_effects() {
        let state = state_with(MockMarketDataService::new());
        let Json(body) = health().await;
        assert_eq!(body, json!({"status": "ok"}));
        assert!(!state.switch.is_enabled());
    }

    #[tokio::test]
    async fn test_status_reports_backend() {
        let state = state_with(MockMarketDataService::new());
        let Json(response) = status(State(state)).await;
        assert_eq!(response.predictor, "Mock (+5%)");
        assert_eq!(response.market_source, "mock");
        assert!(!response.ai_enabled);
    }
}
