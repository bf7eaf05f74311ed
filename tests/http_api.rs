use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::collections::HashMap;
use trade_oracle::application::system::Application;
use trade_oracle::config::Config;
use trade_oracle::domain::market::timeframe::Timeframe;
use trade_oracle::infrastructure::mock::random_walk;
use trade_oracle::interfaces::http::router;

async fn spawn_server() -> Result<(String, Application)> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();

    let vars: HashMap<&str, &str> = HashMap::from([
        ("MODE", "mock"),
        ("SCALER_MODE", "per_cycle"),
        ("MODEL_PATH", "missing/model.onnx"),
        ("OBSERVABILITY_ENABLED", "false"),
    ]);
    let config = Config::from_lookup(&|key| vars.get(key).map(|v| v.to_string()))?;
    let app = Application::build(config).await?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = app.app_state();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });

    Ok((format!("http://{}", addr), app))
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let (base, _app) = spawn_server().await?;
    let response = reqwest::get(format!("{}/health", base)).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await?, json!({"status": "ok"}));
    Ok(())
}

#[tokio::test]
async fn test_toggle_ai_round_trip() -> Result<()> {
    let (base, app) = spawn_server().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/toggle_ai", base))
        .json(&json!({"state": "on"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>().await?,
        json!({"message": "AI Trading has been turned ON."})
    );
    assert!(app.switch.is_enabled());

    let response = client
        .post(format!("{}/toggle_ai", base))
        .json(&json!({"state": "sideways"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>().await?,
        json!({"error": "Invalid state. Use 'on' or 'off'."})
    );
    assert!(app.switch.is_enabled());

    let status: Value = client
        .get(format!("{}/api/status", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(status["ai_enabled"], json!(true));
    assert_eq!(status["predictor"], json!("Mock (+5%)"));
    Ok(())
}

#[tokio::test]
async fn test_trade_missing_field() -> Result<()> {
    let (base, _app) = spawn_server().await?;
    let response = reqwest::Client::new()
        .post(format!("{}/api/trade", base))
        .json(&json!({
            "tradingPair": "BTC/USDT",
            "tradeType": "buy",
            "investmentAmount": 100
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>().await?,
        json!({"error": "Missing required field: orderType"})
    );
    Ok(())
}

#[tokio::test]
async fn test_trade_accepted() -> Result<()> {
    let (base, _app) = spawn_server().await?;
    let trade = json!({
        "tradingPair": "BTC/USDT",
        "tradeType": "buy",
        "orderType": "market",
        "investmentAmount": 100
    });
    let response = reqwest::Client::new()
        .post(format!("{}/api/trade", base))
        .json(&trade)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], json!("Trade setup completed successfully"));
    assert!(body["txnHash"].as_str().unwrap().starts_with("mock-tx-"));
    assert_eq!(body["tradeDetails"], trade);
    Ok(())
}

#[tokio::test]
async fn test_invalid_pair_rejected() -> Result<()> {
    let (base, _app) = spawn_server().await?;
    let response = reqwest::get(format!("{}/api/predictive-values?pair=DOGE/USDT", base)).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(
        body["error"],
        json!("Invalid trading pair. Supported pairs: BTC/USDT, ETH/USDT, APT/USDT, SOL/USDT, BNB/USDT")
    );
    Ok(())
}

#[tokio::test]
async fn test_mock_prediction_is_five_percent_above_last_close() -> Result<()> {
    let (base, _app) = spawn_server().await?;

    // The mock feed's first fetch for a pair is the seeded walk
    let expected_close = random_walk("ETH/USDT", Timeframe::OneHour, 200)
        .last()
        .map(|c| c.close_f64())
        .unwrap();

    let body: Value = reqwest::Client::new()
        .post(format!("{}/predict", base))
        .json(&json!({"pair": "ETH/USDT"}))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["pair"], json!("ETH/USDT"));
    assert_eq!(body["current_price"].as_f64().unwrap(), expected_close);
    assert_eq!(
        body["predicted_price"].as_f64().unwrap(),
        expected_close * 1.05
    );
    Ok(())
}

#[tokio::test]
async fn test_predictive_values_default_pair() -> Result<()> {
    let (base, _app) = spawn_server().await?;
    let response = reqwest::get(format!("{}/api/predictive-values", base)).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["pair"], json!("BTC/USDT"));

    let entry = body["entryPrice"].as_f64().unwrap();
    let stop = body["stopLossPrice"].as_f64().unwrap();
    let target = body["takeProfitPrice"].as_f64().unwrap();
    let predicted = body["predictedPrice"].as_f64().unwrap();
    assert!(stop < entry);
    assert!(predicted > entry);
    assert!(target > predicted);
    Ok(())
}
