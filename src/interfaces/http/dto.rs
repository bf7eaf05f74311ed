use crate::application::agents::trading_loop::LoopStatus;
use crate::domain::trading::types::TradeIntent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PairQuery {
    pub pair: Option<String>,
}

/// Advisory levels, rounded to cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveValuesResponse {
    pub pair: String,
    pub entry_price: f64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    pub predicted_price: f64,
}

impl From<&TradeIntent> for PredictiveValuesResponse {
    fn from(intent: &TradeIntent) -> Self {
        Self {
            pair: intent.pair.clone(),
            entry_price: round2(intent.entry),
            stop_loss_price: round2(intent.stop_loss),
            take_profit_price: round2(intent.take_profit),
            predicted_price: round2(intent.predicted),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub pair: String,
    pub current_price: f64,
    pub predicted_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    pub message: String,
    pub txn_hash: String,
    pub trade_details: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub ai_enabled: bool,
    pub pair: String,
    pub predictor: String,
    pub market_source: String,
    pub trading_loop: LoopStatus,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::types::Direction;

    #[test]
    fn test_levels_are_rounded_and_camel_cased() {
        let intent = TradeIntent {
            pair: "BTC/USDT".to_string(),
            direction: Direction::Long,
            entry: 96123.456,
            stop_loss: 95800.004,
            take_profit: 102950.999,
            predicted: 100932.6288,
        };
        let response = PredictiveValuesResponse::from(&intent);
        assert_eq!(response.entry_price, 96123.46);
        assert_eq!(response.stop_loss_price, 95800.0);
        assert_eq!(response.take_profit_price, 102951.0);
        assert_eq!(response.predicted_price, 100932.63);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("stopLossPrice").is_some());
        assert!(json.get("takeProfitPrice").is_some());
    }
}
