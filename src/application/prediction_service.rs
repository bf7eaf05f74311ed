use crate::application::market_data::indicator_pipeline::IndicatorPipeline;
use crate::application::ml::predictor::{PredictionInput, PricePredictor};
use crate::application::ml::scaler_provider::ScalerProvider;
use crate::application::risk_management::trade_levels::{
    TradeLevelConfig, advisory_levels, average_true_range,
};
use crate::domain::errors::{PipelineError, PredictionError, PreprocessError};
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ml::scaler::{FittedScaler, build_feature_matrix};
use crate::domain::ports::MarketDataService;
use crate::domain::trading::types::TradeIntent;
use crate::infrastructure::observability::Metrics;
use ndarray::s;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Window and model settings shared by every pipeline run
#[derive(Debug, Clone)]
pub struct PredictionSettings {
    pub timeframe: Timeframe,
    pub candle_limit: usize,
    pub sequence_length: usize,
    pub levels: TradeLevelConfig,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::OneHour,
            candle_limit: 200,
            sequence_length: 10,
            levels: TradeLevelConfig::default(),
        }
    }
}

/// Outcome of one fetch → indicators → scale → predict run
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub pair: String,
    /// Close of the newest candle
    pub current_price: f64,
    pub predicted_price: f64,
    pub average_atr: f64,
    pub predictor: String,
}

/// Runs the prediction pipeline for one pair at a time.
///
/// Shared by the HTTP handlers and the polling loop.
pub struct PredictionService {
    market: Arc<dyn MarketDataService>,
    pipeline: IndicatorPipeline,
    scalers: Arc<ScalerProvider>,
    predictor: Arc<dyn PricePredictor>,
    metrics: Metrics,
    settings: PredictionSettings,
}

impl PredictionService {
    pub fn new(
        market: Arc<dyn MarketDataService>,
        pipeline: IndicatorPipeline,
        scalers: Arc<ScalerProvider>,
        predictor: Arc<dyn PricePredictor>,
        metrics: Metrics,
        settings: PredictionSettings,
    ) -> Self {
        Self {
            market,
            pipeline,
            scalers,
            predictor,
            metrics,
            settings,
        }
    }

    pub fn predictor_name(&self) -> &str {
        self.predictor.name()
    }

    pub fn market_source(&self) -> &str {
        self.market.name()
    }

    pub fn settings(&self) -> &PredictionSettings {
        &self.settings
    }

    pub async fn evaluate(&self, pair: &str) -> Result<Evaluation, PipelineError> {
        let started = Instant::now();
        let result = self.run_pipeline(pair).await;
        let latency = started.elapsed().as_secs_f64();

        match &result {
            Ok(evaluation) => {
                self.metrics
                    .record_pipeline(self.market.name(), "ok", latency);
                debug!(
                    "PredictionService: {} current={:.4} predicted={:.4} atr={:.4} ({:.3}s)",
                    pair,
                    evaluation.current_price,
                    evaluation.predicted_price,
                    evaluation.average_atr,
                    latency
                );
            }
            Err(e) => {
                self.metrics
                    .record_pipeline(self.market.name(), e.stage(), latency);
                warn!("PredictionService: pipeline failed for {}: {}", pair, e);
            }
        }

        result
    }

    /// Advisory entry / stop-loss / take-profit derived from a fresh forecast
    pub async fn predictive_values(&self, pair: &str) -> Result<TradeIntent, PipelineError> {
        let evaluation = self.evaluate(pair).await?;
        Ok(advisory_levels(
            &self.settings.levels,
            pair,
            evaluation.predicted_price,
            evaluation.current_price,
            evaluation.average_atr,
        ))
    }

    /// Refits the scaler for `pair` on the current window and replaces the stored one
    pub async fn fit_scaler(&self, pair: &str) -> Result<Arc<FittedScaler>, PipelineError> {
        let candles = self
            .market
            .fetch_candles(pair, self.settings.timeframe, self.settings.candle_limit)
            .await?;
        let rows = self.pipeline.compute(&candles)?;
        let matrix = build_feature_matrix(&rows, self.settings.sequence_length)?;
        let scaler = self.scalers.refit(pair, &matrix)?;
        info!(
            "PredictionService: refitted scaler for {} on {} rows",
            pair,
            matrix.nrows()
        );
        Ok(scaler)
    }

    async fn run_pipeline(&self, pair: &str) -> Result<Evaluation, PipelineError> {
        let settings = &self.settings;
        let candles = self
            .market
            .fetch_candles(pair, settings.timeframe, settings.candle_limit)
            .await?;

        let rows = self.pipeline.compute(&candles)?;
        let matrix = build_feature_matrix(&rows, settings.sequence_length)?;
        let scaler = self.scalers.resolve(pair, &matrix)?;
        let scaled = scaler.transform(&matrix)?;

        let start = scaled.nrows() - settings.sequence_length;
        let window = scaled.slice(s![start.., ..]).to_owned();

        // Complete rows are a suffix of the window, so the last row is the newest candle
        let current_price = rows
            .last()
            .map(|r| r.close)
            .ok_or(PreprocessError::InsufficientHistory {
                required: settings.sequence_length,
                available: 0,
            })?;
        let average_atr = average_true_range(&rows, settings.levels.atr_lookback).ok_or(
            PreprocessError::InsufficientHistory {
                required: settings.levels.atr_lookback,
                available: 0,
            },
        )?;

        let input = PredictionInput {
            window,
            last_close: current_price,
            scaler,
        };
        let predictor = self.predictor.clone();
        let predicted_price = tokio::task::spawn_blocking(move || predictor.predict(&input))
            .await
            .map_err(|e| PredictionError::Backend(format!("inference task failed: {}", e)))??;

        if !predicted_price.is_finite() {
            return Err(PredictionError::NonFinite(predicted_price).into());
        }

        Ok(Evaluation {
            pair: pair.to_string(),
            current_price,
            predicted_price,
            average_atr,
            predictor: self.predictor.name().to_string(),
        })
    }
}
