use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::agents::ai_switch::AiSwitch;
use crate::application::agents::trading_loop::{LoopStatus, SharedLoopStatus, TradingLoop};
use crate::application::market_data::indicator_pipeline::IndicatorPipeline;
use crate::application::ml::load_predictor;
use crate::application::ml::scaler_provider::{ScalerMode, ScalerProvider};
use crate::application::prediction_service::PredictionService;
use crate::config::{Config, Mode};
use crate::domain::ports::MarketDataService;
use crate::domain::repositories::ScalerRepository;
use crate::infrastructure::binance::BinanceMarketDataService;
use crate::infrastructure::csv_source::CsvMarketDataService;
use crate::infrastructure::mock::MockMarketDataService;
use crate::infrastructure::observability::{Metrics, MetricsReporter};
use crate::infrastructure::persistence::scaler_store::JsonScalerRepository;
use crate::interfaces::http::AppState;

/// Background tasks started by [`Application::start`]
pub struct SystemHandle {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SystemHandle {
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Signals every task to stop and waits for them
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Background task ended abnormally: {}", e);
            }
        }
        info!("Shutdown sequence completed.");
    }
}

pub struct Application {
    pub config: Config,
    pub market_service: Arc<dyn MarketDataService>,
    pub prediction_service: Arc<PredictionService>,
    pub switch: AiSwitch,
    pub loop_status: SharedLoopStatus,
    pub metrics: Metrics,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        info!(
            "Building trade-oracle (Mode: {:?}, Timeframe: {})...",
            config.exchange.mode, config.exchange.timeframe
        );

        let metrics = Metrics::new()?;
        let market_service = Self::market_service(&config);

        let repository: Option<Arc<dyn ScalerRepository>> = match config.model.scaler_mode {
            ScalerMode::Persisted => {
                info!("Scalers persisted under {:?}", config.model.scaler_dir);
                Some(Arc::new(JsonScalerRepository::new(
                    config.model.scaler_dir.clone(),
                )))
            }
            ScalerMode::PerCycle => {
                info!("Scalers refitted on every run");
                None
            }
        };
        let scalers = Arc::new(ScalerProvider::new(config.model.scaler_mode, repository));

        let predictor = load_predictor(&config.model.model_path, config.strategy.sequence_length);
        info!(
            "Predictor: {} (version {})",
            predictor.name(),
            predictor.version()
        );

        let prediction_service = Arc::new(PredictionService::new(
            market_service.clone(),
            IndicatorPipeline::new(config.strategy.indicators.clone()),
            scalers,
            predictor,
            metrics.clone(),
            config.prediction_settings(),
        ));

        let switch = AiSwitch::new(config.trading_loop.start_enabled);
        metrics
            .ai_enabled
            .set(if switch.is_enabled() { 1.0 } else { 0.0 });

        Ok(Self {
            config,
            market_service,
            prediction_service,
            switch,
            loop_status: Arc::new(RwLock::new(LoopStatus::default())),
            metrics,
        })
    }

    fn market_service(config: &Config) -> Arc<dyn MarketDataService> {
        let exchange = &config.exchange;
        match exchange.mode {
            Mode::Binance => {
                info!("Using Binance market data ({})", exchange.binance_base_url);
                Arc::new(
                    BinanceMarketDataService::builder()
                        .api_key(exchange.binance_api_key.clone())
                        .base_url(exchange.binance_base_url.clone())
                        .timeout(std::time::Duration::from_secs(exchange.http_timeout_secs))
                        .max_retries(exchange.http_max_retries)
                        .build(),
                )
            }
            Mode::Mock => {
                info!("Using mock market data");
                Arc::new(MockMarketDataService::new())
            }
            Mode::Csv => {
                info!("Using CSV market data from {:?}", exchange.csv_data_dir);
                Arc::new(CsvMarketDataService::new(exchange.csv_data_dir.clone()))
            }
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(
            self.prediction_service.clone(),
            self.switch.clone(),
            self.loop_status.clone(),
            self.config.server.supported_pairs.clone(),
            self.config.trading_loop.pair.clone(),
        )
    }

    /// Spawns the polling loop and, when enabled, the metrics reporter
    pub fn start(&self) -> SystemHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::new();

        let trading_loop = TradingLoop::new(
            self.prediction_service.clone(),
            self.switch.clone(),
            self.config.trading_loop.settings(),
            self.loop_status.clone(),
            self.metrics.clone(),
        );
        tasks.push(tokio::spawn(trading_loop.run(shutdown_rx.clone())));
        info!(
            "Trading loop started for {} (AI {})",
            self.config.trading_loop.pair,
            if self.switch.is_enabled() { "ON" } else { "OFF" }
        );

        if self.config.observability.enabled {
            let reporter = MetricsReporter::new(
                self.loop_status.clone(),
                self.switch.clone(),
                self.metrics.clone(),
                self.config.trading_loop.pair.clone(),
                self.prediction_service.predictor_name().to_string(),
                self.config.observability.interval_secs,
            );
            tasks.push(tokio::spawn(reporter.run(shutdown_rx)));
            info!(
                "Metrics reporter started (interval: {}s)",
                self.config.observability.interval_secs
            );
        } else {
            info!("Metrics reporting disabled.");
        }

        SystemHandle { shutdown_tx, tasks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn mock_config() -> Config {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("MODE", "mock"),
            ("SCALER_MODE", "per_cycle"),
            ("MODEL_PATH", "does/not/exist.onnx"),
            ("OBSERVABILITY_ENABLED", "false"),
        ]);
        Config::from_lookup(&|key| vars.get(key).map(|v| v.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_build_falls_back_to_mock_predictor() {
        let app = Application::build(mock_config()).await.unwrap();
        assert_eq!(app.prediction_service.predictor_name(), "Mock (+5%)");
        assert_eq!(app.market_service.name(), "mock");
        assert!(!app.switch.is_enabled());
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let app = Application::build(mock_config()).await.unwrap();
        let handle = app.start();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle.shutdown())
            .await
            .unwrap();
    }
}
