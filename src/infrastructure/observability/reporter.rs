//! Push-based metrics reporter for trade-oracle
//!
//! Periodically outputs metrics as structured JSON to stdout.
//!
//! **Security**: This system only SENDS data, never accepts requests.

use crate::application::agents::ai_switch::AiSwitch;
use crate::application::agents::trading_loop::{LoopPhase, SharedLoopStatus};
use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{info, warn};

/// Metrics snapshot for JSON output
#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub predictor: String,
    pub ai_enabled: bool,
    pub trading_loop: LoopSnapshot,
}

#[derive(Serialize)]
pub struct LoopSnapshot {
    pub pair: String,
    pub phase: LoopPhase,
    pub cycles: u64,
    pub trades_opened: u64,
    pub trades_closed: u64,
    pub open_trade: Option<OpenTradeSnapshot>,
    pub last_error: Option<String>,
}

#[derive(Serialize)]
pub struct OpenTradeSnapshot {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Push-based metrics reporter
///
/// Outputs metrics as structured JSON logs on a configurable interval.
/// No HTTP server, no incoming connections - only outbound data.
pub struct MetricsReporter {
    status: SharedLoopStatus,
    switch: AiSwitch,
    metrics: Metrics,
    pair: String,
    predictor: String,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(
        status: SharedLoopStatus,
        switch: AiSwitch,
        metrics: Metrics,
        pair: String,
        predictor: String,
        interval_seconds: u64,
    ) -> Self {
        Self {
            status,
            switch,
            metrics,
            pair,
            predictor,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds),
        }
    }

    /// Run the reporter until shutdown, outputting metrics periodically
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("MetricsReporter: stopped");
                        return;
                    }
                    continue;
                }
            }

            let snapshot = self.collect_snapshot().await;
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    // Prefix so log shippers can filter these lines
                    println!("METRICS_JSON:{}", json);
                    info!(
                        "AI: {} | Phase: {:?} | Cycles: {} | Trades closed: {} | Uptime: {}s",
                        if snapshot.ai_enabled { "ON" } else { "OFF" },
                        snapshot.trading_loop.phase,
                        snapshot.trading_loop.cycles,
                        snapshot.trading_loop.trades_closed,
                        snapshot.uptime_seconds
                    );
                }
                Err(e) => warn!("Failed to serialize metrics: {}", e),
            }
        }
    }

    async fn collect_snapshot(&self) -> MetricsSnapshot {
        let status = self.status.read().await.clone();
        let uptime = self.start_time.elapsed().as_secs();
        let ai_enabled = self.switch.is_enabled();

        self.metrics.uptime_seconds.set(uptime as f64);
        self.metrics
            .ai_enabled
            .set(if ai_enabled { 1.0 } else { 0.0 });

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            predictor: self.predictor.clone(),
            ai_enabled,
            trading_loop: LoopSnapshot {
                pair: self.pair.clone(),
                phase: status.phase,
                cycles: status.cycles,
                trades_opened: status.trades_opened,
                trades_closed: status.trades_closed,
                open_trade: status.open_trade.map(|t| OpenTradeSnapshot {
                    entry: t.entry,
                    stop_loss: t.stop_loss,
                    take_profit: t.take_profit,
                }),
                last_error: status.last_error,
            },
        }
    }
}
