//! Prometheus metrics definitions for trade-oracle
//!
//! All metrics use the `trade_oracle_` prefix and are read-only.

use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the prediction service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Pipeline runs by market data source and outcome
    pub pipeline_runs_total: CounterVec,
    /// End-to-end pipeline latency in seconds
    pub pipeline_latency_seconds: HistogramVec,
    /// Loop decisions (entry, stop_loss, take_profit, hold)
    pub trade_signals_total: CounterVec,
    /// AI switch state (0=off, 1=on)
    pub ai_enabled: GenericGauge<AtomicF64>,
    /// Simulated open trades (0 or 1)
    pub open_trades: GenericGauge<AtomicF64>,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let pipeline_runs_total = CounterVec::new(
            Opts::new(
                "trade_oracle_pipeline_runs_total",
                "Prediction pipeline runs by source and outcome",
            ),
            &["source", "outcome"],
        )?;
        registry.register(Box::new(pipeline_runs_total.clone()))?;

        let pipeline_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "trade_oracle_pipeline_latency_seconds",
                "Fetch to forecast latency in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["source"],
        )?;
        registry.register(Box::new(pipeline_latency_seconds.clone()))?;

        let trade_signals_total = CounterVec::new(
            Opts::new(
                "trade_oracle_trade_signals_total",
                "Polling loop decisions by kind",
            ),
            &["pair", "signal_type"],
        )?;
        registry.register(Box::new(trade_signals_total.clone()))?;

        let ai_enabled = Gauge::with_opts(Opts::new(
            "trade_oracle_ai_enabled",
            "AI trading switch (0=off, 1=on)",
        ))?;
        registry.register(Box::new(ai_enabled.clone()))?;

        let open_trades = Gauge::with_opts(Opts::new(
            "trade_oracle_open_trades",
            "Simulated trades currently open",
        ))?;
        registry.register(Box::new(open_trades.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "trade_oracle_uptime_seconds",
            "Server uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            pipeline_runs_total,
            pipeline_latency_seconds,
            trade_signals_total,
            ai_enabled,
            open_trades,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn record_pipeline(&self, source: &str, outcome: &str, latency: f64) {
        self.pipeline_runs_total
            .with_label_values(&[source, outcome])
            .inc();
        self.pipeline_latency_seconds
            .with_label_values(&[source])
            .observe(latency);
    }

    pub fn inc_signals(&self, pair: &str, signal_type: &str) {
        self.trade_signals_total
            .with_label_values(&[pair, signal_type])
            .inc();
    }

    pub fn pipeline_runs(&self, source: &str, outcome: &str) -> f64 {
        self.pipeline_runs_total
            .with_label_values(&[source, outcome])
            .get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.ai_enabled.set(1.0);
        assert!(metrics.render().contains("trade_oracle_ai_enabled 1"));
    }

    #[test]
    fn test_pipeline_outcomes_are_labelled() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.record_pipeline("mock", "ok", 0.02);
        metrics.record_pipeline("mock", "ok", 0.03);
        metrics.record_pipeline("binance", "fetch_error", 1.2);

        assert_eq!(metrics.pipeline_runs("mock", "ok"), 2.0);
        assert_eq!(metrics.pipeline_runs("binance", "fetch_error"), 1.0);
        let output = metrics.render();
        assert!(output.contains("trade_oracle_pipeline_latency_seconds"));
    }

    #[test]
    fn test_signal_counter() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_signals("BTC/USDT", "entry");
        assert!(metrics.render().contains("signal_type=\"entry\""));
    }
}
