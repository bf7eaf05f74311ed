//! Push-based observability for trade-oracle
//!
//! This module provides observability through **outbound data only** - no metrics
//! endpoint, no incoming requests. Metrics are pushed as periodic JSON lines on
//! stdout (for Loki, Fluentd, CloudWatch).

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
