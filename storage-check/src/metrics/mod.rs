//! Metrics and monitoring module.
//!
//! Provides the probe's Prometheus-compatible metrics and the cycle health
//! tracker behind the health endpoint.
//!
//! # Features
//!
//! - Check metrics (success, failure, duration histogram)
//! - Cleanup metrics (leftover deletions succeeded / failed)
//! - Last-cycle health tracking (/health)
//! - Prometheus text exposition (/metrics)
//!
//! # Example
//!
//! ```ignore
//! use storage_check::metrics::{MetricsCollector, PrometheusExporter};
//!
//! let collector = Arc::new(MetricsCollector::new()?);
//! collector.record_check_failure();
//!
//! let text = PrometheusExporter::new(collector).export();
//! ```

mod collector;
mod health;
mod histogram;
mod prometheus;

pub use collector::{MetricsCollector, MetricsSnapshot};
pub use health::{CycleHealth, HealthStatus, LastCycle};
pub use histogram::HistogramSnapshot;
pub use prometheus::{CONTENT_TYPE, PrometheusExporter};
