//! Metrics collector implementation.
//!
//! Holds the probe's monotonic counters and the check duration histogram.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use prometheus::Histogram;
use serde::{Deserialize, Serialize};

use super::histogram::{HistogramSnapshot, check_duration_histogram};
use crate::error::Result;

/// Metrics collector for the storage probe.
///
/// Created once at startup and shared by `Arc` with everything that records
/// or reads metrics. Counters are never reset.
pub struct MetricsCollector {
    // Check metrics
    check_success: AtomicU64,
    check_failure: AtomicU64,
    check_duration: Histogram,

    // Cleanup metrics
    cleanup_success: AtomicU64,
    cleanup_failure: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector with zeroed counters.
    pub fn new() -> Result<Self> {
        Ok(Self {
            check_success: AtomicU64::new(0),
            check_failure: AtomicU64::new(0),
            check_duration: check_duration_histogram()?,
            cleanup_success: AtomicU64::new(0),
            cleanup_failure: AtomicU64::new(0),
        })
    }

    // ========== Check Metrics ==========

    /// Record a successful check and its duration.
    pub fn record_check_success(&self, duration: Duration) {
        self.check_success.fetch_add(1, Ordering::Relaxed);
        self.check_duration.observe(duration.as_secs_f64());
    }

    /// Record a failed check.
    pub fn record_check_failure(&self) {
        self.check_failure.fetch_add(1, Ordering::Relaxed);
    }

    pub fn check_success(&self) -> u64 {
        self.check_success.load(Ordering::Relaxed)
    }

    pub fn check_failure(&self) -> u64 {
        self.check_failure.load(Ordering::Relaxed)
    }

    /// Number of samples in the duration histogram.
    pub fn check_duration_samples(&self) -> u64 {
        self.check_duration.get_sample_count()
    }

    // ========== Cleanup Metrics ==========

    /// Record a leftover resource deleted by reconciliation.
    pub fn record_cleanup_success(&self) {
        self.cleanup_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a leftover resource whose deletion failed.
    pub fn record_cleanup_failure(&self) {
        self.cleanup_failure.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cleanup_success(&self) -> u64 {
        self.cleanup_success.load(Ordering::Relaxed)
    }

    pub fn cleanup_failure(&self) -> u64 {
        self.cleanup_failure.load(Ordering::Relaxed)
    }

    // ========== Snapshot ==========

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            check_success_total: self.check_success(),
            check_failure_total: self.check_failure(),
            check_duration_seconds: HistogramSnapshot::of(&self.check_duration),
            cleanup_success_total: self.cleanup_success(),
            cleanup_failure_total: self.cleanup_failure(),
        }
    }
}

/// A snapshot of all metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub check_success_total: u64,
    pub check_failure_total: u64,
    pub check_duration_seconds: HistogramSnapshot,
    pub cleanup_success_total: u64,
    pub cleanup_failure_total: u64,
}
