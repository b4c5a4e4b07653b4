//! Check duration histogram.

use prometheus::core::Collector;
use prometheus::{DEFAULT_BUCKETS, Histogram, HistogramOpts};
use serde::{Deserialize, Serialize};

/// Build the check duration histogram with the client's default buckets.
pub fn check_duration_histogram() -> prometheus::Result<Histogram> {
    Histogram::with_opts(
        HistogramOpts::new("check_duration_seconds", "Duration of storage checks in seconds")
            .namespace("storage")
            .buckets(DEFAULT_BUCKETS.to_vec()),
    )
}

/// Point-in-time view of a histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    /// `(upper_bound, cumulative_count)` pairs, excluding +Inf.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    /// Total observations; equals the +Inf bucket.
    pub count: u64,
}

impl HistogramSnapshot {
    pub fn of(histogram: &Histogram) -> Self {
        let buckets = histogram
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .flat_map(|metric| metric.get_histogram().get_bucket())
            .map(|bucket| (bucket.get_upper_bound(), bucket.get_cumulative_count()))
            .collect();

        Self {
            buckets,
            sum: histogram.get_sample_sum(),
            count: histogram.get_sample_count(),
        }
    }
}
