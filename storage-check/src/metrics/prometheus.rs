//! Prometheus metrics exporter.
//!
//! Exports metrics in Prometheus text format.

use std::sync::Arc;

use super::collector::MetricsCollector;
use super::histogram::HistogramSnapshot;

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Prometheus metrics exporter.
pub struct PrometheusExporter {
    collector: Arc<MetricsCollector>,
    namespace: String,
}

impl PrometheusExporter {
    /// Create a new Prometheus exporter.
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self {
            collector,
            namespace: "storage".to_string(),
        }
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> String {
        let snapshot = self.collector.snapshot();
        let mut output = String::new();

        // Check metrics
        self.write_counter(
            &mut output,
            "check_success_total",
            "Total number of successful storage checks",
            snapshot.check_success_total as f64,
        );

        self.write_counter(
            &mut output,
            "check_failure_total",
            "Total number of failed storage checks",
            snapshot.check_failure_total as f64,
        );

        self.write_histogram(
            &mut output,
            "check_duration_seconds",
            "Duration of storage checks in seconds",
            &snapshot.check_duration_seconds,
        );

        // Cleanup metrics
        self.write_counter(
            &mut output,
            "check_cleanup_success_total",
            "Total number of successful cleanups of previous checks",
            snapshot.cleanup_success_total as f64,
        );

        self.write_counter(
            &mut output,
            "check_cleanup_failure_total",
            "Total number of failed cleanups of previous checks",
            snapshot.cleanup_failure_total as f64,
        );

        output
    }

    fn write_counter(&self, output: &mut String, name: &str, help: &str, value: f64) {
        let full_name = format!("{}_{}", self.namespace, name);
        output.push_str(&format!("# HELP {} {}\n", full_name, help));
        output.push_str(&format!("# TYPE {} counter\n", full_name));
        output.push_str(&format!("{} {}\n", full_name, value));
    }

    fn write_histogram(
        &self,
        output: &mut String,
        name: &str,
        help: &str,
        histogram: &HistogramSnapshot,
    ) {
        let full_name = format!("{}_{}", self.namespace, name);
        output.push_str(&format!("# HELP {} {}\n", full_name, help));
        output.push_str(&format!("# TYPE {} histogram\n", full_name));

        for (bound, count) in &histogram.buckets {
            output.push_str(&format!(
                "{}_bucket{{le=\"{}\"}} {}\n",
                full_name, bound, count
            ));
        }
        output.push_str(&format!(
            "{}_bucket{{le=\"+Inf\"}} {}\n",
            full_name, histogram.count
        ));
        output.push_str(&format!("{}_sum {}\n", full_name, histogram.sum));
        output.push_str(&format!("{}_count {}\n", full_name, histogram.count));
    }
}
