//! Load phase metrics: snapshot and document store writes

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct LoadMetrics;

impl LoadMetrics {
    pub fn record_load(inserted: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "load", "documents_inserted"))
            .increment(inserted as u64);
        ::metrics::histogram!(phase_metric!(histogram, "load", "duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_duplicates(count: usize) {
        ::metrics::counter!(phase_metric!(counter, "load", "duplicates_skipped"))
            .increment(count as u64);
    }

    pub fn record_error() {
        ::metrics::counter!(phase_metric!(counter, "load", "errors")).increment(1);
    }
}

impl PhaseMetrics for LoadMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "load", "documents_inserted"));
        let _ = counter!(phase_metric!(counter, "load", "duplicates_skipped"));
        let _ = counter!(phase_metric!(counter, "load", "errors"));
        let _ = histogram!(phase_metric!(histogram, "load", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "load"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "load", "documents_inserted"),
                metric_type: MetricType::Counter,
                help: "Documents written to the document store",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "load", "duplicates_skipped"),
                metric_type: MetricType::Counter,
                help: "Documents skipped because their natural key already exists",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "load", "errors"),
                metric_type: MetricType::Counter,
                help: "Failed document store writes",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "load", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent in the bulk insert",
                labels: vec![],
            },
        ]
    }
}
