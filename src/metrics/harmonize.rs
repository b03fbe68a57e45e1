//! Harmonize phase metrics: raw records mapped to unified documents

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct HarmonizeMetrics;

impl HarmonizeMetrics {
    pub fn record_batch(network: &'static str, records: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "harmonize", "records"), "network" => network)
            .increment(records as u64);
        ::metrics::histogram!(phase_metric!(histogram, "harmonize", "duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_extracted(network: &'static str, records: usize) {
        ::metrics::counter!(phase_metric!(counter, "harmonize", "records_extracted"), "network" => network)
            .increment(records as u64);
    }
}

impl PhaseMetrics for HarmonizeMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "harmonize", "records"));
        let _ = counter!(phase_metric!(counter, "harmonize", "records_extracted"));
        let _ = histogram!(phase_metric!(histogram, "harmonize", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "harmonize"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "harmonize", "records"),
                metric_type: MetricType::Counter,
                help: "Records converted to the unified document shape",
                labels: vec!["network"],
            },
            MetricDoc {
                name: phase_metric!(counter, "harmonize", "records_extracted"),
                metric_type: MetricType::Counter,
                help: "Raw records read from local extracts",
                labels: vec!["network"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "harmonize", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent harmonizing one batch",
                labels: vec![],
            },
        ]
    }
}
