//! Validate phase metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct ValidateMetrics;

impl ValidateMetrics {
    pub fn record_outcome(passed: bool, warnings: usize) {
        if passed {
            ::metrics::counter!(phase_metric!(counter, "validate", "passed")).increment(1);
        } else {
            ::metrics::counter!(phase_metric!(counter, "validate", "rejected")).increment(1);
        }
        if warnings > 0 {
            ::metrics::counter!(phase_metric!(counter, "validate", "warnings"))
                .increment(warnings as u64);
        }
    }

    /// A document whose warnings were promoted to errors
    pub fn record_strict_promotion() {
        ::metrics::counter!(phase_metric!(counter, "validate", "strict_promotions")).increment(1);
    }

    pub fn record_completeness(score: f64) {
        ::metrics::histogram!(phase_metric!(histogram, "validate", "completeness_score"))
            .record(score);
    }
}

impl PhaseMetrics for ValidateMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "validate", "passed"));
        let _ = counter!(phase_metric!(counter, "validate", "rejected"));
        let _ = counter!(phase_metric!(counter, "validate", "warnings"));
        let _ = counter!(phase_metric!(counter, "validate", "strict_promotions"));
        let _ = histogram!(phase_metric!(histogram, "validate", "completeness_score"));
    }

    fn phase_name() -> &'static str {
        "validate"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "validate", "passed"),
                metric_type: MetricType::Counter,
                help: "Documents that passed validation",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "validate", "rejected"),
                metric_type: MetricType::Counter,
                help: "Documents rejected by validation",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "validate", "warnings"),
                metric_type: MetricType::Counter,
                help: "Validation warnings emitted",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "validate", "strict_promotions"),
                metric_type: MetricType::Counter,
                help: "Documents rejected only because strict mode promoted warnings",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "validate", "completeness_score"),
                metric_type: MetricType::Histogram,
                help: "Per-document completeness score",
                labels: vec![],
            },
        ]
    }
}
