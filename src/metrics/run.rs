//! Whole-run metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct RunMetrics;

impl RunMetrics {
    pub fn record_run(success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "failed" };
        ::metrics::counter!(phase_metric!(counter, "run", "completed"), "status" => status)
            .increment(1);
        ::metrics::gauge!(phase_metric!(gauge, "run", "duration_seconds")).set(duration_secs);
        ::metrics::gauge!(phase_metric!(gauge, "run", "last_timestamp_seconds"))
            .set(chrono::Utc::now().timestamp() as f64);
    }

    pub fn record_rejection_rate(rate: f64) {
        ::metrics::gauge!(phase_metric!(gauge, "run", "rejection_rate")).set(rate);
    }
}

impl PhaseMetrics for RunMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge};

        let _ = counter!(phase_metric!(counter, "run", "completed"));
        let _ = gauge!(phase_metric!(gauge, "run", "duration_seconds"));
        let _ = gauge!(phase_metric!(gauge, "run", "last_timestamp_seconds"));
        let _ = gauge!(phase_metric!(gauge, "run", "rejection_rate"));
    }

    fn phase_name() -> &'static str {
        "run"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "run", "completed"),
                metric_type: MetricType::Counter,
                help: "Pipeline runs by final status",
                labels: vec!["status"],
            },
            MetricDoc {
                name: phase_metric!(gauge, "run", "duration_seconds"),
                metric_type: MetricType::Gauge,
                help: "Wall time of the last run",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "run", "last_timestamp_seconds"),
                metric_type: MetricType::Gauge,
                help: "Unix time the last run finished",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "run", "rejection_rate"),
                metric_type: MetricType::Gauge,
                help: "Share of extracted records rejected in the last run",
                labels: vec![],
            },
        ]
    }
}
