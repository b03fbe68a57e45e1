//! Registers every phase's metrics and checks their names for conflicts

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub fn register_all_metrics() {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::HarmonizeMetrics>(&mut all_metrics);
    register_phase_metrics::<super::ValidateMetrics>(&mut all_metrics);
    register_phase_metrics::<super::LoadMetrics>(&mut all_metrics);
    register_phase_metrics::<super::RunMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
    log_metrics_summary(&all_metrics);
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<String, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        let owner = extract_phase_from_metric_name(doc.name);
        if owner != phase_name {
            warn!("Metric '{}' registered by phase '{}'", doc.name, phase_name);
        }
        if all_metrics.contains_key(doc.name) {
            warn!(
                "Metric name conflict detected: '{}' redefined by phase '{}'",
                doc.name, phase_name
            );
        } else {
            all_metrics.insert(doc.name.to_string(), doc);
        }
    }
}

fn log_metrics_summary(all_metrics: &HashMap<String, MetricDoc>) {
    let mut names: Vec<_> = all_metrics.values().collect();
    names.sort_by_key(|doc| doc.name);
    for doc in names {
        debug!(
            "metric {} ({:?}) labels={:?}: {}",
            doc.name, doc.metric_type, doc.labels, doc.help
        );
    }
}

/// Extract phase name from metric name (e.g., "forecast_load_errors_total" -> "load")
fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    if let Some(stripped) = metric_name.strip_prefix("forecast_") {
        if let Some(next_underscore) = stripped.find('_') {
            return &stripped[..next_underscore];
        }
    }
    "unknown"
}
