//! Metrics infrastructure for the weather pipeline
//!
//! Each pipeline phase owns its metric names in a dedicated submodule so the
//! registry can detect naming conflicts at startup.

pub mod harmonize;
pub mod load;
pub mod registry;
pub mod run;
pub mod validate;

pub use harmonize::HarmonizeMetrics;
pub use load::LoadMetrics;
pub use run::RunMetrics;
pub use validate::ValidateMetrics;

use std::path::Path;
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Initialize the global metrics recorder
///
/// Idempotent. Batch runs are short-lived, so no HTTP listener is started;
/// the handle is kept for rendering a snapshot at the end of the run.
pub fn init_metrics() {
    INIT.call_once(|| {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        match builder.install_recorder() {
            Ok(handle) => {
                if HANDLE.set(handle).is_err() {
                    warn!("Prometheus handle already stored");
                }
                registry::register_all_metrics();
                info!("Prometheus recorder installed");
            }
            Err(e) => {
                warn!("Failed to install Prometheus recorder: {}", e);
            }
        }
    });
}

/// Render the current snapshot in Prometheus text format, if a recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Write the current snapshot to `path`. Returns false when no recorder is installed.
pub fn write_snapshot(path: &Path) -> std::io::Result<bool> {
    let Some(body) = render() else {
        return Ok(false);
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;
    Ok(true)
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Get the phase name for prefixing metrics
    fn phase_name() -> &'static str;

    /// Get documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Build a metric name following `forecast_{phase}_{metric_name}[_total]`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("forecast_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("forecast_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("forecast_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
