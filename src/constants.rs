/// Network and storage name constants shared across the pipeline

pub const PIPELINE_VERSION: &str = "1.0.0";

// Source names reported by the extract adapters
pub const INFOCLIMAT_SOURCE: &str = "infoclimat";
pub const WUNDERGROUND_SOURCE: &str = "wunderground";

// Storage defaults, overridable via env
pub const DEFAULT_DATABASE: &str = "forecast_2_0";
pub const DEFAULT_COLLECTION: &str = "weather_measurements";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_CONFIG_FILE: &str = "forecast.toml";

// Artifact names written under the output directory
pub const PROCESSED_PREFIX: &str = "processed";
pub const REPORTS_PREFIX: &str = "reports";
pub const STATUS_FILE: &str = "pipeline_status.json";
pub const LOG_DIR: &str = "logs";
pub const METRICS_FILE: &str = "metrics.prom";
