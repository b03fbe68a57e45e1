use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::LOG_DIR;

/// Initializes the logging system with both console and file output.
///
/// `level` seeds the filter for this crate; `RUST_LOG` directives still apply.
pub fn init_logging(level: &str) {
    let _ = fs::create_dir_all(LOG_DIR);

    // Daily rotated JSON file, one line per event
    let file_appender = tracing_appender::rolling::daily(LOG_DIR, "forecast_etl.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stdout);

    let mut filter = EnvFilter::from_default_env();
    match format!("forecast_etl={}", level.to_ascii_lowercase()).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(_) => filter = filter.add_directive(tracing::Level::INFO.into()),
    }

    // try_init so tests and repeated calls don't panic
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    // Keep the guard alive so logs are flushed on exit
    std::mem::forget(guard);
}
