// Data processing pipeline: harmonization, validation and quality reporting

pub mod processing;
pub mod run_stats;

pub use run_stats::{RunStats, RunStatus};
