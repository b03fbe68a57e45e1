//! Application layer: the use cases and the ports they depend on

pub mod pipeline_use_case;
pub mod ports;
pub mod report_use_case;

pub use pipeline_use_case::{PipelineOptions, PipelineOutcome, StatusFile, WeatherPipeline};
