pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod timestamps;
pub mod utils;

// Typed document schema shared across layers
pub mod domain;

// Harmonize, validate and report
pub mod pipeline;

// Local extractors and persistence adapters
pub mod sources;
pub mod storage;

// Use cases and ports
pub mod app;
