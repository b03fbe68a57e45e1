//! Domain data shapes shared across the pipeline stages.

pub mod document;
pub mod field;
pub mod raw;

pub use document::{
    DataQuality, DocumentMetadata, GeoPoint, Location, Measurement, Station, UnifiedDocument,
};
pub use field::{Field, Network};
pub use raw::{RawObservation, RawRecord};
