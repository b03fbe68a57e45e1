//! Local file extractors for the two station networks

pub mod catalog;
pub mod decode;
pub mod infoclimat;
pub mod wunderground;

pub use catalog::{StationCatalog, StationMeta};
pub use infoclimat::InfoClimatExtractor;
pub use wunderground::WundergroundExtractor;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::app::ports::RawSourcePort;
use crate::constants::{INFOCLIMAT_SOURCE, WUNDERGROUND_SOURCE};
use crate::domain::RawRecord;
use crate::error::Result;

/// An InfoClimat extract on disk
pub struct InfoClimatFile {
    extractor: InfoClimatExtractor,
    path: PathBuf,
}

impl InfoClimatFile {
    pub fn new(catalog: &StationCatalog, path: impl Into<PathBuf>) -> Self {
        Self {
            extractor: InfoClimatExtractor::new(catalog.infoclimat.clone()),
            path: path.into(),
        }
    }
}

#[async_trait]
impl RawSourcePort for InfoClimatFile {
    fn source_name(&self) -> String {
        INFOCLIMAT_SOURCE.to_string()
    }

    async fn extract(&self) -> Result<Vec<RawRecord>> {
        self.extractor.extract_from_local(&self.path).await
    }
}

/// A Weather Underground extract on disk for a single station
pub struct WundergroundFile {
    extractor: WundergroundExtractor,
    station_id: String,
    path: PathBuf,
}

impl WundergroundFile {
    pub fn new(catalog: &StationCatalog, station_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            extractor: WundergroundExtractor::new(catalog.wunderground.clone()),
            station_id: station_id.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl RawSourcePort for WundergroundFile {
    fn source_name(&self) -> String {
        format!("{}/{}", WUNDERGROUND_SOURCE, self.station_id)
    }

    async fn extract(&self) -> Result<Vec<RawRecord>> {
        self.extractor
            .extract_from_local(&self.path, &self.station_id)
            .await
    }
}
