use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{RawRecord, UnifiedDocument};
use crate::error::Result;

/// A source of raw observations for one run
#[async_trait]
pub trait RawSourcePort: Send + Sync {
    /// Name used in logs and in the run's error list
    fn source_name(&self) -> String;

    async fn extract(&self) -> Result<Vec<RawRecord>>;
}

/// Outcome of a bulk insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub duplicates: usize,
}

#[async_trait]
pub trait DocumentStorePort: Send + Sync {
    /// Insert documents, skipping those whose natural key is already stored
    async fn bulk_insert(&self, documents: &[UnifiedDocument]) -> Result<InsertSummary>;
}

#[async_trait]
pub trait BlobStorePort: Send + Sync {
    /// Store a JSON value under `key` and return its location
    async fn put_json(&self, key: &str, value: &Value) -> Result<String>;
}
