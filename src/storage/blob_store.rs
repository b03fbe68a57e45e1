use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::ports::BlobStorePort;
use crate::constants::{PROCESSED_PREFIX, REPORTS_PREFIX};
use crate::error::{PipelineError, Result};

/// `processed/YYYY/MM/DD/weather_data_YYYYMMDD_HHMMSS.json`, dated by the
/// target day and stamped with the write time
pub fn processed_key(target_date: NaiveDate, at: DateTime<Utc>) -> String {
    format!(
        "{}/{}/weather_data_{}.json",
        PROCESSED_PREFIX,
        target_date.format("%Y/%m/%d"),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// `reports/quality_report_YYYYMMDD_HHMMSS.json`
pub fn report_key(at: DateTime<Utc>) -> String {
    format!(
        "{}/quality_report_{}.json",
        REPORTS_PREFIX,
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Blob store backed by a local directory
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(PipelineError::Storage(format!("invalid blob key '{}'", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStorePort for FsBlobStore {
    async fn put_json(&self, key: &str, value: &Value) -> Result<String> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&path, body).await?;

        info!("Wrote {}", path.display());
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_key_layout() {
        let at = Utc.with_ymd_and_hms(2026, 2, 8, 6, 5, 9).unwrap();
        let target = NaiveDate::from_ymd_opt(2026, 2, 7).unwrap();
        assert_eq!(
            processed_key(target, at),
            "processed/2026/02/07/weather_data_20260208_060509.json"
        );
        assert_eq!(report_key(at), "reports/quality_report_20260208_060509.json");
    }

    #[tokio::test]
    async fn test_put_json_creates_directories() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());

        let location = store
            .put_json("processed/2026/02/08/batch.json", &json!([{"a": 1}]))
            .await
            .unwrap();
        assert!(location.starts_with("file://"));

        let written = std::fs::read_to_string(dir.path().join("processed/2026/02/08/batch.json")).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value, json!([{"a": 1}]));
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(store.put_json("../outside.json", &json!({})).await.is_err());
    }
}
