use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::app::ports::{DocumentStorePort, InsertSummary};
use crate::domain::UnifiedDocument;
use crate::error::{PipelineError, Result};

/// One line of the collection file
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(flatten)]
    document: UnifiedDocument,
}

/// Document collection stored as JSON lines, unique on the document natural key
pub struct JsonFileDocumentStore {
    path: PathBuf,
    known_keys: Mutex<Option<HashSet<String>>>,
}

impl JsonFileDocumentStore {
    /// Collection file lives at `{root}/{database}/{collection}.jsonl`
    pub fn new(root: impl AsRef<Path>, database: &str, collection: &str) -> Self {
        let path = root
            .as_ref()
            .join(database)
            .join(format!("{}.jsonl", collection));
        Self {
            path,
            known_keys: Mutex::new(None),
        }
    }

    /// Load every stored document, skipping unreadable lines
    pub async fn load_all(&self) -> Result<Vec<UnifiedDocument>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<StoredDocument>(line) {
                Ok(stored) => Some(stored.document),
                Err(e) => {
                    warn!("Skipping unreadable document in {}: {}", self.path.display(), e);
                    None
                }
            })
            .collect())
    }

    async fn read_keys(&self) -> Result<HashSet<String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .filter_map(|value| value.get("_id").and_then(|id| id.as_str()).map(String::from))
            .collect())
    }
}

#[async_trait]
impl DocumentStorePort for JsonFileDocumentStore {
    async fn bulk_insert(&self, documents: &[UnifiedDocument]) -> Result<InsertSummary> {
        let mut guard = self.known_keys.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_keys().await?);
        }
        let known = guard
            .as_mut()
            .ok_or_else(|| PipelineError::Storage("key index unavailable".to_string()))?;

        // Keys join the index only once their lines are on disk
        let mut written = HashSet::new();
        let mut summary = InsertSummary::default();
        let mut buffer = String::new();
        for document in documents {
            let key = document.natural_key();
            if known.contains(&key) || !written.insert(key.clone()) {
                summary.duplicates += 1;
                continue;
            }
            let line = serde_json::to_string(&StoredDocument {
                id: key,
                document: document.clone(),
            })?;
            buffer.push_str(&line);
            buffer.push('\n');
            summary.inserted += 1;
        }

        if summary.inserted > 0 {
            if let Some(parent) = self.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(buffer.as_bytes()).await?;
            file.flush().await?;
            known.extend(written);
        }

        if summary.duplicates > 0 {
            debug!("Skipped {} duplicate documents", summary.duplicates);
        }
        info!(
            "Inserted {} documents into {}",
            summary.inserted,
            self.path.display()
        );
        Ok(summary)
    }
}
