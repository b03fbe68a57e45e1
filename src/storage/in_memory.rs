use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::app::ports::{DocumentStorePort, InsertSummary};
use crate::domain::UnifiedDocument;
use crate::error::{PipelineError, Result};

/// In-memory document store for development/testing
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<Mutex<HashMap<String, UnifiedDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStorePort for InMemoryDocumentStore {
    async fn bulk_insert(&self, documents: &[UnifiedDocument]) -> Result<InsertSummary> {
        let mut stored = self
            .documents
            .lock()
            .map_err(|_| PipelineError::Storage("document store lock poisoned".to_string()))?;

        let mut summary = InsertSummary::default();
        for document in documents {
            let key = document.natural_key();
            if stored.contains_key(&key) {
                summary.duplicates += 1;
                continue;
            }
            stored.insert(key, document.clone());
            summary.inserted += 1;
        }

        debug!("Stored {} documents in memory", summary.inserted);
        Ok(summary)
    }
}
