use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

use crate::error::{PipelineError, Result};

const AIRBYTE_DATA_KEY: &str = "_airbyte_data";

/// Split file content into JSON objects.
///
/// Accepts a single JSON object, an array of objects, or JSON lines.
/// Invalid lines and non-object items are dropped.
pub fn decode_documents(content: &str, origin: &str) -> Vec<Map<String, Value>> {
    let content = content.trim();
    if content.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(obj)) => vec![obj],
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(obj) => Some(obj),
                _ => None,
            })
            .collect(),
        Ok(_) => Vec::new(),
        Err(_) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| match serde_json::from_str::<Value>(line) {
                Ok(Value::Object(obj)) => Some(obj),
                Ok(_) => None,
                Err(_) => {
                    warn!("Skipping invalid JSON line in {}", origin);
                    None
                }
            })
            .collect(),
    }
}

/// Unwrap Airbyte envelopes. Documents without one are taken as the payload itself.
pub fn airbyte_payloads(documents: Vec<Map<String, Value>>) -> Vec<Value> {
    documents
        .into_iter()
        .map(|mut doc| match doc.remove(AIRBYTE_DATA_KEY) {
            Some(payload) => payload,
            None => Value::Object(doc),
        })
        .collect()
}

/// Read a local extract and return its Airbyte payloads
pub async fn read_payloads(path: &Path) -> Result<Vec<Value>> {
    let origin = path.display().to_string();
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PipelineError::Extract {
                source_name: origin.clone(),
                message: "file not found".to_string(),
            }
        } else {
            PipelineError::Io(e)
        }
    })?;
    Ok(airbyte_payloads(decode_documents(&content, &origin)))
}
