use serde_json::{json, Value};

use crate::engine::client::EngineClient;
use crate::error::IndexError;

/// Field mapping for the document index.
///
/// `title` gets a `keyword` subfield for exact matching alongside the
/// analyzed text; `source_url` is stored but not indexed.
pub fn document_mapping() -> Value {
    json!({
        "properties": {
            "title": {
                "type": "text",
                "analyzer": "standard",
                "fields": {
                    "keyword": {"type": "keyword", "ignore_above": 256}
                }
            },
            "body": {
                "type": "text",
                "analyzer": "standard"
            },
            "category": {
                "type": "keyword"
            },
            "tags": {
                "type": "keyword"
            },
            "author": {
                "type": "keyword",
                "ignore_above": 256
            },
            "source_url": {
                "type": "keyword",
                "index": false
            },
            "status": {
                "type": "keyword"
            },
            "created_at": {
                "type": "date"
            },
            "updated_at": {
                "type": "date"
            }
        }
    })
}

/// Create the index with its mapping if it does not exist yet.
///
/// Idempotent; safe to call on every startup. An unreachable engine is
/// fatal: the caller must abort startup.
pub async fn ensure_index(engine: &dyn EngineClient, index: &str) -> Result<(), IndexError> {
    let exists = engine.index_exists(index).await.map_err(|e| {
        IndexError::Connectivity(format!("Failed to check index '{index}': {e}"))
    })?;

    if exists {
        tracing::info!("Index {} already exists", index);
        return Ok(());
    }

    tracing::info!("Creating index {}", index);
    engine
        .create_index(index, &document_mapping())
        .await
        .map_err(|e| IndexError::Connectivity(format!("Failed to create index '{index}': {e}")))?;
    tracing::info!("Index {} created successfully", index);

    Ok(())
}
