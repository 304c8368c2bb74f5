use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::engine::client::EngineClient;
use crate::error::IndexError;
use crate::models::document::{Document, DocumentFields};
use crate::models::search::BulkResult;

/// Maximum number of documents accepted by a single bulk call.
/// Exceeding it is an error, never a silent truncation.
pub const MAX_BULK_SIZE: usize = 1000;

/// Batches many create operations into one wire-level request.
pub struct BulkIngestor {
    engine: Arc<dyn EngineClient>,
    index: String,
}

impl BulkIngestor {
    pub fn new(engine: Arc<dyn EngineClient>, index: impl Into<String>) -> Self {
        Self {
            engine,
            index: index.into(),
        }
    }

    /// Create many documents in one request, with per-item accounting.
    ///
    /// Items failing field validation are reported per item and never
    /// reach the engine. Per-item engine failures never abort the batch;
    /// only a transport failure does, and then no partial-result guarantee
    /// is made — the engine may have applied part of the request.
    pub async fn bulk_create(&self, items: Vec<DocumentFields>) -> Result<BulkResult, IndexError> {
        if items.len() > MAX_BULK_SIZE {
            return Err(IndexError::Validation(format!(
                "Bulk request of {} items exceeds the {MAX_BULK_SIZE} item cap",
                items.len()
            )));
        }

        let now = Utc::now();
        let mut errors = Vec::new();
        let mut payload = String::new();
        let mut submitted = 0usize;

        for fields in items {
            if let Err(e) = fields.validate() {
                errors.push(e.to_string());
                continue;
            }

            let doc = Document::from_fields(fields, now);
            let action = json!({ "index": { "_index": self.index, "_id": doc.id } });
            payload.push_str(&action.to_string());
            payload.push('\n');
            payload.push_str(&doc.to_source().to_string());
            payload.push('\n');
            submitted += 1;
        }

        let mut success_count = 0usize;
        if submitted > 0 {
            let response = self
                .engine
                .bulk(payload)
                .await
                .map_err(|e| IndexError::Store(format!("Bulk request failed: {e}")))?;
            self.engine
                .refresh(&self.index)
                .await
                .map_err(|e| IndexError::Store(format!("Failed to refresh after bulk: {e}")))?;

            for item in response.items {
                match item.index.error {
                    Some(error) => errors.push(error.reason.unwrap_or(error.kind)),
                    None => success_count += 1,
                }
            }
        }

        let result = BulkResult {
            success_count,
            error_count: errors.len(),
            errors,
        };
        tracing::info!(
            "Bulk create: {} indexed, {} failed",
            result.success_count,
            result.error_count
        );
        Ok(result)
    }
}
