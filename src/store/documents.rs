use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::engine::client::EngineClient;
use crate::error::IndexError;
use crate::models::document::{Document, DocumentFields, DocumentPatch};

/// CRUD adapter for single documents.
///
/// Holds no request-scoped state; all durable state lives in the engine.
/// Concurrent updates to the same id race at the engine and the last
/// arrival wins — there is no optimistic concurrency token.
pub struct DocumentStore {
    engine: Arc<dyn EngineClient>,
    index: String,
}

impl DocumentStore {
    pub fn new(engine: Arc<dyn EngineClient>, index: impl Into<String>) -> Self {
        Self {
            engine,
            index: index.into(),
        }
    }

    /// Create a document: assign a fresh id, set `created_at` and
    /// `updated_at` to now, and index it with an immediate refresh so it
    /// is searchable as soon as this returns.
    pub async fn create(&self, fields: DocumentFields) -> Result<Document, IndexError> {
        fields.validate()?;

        let doc = Document::from_fields(fields, Utc::now());
        self.engine
            .put_document(&self.index, &doc.id, &doc.to_source(), true)
            .await
            .map_err(|e| IndexError::Store(format!("Failed to create document: {e}")))?;

        tracing::debug!("Created document {}", doc.id);
        Ok(doc)
    }

    /// Fetch a document. A missing id is `Ok(None)`, never an error.
    pub async fn get(&self, id: &str) -> Result<Option<Document>, IndexError> {
        let source = self
            .engine
            .get_source(&self.index, id)
            .await
            .map_err(|e| IndexError::Store(format!("Failed to get document '{id}': {e}")))?;

        let Some(source) = source else {
            return Ok(None);
        };

        let doc = Document::from_source(id, source).map_err(|e| {
            IndexError::Store(format!("Malformed document '{id}' in index: {e}"))
        })?;
        Ok(Some(doc))
    }

    /// Partial update: only the supplied fields overwrite stored values.
    ///
    /// Returns `Ok(None)` when the id does not exist. `updated_at` is set
    /// to now and always strictly greater than its previous value, even
    /// when wall clocks tie at the engine's timestamp precision.
    pub async fn update(
        &self,
        id: &str,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, IndexError> {
        patch.validate()?;

        let Some(mut doc) = self.get(id).await? else {
            return Ok(None);
        };

        let previous = doc.updated_at;
        patch.apply(&mut doc);
        let mut now = Utc::now();
        if now <= previous {
            now = previous + Duration::milliseconds(1);
        }
        doc.updated_at = now;

        let mut partial = serde_json::to_value(&patch)
            .expect("DocumentPatch serialization should not fail");
        if let Some(map) = partial.as_object_mut() {
            map.insert(
                "updated_at".to_string(),
                serde_json::to_value(doc.updated_at)
                    .expect("timestamp serialization should not fail"),
            );
        }

        self.engine
            .update_document(&self.index, id, &partial)
            .await
            .map_err(|e| IndexError::Store(format!("Failed to update document '{id}': {e}")))?;
        self.engine
            .refresh(&self.index)
            .await
            .map_err(|e| IndexError::Store(format!("Failed to refresh after update: {e}")))?;

        tracing::debug!("Updated document {}", id);
        Ok(Some(doc))
    }

    /// Permanently remove a document. Returns whether the id existed.
    /// Unrelated to the `status` label: archiving is not deletion.
    pub async fn delete(&self, id: &str) -> Result<bool, IndexError> {
        let deleted = self
            .engine
            .delete_document(&self.index, id)
            .await
            .map_err(|e| IndexError::Store(format!("Failed to delete document '{id}': {e}")))?;

        if deleted {
            self.engine
                .refresh(&self.index)
                .await
                .map_err(|e| IndexError::Store(format!("Failed to refresh after delete: {e}")))?;
            tracing::debug!("Deleted document {}", id);
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::engine::client::EngineError;
    use crate::engine::protocol::{BulkResponse, SearchResponse};
    use crate::models::document::{Category, Status};

    /// Stores sources by id; enough engine to exercise the CRUD paths.
    struct MapEngine {
        docs: Mutex<HashMap<String, Value>>,
        fail_writes: bool,
    }

    impl MapEngine {
        fn new() -> Self {
            Self {
                docs: Mutex::new(HashMap::new()),
                fail_writes: false,
            }
        }

        fn failing() -> Self {
            Self {
                docs: Mutex::new(HashMap::new()),
                fail_writes: true,
            }
        }
    }

    #[async_trait]
    impl EngineClient for MapEngine {
        async fn ping(&self) -> Result<(), EngineError> {
            Ok(())
        }

        async fn index_exists(&self, _index: &str) -> Result<bool, EngineError> {
            Ok(true)
        }

        async fn create_index(&self, _index: &str, _mapping: &Value) -> Result<(), EngineError> {
            Ok(())
        }

        async fn put_document(
            &self,
            _index: &str,
            id: &str,
            source: &Value,
            _refresh: bool,
        ) -> Result<(), EngineError> {
            if self.fail_writes {
                return Err(EngineError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            self.docs
                .lock()
                .unwrap()
                .insert(id.to_string(), source.clone());
            Ok(())
        }

        async fn get_source(&self, _index: &str, id: &str) -> Result<Option<Value>, EngineError> {
            Ok(self.docs.lock().unwrap().get(id).cloned())
        }

        async fn update_document(
            &self,
            _index: &str,
            id: &str,
            partial: &Value,
        ) -> Result<(), EngineError> {
            let mut docs = self.docs.lock().unwrap();
            let Some(stored) = docs.get_mut(id) else {
                return Err(EngineError::Status {
                    status: 404,
                    body: "document missing".to_string(),
                });
            };
            if let (Some(target), Some(fields)) = (stored.as_object_mut(), partial.as_object()) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }
            Ok(())
        }

        async fn delete_document(&self, _index: &str, id: &str) -> Result<bool, EngineError> {
            Ok(self.docs.lock().unwrap().remove(id).is_some())
        }

        async fn bulk(&self, _payload: String) -> Result<BulkResponse, EngineError> {
            unimplemented!()
        }

        async fn search(&self, _index: &str, _body: &Value) -> Result<SearchResponse, EngineError> {
            unimplemented!()
        }

        async fn refresh(&self, _index: &str) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn sample_fields() -> DocumentFields {
        DocumentFields {
            title: "Quantum Cryptography Breakthrough".to_string(),
            body: "New developments in quantum key distribution.".to_string(),
            category: Category::SciCrypt,
            tags: vec!["sci-crypt".to_string(), "science".to_string()],
            author: Some("crypto_expert".to_string()),
            source_url: None,
            status: Status::Active,
        }
    }

    fn store(engine: MapEngine) -> DocumentStore {
        DocumentStore::new(Arc::new(engine), "newsgroups")
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_equal_timestamps() {
        let store = store(MapEngine::new());
        let doc = store.create(sample_fields()).await.unwrap();

        assert!(!doc.id.is_empty());
        assert_eq!(doc.created_at, doc.updated_at);
        assert_eq!(doc.title, "Quantum Cryptography Breakthrough");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields_before_engine_call() {
        let store = store(MapEngine::failing());
        let mut fields = sample_fields();
        fields.body = String::new();

        let result = store.create(fields).await;
        assert!(matches!(result, Err(IndexError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_write_failure_is_store_error() {
        let store = store(MapEngine::failing());
        let result = store.create(sample_fields()).await;
        assert!(matches!(result, Err(IndexError::Store(_))));
    }

    #[tokio::test]
    async fn test_get_missing_id_is_none() {
        let store = store(MapEngine::new());
        assert!(store.get("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_merges_and_bumps_updated_at() {
        let store = store(MapEngine::new());
        let created = store.create(sample_fields()).await.unwrap();

        let patch = DocumentPatch {
            status: Some(Status::Archived),
            ..Default::default()
        };
        let updated = store.update(&created.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.status, Status::Archived);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_consecutive_updates_strictly_increase_updated_at() {
        let store = store(MapEngine::new());
        let created = store.create(sample_fields()).await.unwrap();

        let mut previous = created.updated_at;
        for round in 0..3 {
            let patch = DocumentPatch {
                title: Some(format!("Title {round}")),
                ..Default::default()
            };
            let updated = store.update(&created.id, patch).await.unwrap().unwrap();
            assert!(updated.updated_at > previous);
            previous = updated.updated_at;
        }
    }

    #[tokio::test]
    async fn test_update_missing_id_is_none() {
        let store = store(MapEngine::new());
        let patch = DocumentPatch {
            title: Some("New".to_string()),
            ..Default::default()
        };
        assert!(store.update("no-such-id", patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let store = store(MapEngine::new());
        let created = store.create(sample_fields()).await.unwrap();

        assert!(store.delete(&created.id).await.unwrap());
        assert!(store.get(&created.id).await.unwrap().is_none());
        assert!(!store.delete(&created.id).await.unwrap());
    }
}
