#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use newsdex::engine::client::{EngineClient, EngineError};
use newsdex::engine::protocol::{
    BulkItem, BulkItemError, BulkItemStatus, BulkResponse, Hit, Hits, SearchResponse, TotalHits,
};
use newsdex::models::document::{Category, DocumentFields, Status};

/// In-memory engine speaking the same JSON contract as the real one.
///
/// Stores document sources keyed by id and evaluates the query bodies the
/// crate builds: `match_all` / `multi_match` must clauses, term filters
/// (with array semantics for `tags`), `from`/`size` pagination and the
/// `created_at` descending sort. Bodies containing `reject_marker` fail
/// per item during bulk, standing in for engine-side mapping failures.
pub struct InMemoryEngine {
    docs: Mutex<HashMap<String, Value>>,
    index_exists: Mutex<bool>,
    reject_marker: Option<String>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(HashMap::new()),
            index_exists: Mutex::new(false),
            reject_marker: None,
        }
    }

    /// Bulk items whose source contains `marker` fail with a per-item
    /// error instead of being stored.
    pub fn with_bulk_reject_marker(marker: &str) -> Self {
        Self {
            docs: Mutex::new(HashMap::new()),
            index_exists: Mutex::new(false),
            reject_marker: Some(marker.to_string()),
        }
    }

    pub fn document_count(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    fn matches_filters(source: &Value, filters: &[Value]) -> bool {
        filters.iter().all(|clause| {
            let Some(term) = clause.get("term").and_then(Value::as_object) else {
                return false;
            };
            term.iter().all(|(field, expected)| {
                if field == "tags" {
                    source["tags"]
                        .as_array()
                        .map(|tags| tags.contains(expected))
                        .unwrap_or(false)
                } else {
                    &source[field.as_str()] == expected
                }
            })
        })
    }

    /// Naive relevance: one point per query token found in the body, two
    /// per token found in the title. `None` means no match.
    fn text_score(query: &str, source: &Value) -> Option<f64> {
        let title = source["title"].as_str().unwrap_or("").to_lowercase();
        let body = source["body"].as_str().unwrap_or("").to_lowercase();

        let mut score = 0.0;
        for token in query.to_lowercase().split_whitespace() {
            if title.contains(token) {
                score += 2.0;
            }
            if body.contains(token) {
                score += 1.0;
            }
        }
        if score > 0.0 {
            Some(score)
        } else {
            None
        }
    }

    fn created_at(source: &Value) -> DateTime<Utc> {
        source["created_at"]
            .as_str()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl EngineClient for InMemoryEngine {
    async fn ping(&self) -> Result<(), EngineError> {
        Ok(())
    }

    async fn index_exists(&self, _index: &str) -> Result<bool, EngineError> {
        Ok(*self.index_exists.lock().unwrap())
    }

    async fn create_index(&self, _index: &str, _mapping: &Value) -> Result<(), EngineError> {
        *self.index_exists.lock().unwrap() = true;
        Ok(())
    }

    async fn put_document(
        &self,
        _index: &str,
        id: &str,
        source: &Value,
        _refresh: bool,
    ) -> Result<(), EngineError> {
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

    async fn bulk(&self, payload: String) -> Result<BulkResponse, EngineError> {
        let lines: Vec<&str> = payload.lines().collect();
        let mut items = Vec::new();
        let mut docs = self.docs.lock().unwrap();

        for pair in lines.chunks(2) {
            let [action_line, source_line] = pair else {
                return Err(EngineError::Status {
                    status: 400,
                    body: "malformed bulk payload".to_string(),
                });
            };
            let action: Value =
                serde_json::from_str(action_line).map_err(|e| EngineError::Status {
                    status: 400,
                    body: format!("malformed action line: {e}"),
                })?;
            let source: Value =
                serde_json::from_str(source_line).map_err(|e| EngineError::Status {
                    status: 400,
                    body: format!("malformed source line: {e}"),
                })?;
            let id = action["index"]["_id"]
                .as_str()
                .unwrap_or_default()
                .to_string();

            let rejected = self
                .reject_marker
                .as_ref()
                .map(|marker| source_line.contains(marker.as_str()))
                .unwrap_or(false);

            if rejected {
                items.push(BulkItem {
                    index: BulkItemStatus {
                        id: Some(id),
                        status: 400,
                        error: Some(BulkItemError {
                            kind: "mapper_parsing_exception".to_string(),
                            reason: Some("simulated per-item failure".to_string()),
                        }),
                    },
                });
            } else {
                docs.insert(id.clone(), source);
                items.push(BulkItem {
                    index: BulkItemStatus {
                        id: Some(id),
                        status: 201,
                        error: None,
                    },
                });
            }
        }

        let errors = items.iter().any(|item| item.index.error.is_some());
        Ok(BulkResponse { errors, items })
    }

    async fn search(&self, _index: &str, body: &Value) -> Result<SearchResponse, EngineError> {
        let bool_query = &body["query"]["bool"];
        let must = bool_query["must"].as_array().cloned().unwrap_or_default();
        let filters = bool_query["filter"].as_array().cloned().unwrap_or_default();

        let text_query = must
            .first()
            .and_then(|clause| clause["multi_match"]["query"].as_str())
            .map(str::to_string);

        let mut matched: Vec<(Option<f64>, String, Value)> = Vec::new();
        for (id, source) in self.docs.lock().unwrap().iter() {
            if !Self::matches_filters(source, &filters) {
                continue;
            }
            let score = match &text_query {
                Some(query) => match Self::text_score(query, source) {
                    Some(score) => Some(score),
                    None => continue,
                },
                None => None,
            };
            matched.push((score, id.clone(), source.clone()));
        }

        matched.sort_by(|a, b| Self::created_at(&b.2).cmp(&Self::created_at(&a.2)));

        let total = matched.len() as u64;
        let max_score = matched
            .iter()
            .filter_map(|(score, _, _)| *score)
            .fold(None, |acc: Option<f64>, score| {
                Some(acc.map_or(score, |current: f64| current.max(score)))
            });

        let from = body["from"].as_u64().unwrap_or(0) as usize;
        let size = body["size"].as_u64().unwrap_or(10) as usize;

        let hits = matched
            .into_iter()
            .skip(from)
            .take(size)
            .map(|(score, id, source)| Hit { id, score, source })
            .collect();

        Ok(SearchResponse {
            took: 1,
            hits: Hits {
                total: TotalHits { value: total },
                max_score,
                hits,
            },
        })
    }

    async fn refresh(&self, _index: &str) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Create-ready fields with sensible defaults for tests.
pub fn fields(title: &str, category: Category) -> DocumentFields {
    DocumentFields {
        title: title.to_string(),
        body: format!("{title}. Body text long enough to pass the length checks."),
        category,
        tags: vec![category.slug(), category.family().to_string()],
        author: Some("test_author".to_string()),
        source_url: None,
        status: Status::Active,
    }
}
