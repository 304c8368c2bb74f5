use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::models::document::{Category, Document, Status};

/// Default number of documents returned when the caller does not say.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Upper bound on the number of documents per search page.
pub const MAX_SEARCH_LIMIT: usize = 100;

/// A structured search request.
///
/// Every field is optional except pagination. Filters combine with AND:
/// a document must satisfy all of them. `limit = 0` is a valid count-only
/// request returning no documents but the true total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query over title and body.
    #[serde(default)]
    pub query: Option<String>,
    /// Exact category filter.
    #[serde(default)]
    pub category: Option<Category>,
    /// Tags the document must all carry.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Exact author filter.
    #[serde(default)]
    pub author: Option<String>,
    /// Opt-in status filter; absent means documents of every status match,
    /// archived ones included.
    #[serde(default)]
    pub status: Option<Status>,
    /// Page size, 0–100.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Number of matches to skip.
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            tags: None,
            author: None,
            status: None,
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }
}

impl SearchRequest {
    /// Check the pagination bounds. Runs before any engine call.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.limit > MAX_SEARCH_LIMIT {
            return Err(IndexError::Validation(format!(
                "limit must be at most {MAX_SEARCH_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// The outcome of a search, sorted by `created_at` descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// True number of matches, independent of pagination.
    pub total_hits: u64,
    /// Top relevance score; `None` when the engine did not score the
    /// query (match-all, or any query under an explicit sort).
    pub max_score: Option<f64>,
    /// Engine-reported latency in milliseconds.
    pub took_ms: u64,
    pub documents: Vec<Document>,
}

/// Per-item accounting for a bulk ingestion call.
///
/// A result value, not an error: per-item failures never abort the batch.
/// Error order is not guaranteed to align with input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResult {
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}
