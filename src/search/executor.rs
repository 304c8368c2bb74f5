use std::sync::Arc;

use crate::engine::client::EngineClient;
use crate::error::IndexError;
use crate::models::document::{Category, Document, Status};
use crate::models::search::{SearchRequest, SearchResult};
use crate::search::query::build_query;

/// Executes built queries and maps raw hits to typed results.
///
/// Pure read path: never mutates the index.
pub struct SearchExecutor {
    engine: Arc<dyn EngineClient>,
    index: String,
}

impl SearchExecutor {
    pub fn new(engine: Arc<dyn EngineClient>, index: impl Into<String>) -> Self {
        Self {
            engine,
            index: index.into(),
        }
    }

    /// Run a search and map the response.
    ///
    /// `total_hits` is the true match count regardless of pagination;
    /// `max_score` comes straight from the engine and stays `None` for
    /// unscored queries.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult, IndexError> {
        request.validate()?;

        let body = build_query(request);
        tracing::debug!("Executing search: {}", body);

        let response = self
            .engine
            .search(&self.index, &body)
            .await
            .map_err(|e| IndexError::Query(format!("Search failed: {e}")))?;

        let mut documents = Vec::with_capacity(response.hits.hits.len());
        for hit in response.hits.hits {
            let doc = Document::from_source(&hit.id, hit.source)
                .map_err(|e| IndexError::Query(format!("Malformed hit '{}': {e}", hit.id)))?;
            documents.push(doc);
        }

        Ok(SearchResult {
            total_hits: response.hits.total.value,
            max_score: response.hits.max_score,
            took_ms: response.took,
            documents,
        })
    }

    /// Count the documents in a category without transferring bodies.
    pub async fn count_by_category(&self, category: Category) -> Result<u64, IndexError> {
        let request = SearchRequest {
            category: Some(category),
            limit: 0,
            ..Default::default()
        };
        Ok(self.search(&request).await?.total_hits)
    }

    /// Count the documents carrying a status label.
    pub async fn count_by_status(&self, status: Status) -> Result<u64, IndexError> {
        let request = SearchRequest {
            status: Some(status),
            limit: 0,
            ..Default::default()
        };
        Ok(self.search(&request).await?.total_hits)
    }

    /// Document counts for every category, in newsgroup order.
    pub async fn category_breakdown(&self) -> Result<Vec<(Category, u64)>, IndexError> {
        let mut counts = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            counts.push((category, self.count_by_category(category).await?));
        }
        Ok(counts)
    }

    /// Document counts for every status label.
    pub async fn status_breakdown(&self) -> Result<Vec<(Status, u64)>, IndexError> {
        let mut counts = Vec::with_capacity(Status::ALL.len());
        for status in Status::ALL {
            counts.push((status, self.count_by_status(status).await?));
        }
        Ok(counts)
    }
}
