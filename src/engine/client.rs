use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::engine::protocol::{BulkResponse, GetResponse, SearchResponse};
use crate::error::IndexError;

/// Transport-level failure talking to the engine.
///
/// Adapters map these into the application taxonomy at each seam.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Client for the engine's JSON wire protocol.
///
/// Abstracted as a trait so tests can run against an in-memory engine.
/// Implementations hold no request-scoped state and are safe for
/// concurrent use.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Liveness check against the engine root endpoint.
    async fn ping(&self) -> Result<(), EngineError>;

    async fn index_exists(&self, index: &str) -> Result<bool, EngineError>;

    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), EngineError>;

    /// Index (create or replace) a document under an explicit id.
    /// With `refresh`, the document is searchable as soon as this returns.
    async fn put_document(
        &self,
        index: &str,
        id: &str,
        source: &Value,
        refresh: bool,
    ) -> Result<(), EngineError>;

    /// Fetch a document source. `Ok(None)` when the id does not exist.
    async fn get_source(&self, index: &str, id: &str) -> Result<Option<Value>, EngineError>;

    /// Merge `partial` into the stored document source.
    async fn update_document(
        &self,
        index: &str,
        id: &str,
        partial: &Value,
    ) -> Result<(), EngineError>;

    /// Returns `false` when the id did not exist.
    async fn delete_document(&self, index: &str, id: &str) -> Result<bool, EngineError>;

    /// Submit a newline-delimited action/body payload in one round trip.
    /// Target indices are named in the action lines.
    async fn bulk(&self, payload: String) -> Result<BulkResponse, EngineError>;

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, EngineError>;

    /// Force a refresh so previously indexed documents become searchable.
    async fn refresh(&self, index: &str) -> Result<(), EngineError>;
}

/// HTTP implementation of [`EngineClient`].
///
/// The underlying `reqwest::Client` owns the connection pool; it is
/// created once and shared across all calls.
pub struct HttpEngineClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpEngineClient {
    /// Create a client from environment variables.
    ///
    /// Reads `ENGINE_URL` (default `http://localhost:9200`).
    pub fn from_env() -> Result<Self, IndexError> {
        let url =
            std::env::var("ENGINE_URL").unwrap_or_else(|_| "http://localhost:9200".to_string());
        Self::new(&url)
    }

    /// Create with an explicit endpoint (useful for testing / DI).
    pub fn new(url: &str) -> Result<Self, IndexError> {
        let base_url = Url::parse(url)
            .map_err(|e| IndexError::Connectivity(format!("Invalid engine URL '{url}': {e}")))?;
        if !base_url.has_host() {
            return Err(IndexError::Connectivity(format!(
                "Engine URL '{url}' has no host"
            )));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }
}

/// Turn a non-success response into [`EngineError::Status`], preserving
/// the body the engine sent.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, EngineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EngineError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl EngineClient for HttpEngineClient {
    async fn ping(&self) -> Result<(), EngineError> {
        let response = self.http.get(self.base_url.clone()).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        let response = self.http.head(self.endpoint(&[index])).send().await?;
        match response.status().as_u16() {
            404 => Ok(false),
            _ => {
                check(response).await?;
                Ok(true)
            }
        }
    }

    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), EngineError> {
        let response = self
            .http
            .put(self.endpoint(&[index]))
            .json(&json!({ "mappings": mapping }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn put_document(
        &self,
        index: &str,
        id: &str,
        source: &Value,
        refresh: bool,
    ) -> Result<(), EngineError> {
        let mut request = self.http.put(self.endpoint(&[index, "_doc", id])).json(source);
        if refresh {
            request = request.query(&[("refresh", "true")]);
        }
        let response = request.send().await?;
        check(response).await?;
        Ok(())
    }

    async fn get_source(&self, index: &str, id: &str) -> Result<Option<Value>, EngineError> {
        let response = self
            .http
            .get(self.endpoint(&[index, "_doc", id]))
            .send()
            .await?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        let body: GetResponse = check(response).await?.json().await?;
        if !body.found {
            return Ok(None);
        }
        Ok(body.source)
    }

    async fn update_document(
        &self,
        index: &str,
        id: &str,
        partial: &Value,
    ) -> Result<(), EngineError> {
        let response = self
            .http
            .post(self.endpoint(&[index, "_update", id]))
            .json(&json!({ "doc": partial }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<bool, EngineError> {
        let response = self
            .http
            .delete(self.endpoint(&[index, "_doc", id]))
            .send()
            .await?;
        if response.status().as_u16() == 404 {
            return Ok(false);
        }
        check(response).await?;
        Ok(true)
    }

    async fn bulk(&self, payload: String) -> Result<BulkResponse, EngineError> {
        let response = self
            .http
            .post(self.endpoint(&["_bulk"]))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(payload)
            .send()
            .await?;
        let body: BulkResponse = check(response).await?.json().await?;
        Ok(body)
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, EngineError> {
        let response = self
            .http
            .post(self.endpoint(&[index, "_search"]))
            .json(body)
            .send()
            .await?;
        let body: SearchResponse = check(response).await?.json().await?;
        Ok(body)
    }

    async fn refresh(&self, index: &str) -> Result<(), EngineError> {
        let response = self
            .http
            .post(self.endpoint(&[index, "_refresh"]))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
