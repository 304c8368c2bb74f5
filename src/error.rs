use thiserror::Error;

/// Application-wide error types.
///
/// Partial bulk failure is deliberately not represented here: per-item
/// failures are expected and reported through
/// [`BulkResult`](crate::models::search::BulkResult).
#[derive(Debug, Error)]
pub enum IndexError {
    /// The engine could not be reached during startup or index
    /// initialization. Fatal; the caller must abort startup.
    #[error("Engine connectivity error: {0}")]
    Connectivity(String),

    /// A single-document or bulk transport failure. Not auto-retried.
    #[error("Store error: {0}")]
    Store(String),

    /// A malformed query or a search transport failure.
    #[error("Query error: {0}")]
    Query(String),

    /// Caller-supplied fields violate a document invariant. Rejected
    /// before any engine call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The on-disk corpus could not be read.
    #[error("Corpus error: {0}")]
    Corpus(String),
}
