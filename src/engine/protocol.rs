//! Serde mirrors of the engine's JSON wire format.
//!
//! Only the parts this crate reads are modeled; unknown fields are
//! ignored on deserialization.

use serde::Deserialize;
use serde_json::Value;

/// Response to a `_search` request.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Engine-reported latency in milliseconds.
    pub took: u64,
    pub hits: Hits,
}

#[derive(Debug, Deserialize)]
pub struct Hits {
    pub total: TotalHits,
    /// Absent when the engine did not track scores for the query.
    pub max_score: Option<f64>,
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct TotalHits {
    pub value: u64,
}

/// One matched document.
#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: Value,
}

/// Response to a `_doc` GET.
#[derive(Debug, Deserialize)]
pub struct GetResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub found: bool,
    #[serde(rename = "_source")]
    pub source: Option<Value>,
}

/// Response to a `_bulk` request: one item per submitted action, each
/// with its own outcome.
#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    /// True when at least one item failed.
    pub errors: bool,
    pub items: Vec<BulkItem>,
}

/// A single bulk item outcome. Bulk creation uses the `index` action.
#[derive(Debug, Deserialize)]
pub struct BulkItem {
    pub index: BulkItemStatus,
}

#[derive(Debug, Deserialize)]
pub struct BulkItemStatus {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub status: u16,
    pub error: Option<BulkItemError>,
}

#[derive(Debug, Deserialize)]
pub struct BulkItemError {
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: Option<String>,
}
