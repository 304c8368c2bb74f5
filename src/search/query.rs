use serde_json::{json, Value};

use crate::models::search::SearchRequest;

/// Translate a [`SearchRequest`] into the engine's bool query.
///
/// Free text becomes a best-fields `multi_match` over title (boosted ×2)
/// and body; without it the query matches everything. Filters are
/// non-scored term clauses. Each requested tag gets its own clause: a
/// document must carry every listed tag, not any of them. Results sort by
/// `created_at` descending; ties are left to the engine's natural order.
pub fn build_query(request: &SearchRequest) -> Value {
    let mut must = Vec::new();
    let mut filter = Vec::new();

    match &request.query {
        Some(text) => must.push(json!({
            "multi_match": {
                "query": text,
                "fields": ["title^2", "body"],
                "type": "best_fields"
            }
        })),
        None => must.push(json!({ "match_all": {} })),
    }

    if let Some(category) = request.category {
        filter.push(json!({ "term": { "category": category.as_str() } }));
    }
    if let Some(tags) = &request.tags {
        for tag in tags {
            filter.push(json!({ "term": { "tags": tag } }));
        }
    }
    if let Some(author) = &request.author {
        filter.push(json!({ "term": { "author": author } }));
    }
    if let Some(status) = request.status {
        filter.push(json!({ "term": { "status": status.as_str() } }));
    }

    json!({
        "query": { "bool": { "must": must, "filter": filter } },
        "from": request.offset,
        "size": request.limit,
        "sort": [{ "created_at": { "order": "desc" } }]
    })
}
