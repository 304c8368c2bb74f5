use std::sync::Arc;

use anyhow::Context;

use newsdex::engine::client::{EngineClient, HttpEngineClient};
use newsdex::index::schema::ensure_index;
use newsdex::ingest::bulk::{BulkIngestor, MAX_BULK_SIZE};
use newsdex::ingest::corpus::{CorpusLoader, Subset};
use newsdex::models::document::Category;
use newsdex::search::executor::SearchExecutor;

/// Seed the search index from an extracted 20-newsgroups corpus.
///
/// Configuration is read from environment variables:
/// - `ENGINE_URL` — engine endpoint (default `http://localhost:9200`)
/// - `ENGINE_INDEX` — index name (default `newsgroups`)
/// - `CORPUS_ROOT` — corpus directory (default `./20news-bydate`)
/// - `CORPUS_SUBSET` — `train`, `test`, or `all` (default `train`)
/// - `MAX_DOCUMENTS` — load cap (default `1000`)
/// - `CATEGORIES` — optional comma-separated category filter
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsdex=info".into()),
        )
        .init();

    let index = std::env::var("ENGINE_INDEX").unwrap_or_else(|_| "newsgroups".to_string());
    let corpus_root =
        std::env::var("CORPUS_ROOT").unwrap_or_else(|_| "./20news-bydate".to_string());
    let subset_raw = std::env::var("CORPUS_SUBSET").unwrap_or_else(|_| "train".to_string());
    let subset = Subset::from_str_ci(&subset_raw)
        .with_context(|| format!("Invalid CORPUS_SUBSET '{subset_raw}'"))?;
    let max_documents: usize = std::env::var("MAX_DOCUMENTS")
        .unwrap_or_else(|_| "1000".to_string())
        .parse()
        .context("MAX_DOCUMENTS must be a number")?;

    let categories: Option<Vec<Category>> = match std::env::var("CATEGORIES") {
        Ok(raw) => {
            let mut parsed = Vec::new();
            for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let category = Category::from_str_ci(name)
                    .with_context(|| format!("Unknown category '{name}'"))?;
                parsed.push(category);
            }
            Some(parsed)
        }
        Err(_) => None,
    };

    let engine: Arc<dyn EngineClient> = Arc::new(HttpEngineClient::from_env()?);

    tracing::info!("Checking engine connectivity");
    engine.ping().await.context("Engine is unreachable")?;

    ensure_index(engine.as_ref(), &index).await?;

    let loader = CorpusLoader::new(&corpus_root);
    let documents = loader
        .load(subset, categories.as_deref(), max_documents)
        .await?;
    tracing::info!("Loaded {} documents from {}", documents.len(), corpus_root);

    let ingestor = BulkIngestor::new(Arc::clone(&engine), &index);
    let mut indexed = 0usize;
    let mut failed = 0usize;
    for chunk in documents.chunks(MAX_BULK_SIZE) {
        let result = ingestor.bulk_create(chunk.to_vec()).await?;
        indexed += result.success_count;
        failed += result.error_count;
        for error in &result.errors {
            tracing::warn!("Bulk item failed: {}", error);
        }
    }
    tracing::info!("Seeding complete: {} indexed, {} failed", indexed, failed);

    let executor = SearchExecutor::new(engine, &index);
    for (category, count) in executor.category_breakdown().await? {
        if count > 0 {
            tracing::info!("{}: {} documents", category, count);
        }
    }

    Ok(())
}
