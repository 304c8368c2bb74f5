use std::path::{Path, PathBuf};

use crate::error::IndexError;
use crate::ingest::normalizer;
use crate::models::document::{Category, DocumentFields};

/// Which slice of the corpus to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subset {
    Train,
    Test,
    All,
}

impl Subset {
    /// Directory names under the corpus root, per the 20-newsgroups
    /// by-date distribution.
    fn dir_names(&self) -> &'static [&'static str] {
        match self {
            Subset::Train => &["20news-bydate-train"],
            Subset::Test => &["20news-bydate-test"],
            Subset::All => &["20news-bydate-train", "20news-bydate-test"],
        }
    }

    /// Parse a subset selector (case-insensitive).
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "train" => Some(Subset::Train),
            "test" => Some(Subset::Test),
            "all" => Some(Subset::All),
            _ => None,
        }
    }
}

/// Reads newsgroup articles from an extracted 20-newsgroups corpus tree
/// (`<root>/<subset>/<category>/<article>`) and normalizes each into
/// create-ready fields for the bulk pipeline.
pub struct CorpusLoader {
    root: PathBuf,
}

impl CorpusLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load up to `max_documents` normalized documents.
    ///
    /// `categories = None` loads every known category; directories that do
    /// not name a known category are skipped. Articles whose cleaned body
    /// is too short are dropped silently; unreadable articles are logged
    /// and skipped. An unreadable corpus root is an error.
    pub async fn load(
        &self,
        subset: Subset,
        categories: Option<&[Category]>,
        max_documents: usize,
    ) -> Result<Vec<DocumentFields>, IndexError> {
        let mut documents = Vec::new();
        let mut too_short = 0usize;

        for dir_name in subset.dir_names() {
            let subset_dir = self.root.join(dir_name);
            let category_dirs = list_sorted(&subset_dir).await?;

            for (name, path) in category_dirs {
                let Some(category) = Category::from_str_ci(&name) else {
                    tracing::debug!("Skipping unknown category directory {}", name);
                    continue;
                };
                if let Some(wanted) = categories {
                    if !wanted.contains(&category) {
                        continue;
                    }
                }

                for (_, article_path) in list_sorted(&path).await? {
                    if documents.len() >= max_documents {
                        break;
                    }
                    let raw = match tokio::fs::read(&article_path).await {
                        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                        Err(e) => {
                            tracing::warn!(
                                "Skipping unreadable article {}: {}",
                                article_path.display(),
                                e
                            );
                            continue;
                        }
                    };
                    match normalizer::normalize(&raw, category) {
                        Some(fields) => documents.push(fields),
                        None => too_short += 1,
                    }
                }
            }
        }

        tracing::info!(
            "Loaded {} documents from the corpus ({} dropped as too short)",
            documents.len(),
            too_short
        );
        Ok(documents)
    }
}

/// Directory entries sorted by name, as `(file_name, path)` pairs.
async fn list_sorted(dir: &Path) -> Result<Vec<(String, PathBuf)>, IndexError> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| IndexError::Corpus(format!("Failed to read '{}': {e}", dir.display())))?;

    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| IndexError::Corpus(format!("Failed to read '{}': {e}", dir.display())))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push((name, entry.path()));
    }
    entries.sort();
    Ok(entries)
}
