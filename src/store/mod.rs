use std::{path::PathBuf, sync::Arc};

use axum::async_trait;
use serde::Deserialize;

use crate::book::Book;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whole-collection persistence for books.
///
/// Implementations do not coordinate concurrent callers: two overlapping
/// read-modify-write sequences may lose one of the writes.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Reads the full collection.
    ///
    /// A missing, unreadable or corrupt collection is read as empty.
    async fn read_all(&self) -> Vec<Book>;

    /// Replaces the full collection.
    async fn write_all(&self, books: &[Book]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Books are kept in a single JSON file.
    JsonFile {
        path: PathBuf,
        /// Written to `path` if the file does not exist yet.
        #[serde(default)]
        seed: Vec<Book>,
    },
    /// Books are kept in memory and lost on shutdown.
    Memory {
        #[serde(default)]
        seed: Vec<Book>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::JsonFile {
            path: PathBuf::from("books.json"),
            seed: Vec::new(),
        }
    }
}

impl StoreConfig {
    #[tracing::instrument(skip_all)]
    pub async fn build(self) -> Result<Arc<dyn BookStore>, StoreError> {
        match self {
            StoreConfig::JsonFile { path, seed } => {
                let store = JsonFileStore::new(path);

                if !seed.is_empty() && !store.exists().await? {
                    tracing::info!(path = ?store.path(), books = seed.len(), "Seeding store");

                    store.write_all(&seed).await?;
                }

                Ok(Arc::new(store))
            }
            StoreConfig::Memory { seed } => Ok(Arc::new(InMemoryStore::new(seed))),
        }
    }
}
