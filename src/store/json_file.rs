use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use axum::async_trait;

use crate::book::Book;

use super::{BookStore, StoreError};

/// Keeps the collection as a pretty printed JSON array in a single file.
///
/// The file is re-read on every [`BookStore::read_all`] and rewritten on every [`BookStore::write_all`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(false)` only when the file is missing. Other I/O errors are returned.
    pub async fn exists(&self) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    async fn try_read_all(&self) -> Result<Vec<Book>, StoreError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let books = serde_json::from_str(&content)?;

        Ok(books)
    }

    fn temporary_path(&self) -> PathBuf {
        let mut file_name = self.path.file_name().unwrap_or_default().to_os_string();
        file_name.push(".tmp");

        self.path.with_file_name(file_name)
    }
}

#[async_trait]
impl BookStore for JsonFileStore {
    #[tracing::instrument(skip_all, fields(path = ?self.path))]
    async fn read_all(&self) -> Vec<Book> {
        match self.try_read_all().await {
            Ok(books) => {
                tracing::trace!(books = books.len(), "Read");

                books
            }
            Err(StoreError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("File does not exist, reading as empty");

                Vec::new()
            }
            Err(err) => {
                tracing::warn!(%err, "Failed to read books, reading as empty");

                Vec::new()
            }
        }
    }

    #[tracing::instrument(skip_all, fields(path = ?self.path, books = books.len()))]
    async fn write_all(&self, books: &[Book]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(books)?;

        let tmp = self.temporary_path();
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::trace!("Written");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books() -> Vec<Book> {
        vec![
            Book {
                id: 1,
                title: "O Pequeno Príncipe".to_string(),
                author: "Antoine de Saint-Exupéry".to_string(),
            },
            Book {
                id: 2,
                title: "Dom Casmurro".to_string(),
                author: "Machado de Assis".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("books.json"));

        assert!(!store.exists().await.unwrap());
        assert!(store.read_all().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);

        assert!(store.read_all().await.is_empty());
    }

    #[tokio::test]
    async fn write_then_read_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("books.json"));

        store.write_all(&books()).await.unwrap();

        assert_eq!(store.read_all().await, books());
        assert!(!store.temporary_path().exists());
    }

    #[tokio::test]
    async fn file_is_a_human_readable_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        let store = JsonFileStore::new(&path);

        store.write_all(&books()[..1]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(content.contains('\n'));
        assert_eq!(
            value,
            serde_json::json!([
                { "id": 1, "title": "O Pequeno Príncipe", "author": "Antoine de Saint-Exupéry" }
            ])
        );
    }

    #[tokio::test]
    async fn write_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let store = JsonFileStore::new(blocker.join("books.json"));

        assert!(matches!(
            store.write_all(&books()).await,
            Err(StoreError::Io(_))
        ));
    }

    #[tokio::test]
    async fn exists_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let store = JsonFileStore::new(blocker.join("books.json"));

        assert!(matches!(store.exists().await, Err(StoreError::Io(_))));
    }

    /// Two read-modify-write sequences against the store itself interleave
    /// and the first write is lost.
    #[tokio::test]
    async fn overlapping_writers_lose_an_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("books.json"));
        store.write_all(&books()).await.unwrap();

        let mut first = store.read_all().await;
        let mut second = store.read_all().await;

        first.retain(|book| book.id != 1);
        second.retain(|book| book.id != 2);

        store.write_all(&first).await.unwrap();
        store.write_all(&second).await.unwrap();

        let ids: Vec<_> = store.read_all().await.iter().map(|book| book.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
