use axum::async_trait;
use tokio::sync::RwLock;

use crate::book::Book;

use super::{BookStore, StoreError};

/// Keeps the collection in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    books: RwLock<Vec<Book>>,
}

impl InMemoryStore {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books: RwLock::new(books),
        }
    }
}

#[async_trait]
impl BookStore for InMemoryStore {
    async fn read_all(&self) -> Vec<Book> {
        self.books.read().await.clone()
    }

    async fn write_all(&self, books: &[Book]) -> Result<(), StoreError> {
        *self.books.write().await = books.to_vec();

        Ok(())
    }
}
