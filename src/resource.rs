use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use tokio::sync::Mutex;
use validator::{Validate, ValidationErrors};

use crate::{
    book::{Book, BookChanges, NewBook},
    store::{BookStore, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("Book with id {0} not found")]
    NotFound(i64),
    #[error("Invalid book: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Failed to persist books: {0}")]
    Persistence(#[from] StoreError),
    #[error("No book id left to assign")]
    IdsExhausted,
}

/// CRUD operations on the book collection.
///
/// Every operation reads the whole collection from the store. Mutations are
/// serialized and write the whole collection back exactly once.
pub struct BookResource {
    store: Arc<dyn BookStore>,
    /// Last issued id. Held for the whole read-modify-write of every mutation.
    last_id: Mutex<i64>,
}

impl BookResource {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self {
            store,
            last_id: Mutex::new(0),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn list(&self) -> Vec<Book> {
        self.store.read_all().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Book, BookError> {
        self.store
            .read_all()
            .await
            .into_iter()
            .find(|book| book.id == id)
            .ok_or(BookError::NotFound(id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, new_book: NewBook) -> Result<Book, BookError> {
        let mut last_id = self.last_id.lock().await;
        let mut books = self.store.read_all().await;

        let Some(id) = next_id(*last_id, &books) else {
            tracing::error!(last_id = *last_id, "No book id left to assign");

            return Err(BookError::IdsExhausted);
        };

        let book = Book {
            id,
            title: new_book.title.unwrap_or_default(),
            author: new_book.author.unwrap_or_default(),
        };

        if let Err(errors) = book.validate() {
            tracing::warn!(?errors, "Rejected book");

            return Err(errors.into());
        }

        books.push(book.clone());
        self.persist(&books).await?;
        *last_id = book.id;

        tracing::debug!(id = book.id, "Created");

        Ok(book)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: i64, changes: BookChanges) -> Result<Book, BookError> {
        let _last_id = self.last_id.lock().await;
        let mut books = self.store.read_all().await;

        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(BookError::NotFound(id))?;

        changes.apply(book);
        let book = book.clone();

        self.persist(&books).await?;

        tracing::debug!("Updated");

        Ok(book)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), BookError> {
        let _last_id = self.last_id.lock().await;
        let mut books = self.store.read_all().await;

        let len = books.len();
        books.retain(|book| book.id != id);

        if books.len() == len {
            return Err(BookError::NotFound(id));
        }

        self.persist(&books).await?;

        tracing::debug!("Deleted");

        Ok(())
    }

    async fn persist(&self, books: &[Book]) -> Result<(), BookError> {
        self.store.write_all(books).await.map_err(|err| {
            tracing::error!(%err, "Failed to persist books");

            BookError::Persistence(err)
        })
    }
}

/// Milliseconds since the Unix epoch, bumped past every id issued or stored so far.
///
/// `None` once an id of `i64::MAX` has been issued or stored.
fn next_id(last_id: i64, books: &[Book]) -> Option<i64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default();

    let max_stored = books.iter().map(|book| book.id).max().unwrap_or(0);

    let after_issued = last_id.checked_add(1)?;
    let after_stored = max_stored.checked_add(1)?;

    Some(now.max(after_issued).max(after_stored))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::store::{InMemoryStore, JsonFileStore};

    fn seeded() -> (Arc<InMemoryStore>, BookResource) {
        let store = Arc::new(InMemoryStore::new(vec![Book {
            id: 1,
            title: "A".to_string(),
            author: "X".to_string(),
        }]));

        (store.clone(), BookResource::new(store))
    }

    fn new_book(title: &str, author: &str) -> NewBook {
        NewBook {
            title: Some(title.to_string()),
            author: Some(author.to_string()),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (_, resource) = seeded();

        let created = resource.create(new_book("B", "Y")).await.unwrap();
        let fetched = resource.get(created.id).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(resource.list().await.len(), 2);
    }

    #[tokio::test]
    async fn create_without_author_is_rejected_and_not_stored() {
        let (store, resource) = seeded();

        let result = resource
            .create(NewBook {
                title: Some("B".to_string()),
                author: None,
            })
            .await;

        assert!(matches!(result, Err(BookError::Validation(_))));
        assert_eq!(store.read_all().await.len(), 1);
    }

    #[tokio::test]
    async fn rapid_creates_get_distinct_increasing_ids() {
        let (_, resource) = seeded();

        let mut ids = Vec::new();
        for i in 0..50 {
            let book = resource
                .create(new_book(&format!("T{i}"), "Y"))
                .await
                .unwrap();
            ids.push(book.id);
        }

        let distinct: HashSet<_> = ids.iter().collect();
        assert_eq!(distinct.len(), ids.len());
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn ids_are_not_reissued_after_delete() {
        let (_, resource) = seeded();

        let first = resource.create(new_book("B", "Y")).await.unwrap();
        resource.delete(first.id).await.unwrap();
        let second = resource.create(new_book("C", "Z")).await.unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn next_id_exceeds_stored_ids_from_the_future() {
        let far_future = i64::MAX - 1;
        let books = vec![Book {
            id: far_future,
            title: "A".to_string(),
            author: "X".to_string(),
        }];

        assert_eq!(next_id(0, &books), Some(i64::MAX));
        assert_eq!(next_id(i64::MAX, &[]), None);
    }

    #[tokio::test]
    async fn create_after_max_id_is_rejected_and_not_stored() {
        let store = Arc::new(InMemoryStore::new(vec![Book {
            id: i64::MAX,
            title: "A".to_string(),
            author: "X".to_string(),
        }]));
        let resource = BookResource::new(store.clone());

        let err = resource.create(new_book("B", "Y")).await.unwrap_err();

        assert!(matches!(err, BookError::IdsExhausted));

        let books = store.read_all().await;
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, i64::MAX);
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let (_, resource) = seeded();

        let updated = resource
            .update(
                1,
                BookChanges {
                    title: None,
                    author: Some("Z".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "A");
        assert_eq!(updated.author, "Z");
        assert_eq!(resource.get(1).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found_and_do_not_mutate() {
        let (store, resource) = seeded();
        let before = store.read_all().await;

        assert!(matches!(resource.get(999).await, Err(BookError::NotFound(999))));
        assert!(matches!(
            resource.update(999, BookChanges::default()).await,
            Err(BookError::NotFound(999))
        ));
        assert!(matches!(resource.delete(999).await, Err(BookError::NotFound(999))));

        assert_eq!(store.read_all().await, before);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_and_keeps_order() {
        let (_, resource) = seeded();
        let b = resource.create(new_book("B", "Y")).await.unwrap();
        let c = resource.create(new_book("C", "Z")).await.unwrap();

        resource.delete(b.id).await.unwrap();

        let ids: Vec<_> = resource.list().await.iter().map(|book| book.id).collect();
        assert_eq!(ids, vec![1, c.id]);
    }

    #[tokio::test]
    async fn concurrent_creates_are_all_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("books.json")));
        let resource = Arc::new(BookResource::new(store.clone()));

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let resource = resource.clone();

                tokio::spawn(async move {
                    resource
                        .create(new_book(&format!("T{i}"), "Y"))
                        .await
                        .unwrap()
                })
            })
            .collect();

        for handle in futures::future::join_all(handles).await {
            handle.unwrap();
        }

        assert_eq!(store.read_all().await.len(), 20);
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let resource = BookResource::new(Arc::new(JsonFileStore::new(blocker.join("books.json"))));

        assert!(matches!(
            resource.create(new_book("B", "Y")).await,
            Err(BookError::Persistence(_))
        ));
    }
}
