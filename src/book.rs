use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A book as stored in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct Book {
    /// Assigned on creation, never changes.
    #[schema(example = 1)]
    pub id: i64,
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "Dom Casmurro")]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    #[schema(example = "Machado de Assis")]
    pub author: String,
}

/// Request body to create a book.
///
/// Both fields are required, but they are checked on the constructed [`Book`] rather than here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct NewBook {
    #[schema(example = "O Pequeno Príncipe")]
    pub title: Option<String>,
    #[schema(example = "Antoine de Saint-Exupéry")]
    pub author: Option<String>,
}

/// Request body to update a book.
///
/// Missing and empty fields keep their previous values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl BookChanges {
    /// Applies the changes to `book`. Empty strings count as not supplied.
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title.filter(|title| !title.is_empty()) {
            book.title = title;
        }

        if let Some(author) = self.author.filter(|author| !author.is_empty()) {
            book.author = author;
        }
    }
}
