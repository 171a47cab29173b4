use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    book::Book,
    error::{ErrorResponse, ErrorTypeProvider, ErrorVerbosity},
    resource::BookError,
};

pub mod app;
pub mod create_book;
pub mod delete_book;
pub mod get_book;
pub mod list_books;
pub mod update_book;

/// Response with a message and the affected book.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookMessageResponse {
    #[schema(example = "Book created successfully")]
    pub message: String,
    pub book: Book,
}

/// Response with a message only. Also the body of every error.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Book not found")]
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "error_type")]
pub enum BookErrorType {
    NotFound {
        #[serde(skip)]
        id: i64,
    },
    MissingFields {
        #[serde(skip)]
        fields: Vec<String>,
    },
    Persistence {
        #[serde(skip)]
        reason: String,
    },
    IdsExhausted,
}

#[derive(Debug, Serialize)]
pub struct BookErrorContext {
    pub reason: String,
}

impl From<BookError> for BookErrorType {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound(id) => BookErrorType::NotFound { id },
            BookError::Validation(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|field| field.to_string())
                    .collect();
                fields.sort();

                BookErrorType::MissingFields { fields }
            }
            BookError::Persistence(err) => BookErrorType::Persistence {
                reason: err.to_string(),
            },
            BookError::IdsExhausted => BookErrorType::IdsExhausted,
        }
    }
}

impl ErrorTypeProvider for BookErrorType {
    type Context = BookErrorContext;

    fn headers(&self) -> Option<HeaderMap> {
        None
    }

    fn status_code(&self) -> StatusCode {
        match self {
            BookErrorType::NotFound { .. } => StatusCode::NOT_FOUND,
            BookErrorType::MissingFields { .. } => StatusCode::BAD_REQUEST,
            BookErrorType::Persistence { .. } | BookErrorType::IdsExhausted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> &'static str {
        match self {
            BookErrorType::NotFound { .. } => "Book not found",
            BookErrorType::MissingFields { .. } => "Title and author are required",
            BookErrorType::Persistence { .. } => "Failed to persist books",
            BookErrorType::IdsExhausted => "Failed to assign book id",
        }
    }

    fn context(&self) -> Self::Context {
        match self {
            BookErrorType::NotFound { id } => BookErrorContext {
                reason: format!("Book with id {id} not found"),
            },
            BookErrorType::MissingFields { fields } => BookErrorContext {
                reason: format!("Missing or empty fields: {}", fields.join(", ")),
            },
            BookErrorType::Persistence { reason } => BookErrorContext {
                reason: reason.clone(),
            },
            BookErrorType::IdsExhausted => BookErrorContext {
                reason: String::from("No book id left to assign"),
            },
        }
    }
}

pub type BookResourceError = ErrorResponse<BookErrorType>;

/// Maps a [`BookError`] to the error response of the book routes.
pub fn book_error(verbosity: ErrorVerbosity) -> impl FnOnce(BookError) -> BookResourceError {
    move |err| ErrorResponse::new(verbosity, err.into())
}
