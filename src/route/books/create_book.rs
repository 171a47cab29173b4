use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    book::NewBook,
    error::ErrorVerbosityProvider,
    extractor::json::ApiJson,
    state::ApiState,
};

use super::{book_error, BookMessageResponse, BookResourceError, MessageResponse};

#[derive(Debug)]
pub struct CreateBookResponse(pub BookMessageResponse);

impl IntoResponse for CreateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// Create a book
///
/// The id is assigned by the server. `title` and `author` must be present and non-empty.
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = BookMessageResponse),
        (status = 400, description = "Title or author missing", body = MessageResponse),
        (status = 500, description = "Books could not be persisted or no id is left", body = MessageResponse),
    )
)]
#[tracing::instrument(name = "create_book", skip_all)]
pub async fn create_book(
    State(state): State<ApiState>,
    ApiJson(new_book): ApiJson<NewBook>,
) -> Result<CreateBookResponse, BookResourceError> {
    let book = state
        .books()
        .create(new_book)
        .await
        .map_err(book_error(state.error_verbosity()))?;

    Ok(CreateBookResponse(BookMessageResponse {
        message: "Book created successfully".to_string(),
        book,
    }))
}
