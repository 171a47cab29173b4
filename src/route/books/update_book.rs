use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    book::BookChanges,
    error::ErrorVerbosityProvider,
    extractor::{json::ApiJson, path::ApiPath},
    state::ApiState,
};

use super::{book_error, BookMessageResponse, BookResourceError, MessageResponse};

#[derive(Debug)]
pub struct UpdateBookResponse(pub BookMessageResponse);

impl IntoResponse for UpdateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

/// Update a book
///
/// Fields that are missing or empty keep their current value.
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Id of the book"),
    ),
    request_body = BookChanges,
    responses(
        (status = 200, description = "Book updated", body = BookMessageResponse),
        (status = 404, description = "Book not found", body = MessageResponse),
    )
)]
#[tracing::instrument(name = "update_book", skip(state, changes))]
pub async fn update_book(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<BookChanges>,
) -> Result<UpdateBookResponse, BookResourceError> {
    let book = state
        .books()
        .update(id, changes)
        .await
        .map_err(book_error(state.error_verbosity()))?;

    Ok(UpdateBookResponse(BookMessageResponse {
        message: "Book updated successfully".to_string(),
        book,
    }))
}
