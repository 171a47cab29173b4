use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{error::ErrorVerbosityProvider, extractor::path::ApiPath, state::ApiState};

use super::{book_error, BookResourceError, MessageResponse};

#[derive(Debug)]
pub struct DeleteBookResponse(pub MessageResponse);

impl IntoResponse for DeleteBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Id of the book"),
    ),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found", body = MessageResponse),
    )
)]
#[tracing::instrument(name = "delete_book", skip(state))]
pub async fn delete_book(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<DeleteBookResponse, BookResourceError> {
    state
        .books()
        .delete(id)
        .await
        .map_err(book_error(state.error_verbosity()))?;

    Ok(DeleteBookResponse(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
