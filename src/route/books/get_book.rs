use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    book::Book,
    error::ErrorVerbosityProvider,
    extractor::path::ApiPath,
    state::ApiState,
};

use super::{book_error, BookResourceError, MessageResponse};

#[derive(Debug)]
pub struct GetBookResponse(pub Book);

impl IntoResponse for GetBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

/// Get a book by id
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Id of the book"),
    ),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "Book not found", body = MessageResponse),
    )
)]
#[tracing::instrument(name = "get_book", skip(state))]
pub async fn get_book(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<GetBookResponse, BookResourceError> {
    let book = state
        .books()
        .get(id)
        .await
        .map_err(book_error(state.error_verbosity()))?;

    Ok(GetBookResponse(book))
}
