use axum::{
    extract::State,
    http::{Method, Uri},
};

use crate::{
    error::{ApiError, ErrorVerbosityProvider},
    state::ApiState,
};

/// Router fallback for paths outside `/books` and the documentation routes.
pub async fn not_found(State(state): State<ApiState>, method: Method, uri: Uri) -> ApiError {
    tracing::warn!(%method, %uri, "No route");

    ApiError::not_found(state.error_verbosity())
}
