use axum::{
    async_trait,
    extract::{FromRequestParts, Path as AxumPath},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::error::{ApiError, ErrorVerbosityProvider};

/// A Wrapper around [`axum::extract::Path`] that rejects with an [`ApiError`].
///
/// Used for the `{id}` segment of the book routes, so `/books/abc` is a bad request.
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Debug + Send,
    S: Send + Sync + ErrorVerbosityProvider,
{
    type Rejection = ApiError;

    #[tracing::instrument(name = "path_extractor", skip_all, fields(uri = %parts.uri))]
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        AxumPath::<T>::from_request_parts(parts, state)
            .await
            .map(|AxumPath(params)| {
                tracing::trace!(?params, "Extracted");

                ApiPath(params)
            })
            .map_err(|rejection| {
                tracing::warn!(reason = %rejection.body_text(), "Rejection");

                ApiError::path(state.error_verbosity(), rejection.body_text())
            })
    }
}
