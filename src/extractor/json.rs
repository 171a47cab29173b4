use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Json as AxumJson, Request},
    http::{header::CONTENT_TYPE, StatusCode},
};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::error::{ApiError, ErrorVerbosity, ErrorVerbosityProvider};

/// A Wrapper around [`axum::extract::Json`] that rejects with an [`ApiError`].
///
/// A request without `Content-Type` and without a body extracts as `T::default()`,
/// the same as sending `{}`. Any other non-JSON or malformed body is rejected.
///
/// With [`ErrorVerbosity::Full`] the rejection carries the expected body schema as YAML.
pub struct ApiJson<T>(pub T);

impl<T: JsonSchema> ApiJson<T> {
    fn rejection(verbosity: ErrorVerbosity, reason: String) -> ApiError {
        if !verbosity.should_generate_error_reason() {
            return ApiError::body(verbosity, reason, None);
        }

        match serde_yaml::to_string(&schema_for!(T)) {
            Ok(schema) => ApiError::body(verbosity, reason, Some(schema)),
            Err(err) => ApiError::internal_server_error(verbosity, err),
        }
    }

    fn reject(verbosity: ErrorVerbosity, status: StatusCode, reason: String) -> ApiError {
        tracing::warn!(%status, %reason, "Rejection");

        Self::rejection(verbosity, reason)
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + JsonSchema + Default + Debug + Send,
    S: Send + Sync + ErrorVerbosityProvider,
{
    type Rejection = ApiError;

    #[tracing::instrument(name = "json_extractor", skip_all)]
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let verbosity = state.error_verbosity();

        if !req.headers().contains_key(CONTENT_TYPE) {
            let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
                Self::reject(verbosity, rejection.status(), rejection.body_text())
            })?;

            if !bytes.is_empty() {
                return Err(Self::reject(
                    verbosity,
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    String::from("Expected request with `Content-Type: application/json`"),
                ));
            }

            let body = T::default();

            tracing::trace!(?body, "Empty body");

            return Ok(ApiJson(body));
        }

        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(body)) => {
                tracing::trace!(?body, "Extracted");

                Ok(ApiJson(body))
            }
            Err(rejection) => Err(Self::reject(
                verbosity,
                rejection.status(),
                rejection.body_text(),
            )),
        }
    }
}
