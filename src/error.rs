use axum::{
    http::{header::ALLOW, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// How much detail error responses carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ErrorVerbosity {
    /// Server returns an empty response with [`StatusCode::NO_CONTENT`] for all errors.
    None,
    /// Server returns only the appropriate status code.
    StatusCode,
    /// Server returns only the message with the appropriate status code.
    #[default]
    Message,
    /// Server returns the message and the error type with the appropriate status code.
    Type,
    /// Server returns the message, the error type and the error context with the appropriate status code.
    Full,
}

impl ErrorVerbosity {
    pub fn should_generate_error_reason(&self) -> bool {
        matches!(self, ErrorVerbosity::Full)
    }
}

pub trait ErrorVerbosityProvider {
    /// Returns the error verbosity.
    fn error_verbosity(&self) -> ErrorVerbosity;
}

/// Describes how an error type is rendered by [`ErrorResponse`].
pub trait ErrorTypeProvider {
    /// Rendered with [`ErrorVerbosity::Full`].
    type Context: Serialize;

    fn headers(&self) -> Option<HeaderMap>;

    fn status_code(&self) -> StatusCode;

    fn message(&self) -> &'static str;

    fn context(&self) -> Self::Context;
}

/// An error of type `T` rendered according to the [`ErrorVerbosity`].
///
/// | verbosity    | body                                       |
/// |--------------|--------------------------------------------|
/// | `None`       | none, status is `204`                      |
/// | `StatusCode` | none                                       |
/// | `Message`    | `{ message }`                              |
/// | `Type`       | `{ error_type, message }`                  |
/// | `Full`       | `{ error_type, message, context }`         |
#[derive(Debug)]
pub struct ErrorResponse<T> {
    verbosity: ErrorVerbosity,
    error: T,
}

impl<T> ErrorResponse<T> {
    pub fn new(verbosity: ErrorVerbosity, error: T) -> Self {
        Self { verbosity, error }
    }
}

#[derive(Serialize)]
struct MessageBody {
    message: &'static str,
}

#[derive(Serialize)]
struct TypedBody<'a, T, C> {
    #[serde(flatten)]
    error: &'a T,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<C>,
}

impl<T> IntoResponse for ErrorResponse<T>
where
    T: ErrorTypeProvider + Serialize,
{
    fn into_response(self) -> Response {
        let status_code = self.error.status_code();
        let headers = self.error.headers().unwrap_or_default();
        let message = self.error.message();

        match self.verbosity {
            ErrorVerbosity::None => (StatusCode::NO_CONTENT, headers).into_response(),
            ErrorVerbosity::StatusCode => (status_code, headers).into_response(),
            ErrorVerbosity::Message => {
                (status_code, headers, Json(MessageBody { message })).into_response()
            }
            ErrorVerbosity::Type => {
                let body = TypedBody::<T, T::Context> {
                    error: &self.error,
                    message,
                    context: None,
                };

                (status_code, headers, Json(body)).into_response()
            }
            ErrorVerbosity::Full => {
                let body = TypedBody {
                    error: &self.error,
                    message,
                    context: Some(self.error.context()),
                };

                (status_code, headers, Json(body)).into_response()
            }
        }
    }
}

/// Errors raised outside of the resource routes: extractors, middlewares and the router fallback.
pub type ApiError = ErrorResponse<ApiErrorType>;

#[derive(Debug, Serialize)]
#[serde(tag = "error_type")]
pub enum ApiErrorType {
    /// An unexpected failure, e.g. a response body that could not be buffered.
    InternalServerError {
        #[serde(skip)]
        reason: String,
    },
    /// The request body is not valid JSON for the route.
    Body {
        #[serde(skip)]
        reason: String,
        #[serde(skip)]
        expected_schema: Option<String>,
    },
    /// A path parameter could not be parsed.
    Path {
        #[serde(skip)]
        reason: String,
    },
    /// The route exists, but not for this method.
    MethodNotAllowed {
        #[serde(skip)]
        allow: Option<HeaderValue>,
    },
    /// No route matches the path.
    NotFound,
}

#[derive(Debug, Default, Serialize)]
pub struct ApiErrorContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_schema: Option<String>,
}

impl ErrorTypeProvider for ApiErrorType {
    type Context = ApiErrorContext;

    fn headers(&self) -> Option<HeaderMap> {
        match self {
            ApiErrorType::MethodNotAllowed { allow: Some(allow) } => {
                let mut headers = HeaderMap::new();
                headers.insert(ALLOW, allow.clone());

                Some(headers)
            }
            _ => None,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiErrorType::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorType::Body { .. } | ApiErrorType::Path { .. } => StatusCode::BAD_REQUEST,
            ApiErrorType::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorType::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiErrorType::InternalServerError { .. } => "An internal server error has occurred",
            ApiErrorType::Body { .. } => "Failed to parse request body",
            ApiErrorType::Path { .. } => "Failed to parse path parameters",
            ApiErrorType::MethodNotAllowed { .. } => "Method not allowed",
            ApiErrorType::NotFound => "The requested resource was not found",
        }
    }

    fn context(&self) -> Self::Context {
        match self {
            ApiErrorType::InternalServerError { reason } | ApiErrorType::Path { reason } => {
                ApiErrorContext {
                    reason: Some(reason.clone()),
                    ..Default::default()
                }
            }
            ApiErrorType::Body {
                reason,
                expected_schema,
            } => ApiErrorContext {
                reason: Some(reason.clone()),
                expected_schema: expected_schema.clone(),
            },
            ApiErrorType::MethodNotAllowed { .. } | ApiErrorType::NotFound => {
                ApiErrorContext::default()
            }
        }
    }
}

impl ApiError {
    pub fn internal_server_error<E: Into<anyhow::Error>>(verbosity: ErrorVerbosity, err: E) -> Self {
        let err: anyhow::Error = err.into();
        let reason = format!("{err:#}");
        tracing::error!(%reason, "Internal server error");

        Self::new(verbosity, ApiErrorType::InternalServerError { reason })
    }

    pub fn body(verbosity: ErrorVerbosity, reason: String, expected_schema: Option<String>) -> Self {
        Self::new(
            verbosity,
            ApiErrorType::Body {
                reason,
                expected_schema,
            },
        )
    }

    pub fn path(verbosity: ErrorVerbosity, reason: String) -> Self {
        Self::new(verbosity, ApiErrorType::Path { reason })
    }

    pub fn method_not_allowed(verbosity: ErrorVerbosity, allow: Option<HeaderValue>) -> Self {
        Self::new(verbosity, ApiErrorType::MethodNotAllowed { allow })
    }

    pub fn not_found(verbosity: ErrorVerbosity) -> Self {
        Self::new(verbosity, ApiErrorType::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    use super::*;

    async fn render(error: ApiError) -> (StatusCode, HeaderMap, Value) {
        let response = error.into_response();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let body = match bytes.is_empty() {
            true => Value::Null,
            false => serde_json::from_slice(&bytes).unwrap(),
        };

        (status, headers, body)
    }

    #[tokio::test]
    async fn status_code_verbosity_has_no_body() {
        let (status, _, body) = render(ApiError::not_found(ErrorVerbosity::StatusCode)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn full_verbosity_renders_body_context() {
        let error = ApiError::body(
            ErrorVerbosity::Full,
            "missing field `title`".to_string(),
            Some("type: object".to_string()),
        );

        let (status, _, body) = render(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "error_type": "Body",
                "message": "Failed to parse request body",
                "context": {
                    "reason": "missing field `title`",
                    "expected_schema": "type: object"
                }
            })
        );
    }

    #[tokio::test]
    async fn method_not_allowed_keeps_allow_header() {
        let allow = HeaderValue::from_static("GET,HEAD");

        let (status, headers, _) =
            render(ApiError::method_not_allowed(ErrorVerbosity::Message, Some(allow))).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers[ALLOW], "GET,HEAD");
    }
}
