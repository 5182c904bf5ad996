//! HTTP error responses.
//!
//! Every failure is rendered as `{"error": "<message>"}` with a 4xx status for
//! caller mistakes and 500 otherwise.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parcelscope_core::Error;
use serde::Serialize;

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body was missing or not the expected JSON.
    #[error("invalid request body: {0}")]
    BadBody(String),

    #[error(transparent)]
    Core(#[from] Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadBody(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Core(Error::InvalidInput(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Core(e) if e.is_client_error() => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Core(e) => {
                tracing::error!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
