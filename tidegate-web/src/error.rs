//! HTTP mapping for request-path failures.
//!
//! Every stage of the request pipeline short-circuits with an [`ApiError`];
//! this module owns the translation to status codes and wire bodies. All
//! failures are terminal for their request. Anything unclassified collapses
//! to a generic 500 with details kept server-side.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tidegate_core::{AuthError, LibraryError, RangeError, RateLimitError, StreamError};
use tracing::{error, warn};

/// Terminal request outcomes with an HTTP representation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {detail}")]
    BadRequest { detail: String },

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("range header required")]
    RangeRequired,

    #[error("range not satisfiable")]
    RangeNotSatisfiable,

    #[error("rate limited")]
    Limited { retry_after: u64 },

    #[error("internal error")]
    Internal,
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            // Unknown categories are indistinguishable from missing files so
            // the existence of roots never leaks.
            LibraryError::UnknownCategory { .. } => ApiError::NotFound,
            LibraryError::OutsideRoot => ApiError::Forbidden,
            LibraryError::NotFound => ApiError::NotFound,
        }
    }
}

impl From<RangeError> for ApiError {
    fn from(err: RangeError) -> Self {
        match err {
            RangeError::Missing => ApiError::RangeRequired,
            RangeError::Unsatisfiable { .. } => ApiError::RangeNotSatisfiable,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(_: AuthError) -> Self {
        ApiError::Unauthorized
    }
}

impl From<RateLimitError> for ApiError {
    fn from(err: RateLimitError) -> Self {
        match err {
            RateLimitError::Limited { retry_after } => ApiError::Limited { retry_after },
        }
    }
}

impl From<StreamError> for ApiError {
    fn from(err: StreamError) -> Self {
        match err {
            // The file passed a stat moments ago; vanishing in between is a
            // plain not-found, not a server fault.
            StreamError::Open(_) => ApiError::NotFound,
            StreamError::Seek(e) => {
                error!("seek failed on resolved media file: {e}");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest { detail } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": [{ "msg": detail }] })),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized: Invalid or missing API key" })),
            )
                .into_response(),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "File not found").into_response(),
            ApiError::RangeRequired => {
                (StatusCode::RANGE_NOT_SATISFIABLE, "Range header required").into_response()
            }
            ApiError::RangeNotSatisfiable => {
                (StatusCode::RANGE_NOT_SATISFIABLE, "Range not satisfiable").into_response()
            }
            ApiError::Limited { retry_after } => {
                warn!("rate limit exceeded, retry after {retry_after}s");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("retry-after", retry_after.to_string())],
                    "Too many requests, please try again later.",
                )
                    .into_response()
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response(),
        }
    }
}
