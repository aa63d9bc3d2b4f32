//! HTTP error mapping.
//!
//! Every failure leaves the API as a JSON body of the form
//! `{"error": "<message>"}`. Client errors carry their message verbatim;
//! server-side failures are logged and answered with a generic message.

use std::borrow::Cow;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use diesel::result::DatabaseErrorKind;
use diesel_async::pooled_connection::bb8::RunError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::users::PasswordError;

/// Errors surfaced by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was malformed or failed validation.
    #[error("{0}")]
    BadRequest(Cow<'static, str>),
    /// No valid session accompanied the request.
    #[error("Unauthorized")]
    Unauthorized,
    /// The caller can see the target but may not change it.
    #[error("{0}")]
    Forbidden(&'static str),
    /// The target does not exist or the caller may not see it.
    #[error("{0}")]
    NotFound(&'static str),
    /// A dependent service is not running.
    #[error("{0}")]
    Unavailable(&'static str),
    /// A database query failed.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    /// No pooled connection could be obtained.
    #[error("connection pool error: {0}")]
    Pool(#[from] RunError),
    /// Password hashing or verification failed.
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl ApiError {
    /// Shorthand for a [`ApiError::BadRequest`] with a static message.
    #[must_use]
    pub const fn bad_request(message: &'static str) -> Self { Self::BadRequest(Cow::Borrowed(message)) }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Pool(_) | Self::Password(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() && !matches!(self, Self::Unavailable(_)) {
            error!(error = %self, "request failed");
            Cow::Borrowed("Internal server error")
        } else {
            Cow::Owned(self.to_string())
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::BadRequest(Cow::Owned(rejection.body_text())) }
}

/// Whether `err` reports a duplicate key, as raised when a concurrent request
/// inserted the same row after our existence check.
pub(crate) const fn is_unique_violation(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Result alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
