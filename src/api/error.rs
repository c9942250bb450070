//! Shared error handling for API endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::error::AuthError;

/// Extension trait for concise error mapping on Results.
pub trait ResultExt<T> {
    fn db_err(self, msg: &str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn db_err(self, msg: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::db_error(msg, e))
    }
}

/// API error type with automatic response conversion.
/// Every response carries a stable `kind` next to the human-readable message.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(&'static str, String),
    Conflict(String),
    TooManyRequests(String),
    Internal(&'static str, String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal("internal_error", msg.into())
    }

    pub fn db_error(context: &str, e: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, e);
        Self::Internal("storage_failure", "Storage failure".into())
    }

    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ApiError::Unauthorized(kind, _) => (StatusCode::UNAUTHORIZED, *kind),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "already_exists"),
            ApiError::TooManyRequests(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            ApiError::Internal(kind, _) => (StatusCode::INTERNAL_SERVER_ERROR, *kind),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let kind = e.kind();
        match e {
            AuthError::AuthenticationFailure
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::IdentityNotFound => ApiError::Unauthorized(kind, e.to_string()),
            AuthError::AlreadyExists => ApiError::Conflict(e.to_string()),
            AuthError::Storage(ref inner) => ApiError::db_error("Storage failure", inner),
            AuthError::Issuance(ref inner) => {
                error!("Failed to issue token: {}", inner);
                ApiError::Internal(kind, "Failed to issue token".into())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(_, msg)
            | ApiError::Conflict(msg)
            | ApiError::TooManyRequests(msg)
            | ApiError::Internal(_, msg) => msg,
        };
        (
            status,
            Json(ErrorResponse {
                error: message,
                kind,
            }),
        )
            .into_response()
    }
}
