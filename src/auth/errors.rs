//! Rejections produced when a route demands an identity.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No valid identity on the request, whatever the reason.
    NotAuthenticated,
    /// The credential store failed while authenticating.
    StorageFailure,
}

/// Authentication rejection, rendered as JSON.
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
}

impl ApiAuthError {
    pub(super) fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    fn status_code(&self) -> StatusCode {
        match self.kind {
            AuthErrorKind::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AuthErrorKind::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self.kind {
            AuthErrorKind::NotAuthenticated => "Not authenticated",
            AuthErrorKind::StorageFailure => "Storage failure",
        }
    }

    fn kind_str(&self) -> &'static str {
        match self.kind {
            AuthErrorKind::NotAuthenticated => "not_authenticated",
            AuthErrorKind::StorageFailure => "storage_failure",
        }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
            kind: &'static str,
        }

        let mut response = (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
                kind: self.kind_str(),
            }),
        )
            .into_response();

        if self.kind == AuthErrorKind::NotAuthenticated {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
