//! Axum extractors reading the identity attached by [`super::authenticate`].
//!
//! These only read request extensions. Trust decisions were already made by
//! the middleware; here we just decide whether the route can run.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::{ApiAuthError, AuthErrorKind};
use super::types::{AuthContext, AuthUnavailable};

/// Extractor for endpoints that require an identity.
/// Rejects with 401 when the request is anonymous.
pub struct Auth(pub AuthContext);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match MaybeAuth::from_request_parts(parts, state).await? {
            MaybeAuth(Some(context)) => Ok(Auth(context)),
            MaybeAuth(None) => Err(ApiAuthError::new(AuthErrorKind::NotAuthenticated)),
        }
    }
}

/// Optional authentication extractor for endpoints that also serve anonymous callers.
/// Only fails when the credential store was unavailable.
pub struct MaybeAuth(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parts.extensions.get::<AuthUnavailable>().is_some() {
            return Err(ApiAuthError::new(AuthErrorKind::StorageFailure));
        }
        Ok(MaybeAuth(parts.extensions.get::<AuthContext>().cloned()))
    }
}
