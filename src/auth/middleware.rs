//! Per-request authentication middleware.
//!
//! Establishes or withholds an [`AuthContext`]; it never rejects a request.
//! Routes that need an identity use the [`super::Auth`] extractor.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

use super::bearer::get_bearer_token;
use super::state::HasAuthBackend;
use super::types::{AuthContext, AuthUnavailable};

/// Outcome of authenticating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Anonymous,
    Authenticated(AuthContext),
    /// The credential store failed; neither trusted nor anonymous.
    Unavailable,
}

/// Resolve the identity behind the request's bearer token, if any.
pub async fn resolve_identity<S>(headers: &HeaderMap, state: &S) -> Resolution
where
    S: HasAuthBackend + Sync,
{
    let Some(token) = get_bearer_token(headers) else {
        return Resolution::Anonymous;
    };

    let subject = match state.jwt().extract_subject(token) {
        Ok(subject) => subject,
        Err(e) => {
            debug!(error = %e, "Ignoring unverifiable bearer token");
            return Resolution::Anonymous;
        }
    };

    let identity = match state.db().users().get_by_username(&subject).await {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            debug!(subject = %subject, "Bearer token subject has no identity");
            return Resolution::Anonymous;
        }
        Err(e) => {
            error!(error = %e, "Failed to look up identity for bearer token");
            return Resolution::Unavailable;
        }
    };

    if state.jwt().validate(token, Some(&identity.username)) {
        Resolution::Authenticated(AuthContext::from_identity(&identity))
    } else {
        debug!(subject = %subject, "Bearer token failed validation");
        Resolution::Anonymous
    }
}

/// Attach an [`AuthContext`] (or [`AuthUnavailable`]) to the request
/// extensions, then run the rest of the stack.
/// A request that already carries either is passed through untouched.
pub async fn authenticate<S>(State(state): State<S>, mut request: Request, next: Next) -> Response
where
    S: HasAuthBackend + Clone + Send + Sync + 'static,
{
    let extensions = request.extensions();
    let already_resolved =
        extensions.get::<AuthContext>().is_some() || extensions.get::<AuthUnavailable>().is_some();

    if !already_resolved {
        let resolution = resolve_identity(request.headers(), &state).await;
        match resolution {
            Resolution::Authenticated(context) => {
                request.extensions_mut().insert(context);
            }
            Resolution::Unavailable => {
                request.extensions_mut().insert(AuthUnavailable);
            }
            Resolution::Anonymous => {}
        }
    }

    next.run(request).await
}
