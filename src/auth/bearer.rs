//! Bearer token parsing for the Authorization header.

use axum::http::{HeaderMap, header};

const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from `Authorization: Bearer <token>`.
/// The scheme matches case-insensitively. Returns None for a missing header,
/// another scheme, or an empty token.
pub fn get_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
