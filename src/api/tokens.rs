//! Token issuance endpoints.
//!
//! - POST `/login` - Exchange username and password for an access and refresh token
//! - POST `/refreshToken` - Exchange a live refresh token for a new access token

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AuthApiState;
use super::error::{ApiError, ResultExt};
use crate::auth::{verify_password, verify_password_unknown_user};
use crate::error::AuthError;

#[derive(Deserialize)]
pub(super) struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub(super) struct RefreshRequest {
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
    token: String,
}

/// Authenticate with a password. A successful login replaces the refresh
/// token the identity held before.
pub(super) async fn login(
    State(state): State<AuthApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.trim();
    let identity = state
        .db
        .users()
        .get_by_username(username)
        .await
        .db_err("Failed to look up user")?;

    let Some(identity) = identity else {
        verify_password_unknown_user(&payload.password);
        debug!(username = %username, "Login for unknown user");
        return Err(AuthError::AuthenticationFailure.into());
    };

    if !verify_password(&payload.password, &identity.password_hash) {
        debug!(username = %identity.username, "Login with wrong password");
        return Err(AuthError::AuthenticationFailure.into());
    }

    let refresh = state.refresh.create(&identity).await?;
    let access = state.jwt.issue(&identity.username).map_err(AuthError::from)?;

    Ok(Json(TokenResponse {
        access_token: access.token,
        token: refresh.token,
    }))
}

/// Issue a fresh access token for the owner of a live refresh token.
/// The refresh token itself is returned unchanged.
pub(super) async fn refresh_token(
    State(state): State<AuthApiState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .refresh
        .find_by_value(&payload.token)
        .await?
        .ok_or(AuthError::TokenInvalid)?;

    let record = state.refresh.verify_not_expired(record).await?;

    let identity = state
        .db
        .users()
        .get_by_id(record.user_id)
        .await
        .db_err("Failed to look up token owner")?
        .ok_or(AuthError::IdentityNotFound)?;

    let access = state.jwt.issue(&identity.username).map_err(AuthError::from)?;

    Ok(Json(TokenResponse {
        access_token: access.token,
        token: record.token,
    }))
}
