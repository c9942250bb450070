//! Account endpoints.
//!
//! - POST `/signup` - Create an identity and log it in
//! - GET `/ping` - Return the caller's user id (requires a bearer token)

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::AuthApiState;
use super::error::{ApiError, ResultExt};
use crate::auth::{Auth, hash_password};
use crate::error::AuthError;

const MAX_USERNAME_LENGTH: usize = 32;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 1024;

#[derive(Deserialize)]
pub(super) struct SignupRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupResponse {
    access_token: String,
    token: String,
    user_id: String,
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::bad_request("Username cannot be empty"));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Username cannot be longer than {} characters",
            MAX_USERNAME_LENGTH
        )));
    }

    // Only allow alphanumeric and underscores
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ApiError::bad_request(
            "Username can only contain letters, numbers, and underscores",
        ));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::bad_request("Password is too long"));
    }

    Ok(())
}

pub(super) async fn signup(
    State(state): State<AuthApiState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.trim();
    validate_username(username)?;
    validate_password(&payload.password)?;

    let users = state.db.users();

    let taken = users
        .get_by_username(username)
        .await
        .db_err("Failed to check username availability")?
        .is_some();
    if taken {
        return Err(AuthError::AlreadyExists.into());
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to create user")
    })?;

    let user_id = uuid::Uuid::new_v4().to_string();

    // A concurrent signup can still take the name between the check and the insert
    let id = match users.create(&user_id, username, &password_hash).await {
        Ok(id) => id,
        Err(e) if e.as_database_error().is_some_and(|e| e.is_unique_violation()) => {
            return Err(AuthError::AlreadyExists.into());
        }
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    };

    let identity = users
        .get_by_id(id)
        .await
        .db_err("Failed to load created user")?
        .ok_or_else(|| ApiError::internal("Created user disappeared"))?;

    info!(username = %identity.username, user_id = %identity.user_id, "User signed up");

    let refresh = state.refresh.create(&identity).await?;
    let access = state.jwt.issue(&identity.username).map_err(AuthError::from)?;

    Ok(Json(SignupResponse {
        access_token: access.token,
        token: refresh.token,
        user_id: identity.user_id,
    }))
}

pub(super) async fn ping(Auth(context): Auth) -> impl IntoResponse {
    context.user_id
}
