mod error;
mod tokens;
mod users;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::rate_limit::{RateLimitConfig, rate_limit_login, rate_limit_signup};
use crate::refresh::RefreshTokenManager;

pub use error::{ApiError, ResultExt};

/// Path the auth API is nested under.
pub const API_PATH: &str = "/api/v1/auth";

/// Shared state for every auth endpoint.
#[derive(Clone)]
pub struct AuthApiState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub refresh: RefreshTokenManager,
    pub rate_limit: Arc<RateLimitConfig>,
}

impl_has_auth_backend!(AuthApiState);

/// Create the API router. Authentication middleware is applied by the caller.
pub fn create_api_router(state: AuthApiState) -> Router {
    let login_router = Router::new()
        .route("/login", post(tokens::login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit.clone(),
            rate_limit_login,
        ));

    let signup_router = Router::new()
        .route("/signup", post(users::signup))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit.clone(),
            rate_limit_signup,
        ));

    Router::new()
        .route("/refreshToken", post(tokens::refresh_token))
        .route("/ping", get(users::ping))
        .with_state(state)
        .merge(login_router)
        .merge(signup_router)
}
