pub mod api;
pub mod auth;
pub mod cli;
pub mod clock;
pub mod db;
pub mod error;
pub mod jwt;
pub mod rate_limit;
pub mod refresh;

use api::{API_PATH, AuthApiState, create_api_router};
use auth::authenticate;
use axum::{Router, middleware};
use clock::Clock;
use db::Database;
use error::ConfigError;
use jwt::JwtConfig;
use rate_limit::RateLimitConfig;
use refresh::RefreshTokenManager;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// HMAC secret for signing access tokens, at least 32 bytes
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime in seconds
    pub access_ttl: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl: u64,
    /// Login and signup attempts allowed per client IP per minute
    pub login_rate_per_minute: NonZeroU32,
    /// Time source for issuance and expiry checks
    pub clock: Arc<dyn Clock>,
}

/// Create the application router with the given configuration.
/// Fails if the signing secret or a token lifetime is unusable.
pub fn create_app(config: &ServerConfig) -> Result<Router, ConfigError> {
    let jwt = Arc::new(JwtConfig::new(
        &config.jwt_secret,
        config.access_ttl,
        config.clock.clone(),
    )?);

    let state = AuthApiState {
        db: config.db.clone(),
        jwt,
        refresh: RefreshTokenManager::new(
            config.db.clone(),
            config.clock.clone(),
            config.refresh_ttl,
        )?,
        rate_limit: Arc::new(RateLimitConfig::new(config.login_rate_per_minute)),
    };

    let api_router = create_api_router(state.clone()).layer(middleware::from_fn_with_state(
        state,
        authenticate::<AuthApiState>,
    ));

    Ok(Router::new().nest(API_PATH, api_router))
}

/// Run the server on the given listener. This function blocks until the server exits.
/// An unusable configuration is reported as `InvalidInput` before serving starts.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
