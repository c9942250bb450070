//! Rate limiting for credential endpoints.
//!
//! Uses a token bucket algorithm with per-IP tracking to slow down password guessing.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc};
use tracing::warn;

use crate::api::ApiError;

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Key used when the connection address is not known (e.g. in-process tests).
const UNKNOWN_CLIENT: &str = "unknown";

/// Rate limiting configuration for the login and signup endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    pub login: Arc<IpLimiter>,
    pub signup: Arc<IpLimiter>,
}

impl RateLimitConfig {
    /// Both endpoints allow `per_minute` requests per IP, bursting up to the same amount.
    pub fn new(per_minute: NonZeroU32) -> Self {
        Self {
            login: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
            signup: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
        }
    }
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

async fn check(limiter: &IpLimiter, request: Request, next: Next, message: &str) -> Response {
    let ip = client_key(&request);
    match limiter.check_key(&ip) {
        Ok(_) => next.run(request).await,
        Err(_) => {
            warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
            ApiError::TooManyRequests(message.to_string()).into_response()
        }
    }
}

/// Middleware for rate limiting login attempts.
pub async fn rate_limit_login(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    check(
        &config.login,
        request,
        next,
        "Too many login attempts. Please wait before trying again.",
    )
    .await
}

/// Middleware for rate limiting signups.
pub async fn rate_limit_signup(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    check(
        &config.signup,
        request,
        next,
        "Too many signup attempts. Please wait before trying again.",
    )
    .await
}
