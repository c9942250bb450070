#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokengate::clock::ManualClock;
use tokengate::{ServerConfig, create_app, db::Database};
use tower::ServiceExt;

pub const JWT_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";
pub const ACCESS_TTL: u64 = 60;
pub const REFRESH_TTL: u64 = 600;
pub const START: u64 = 1_000_000;
pub const PASSWORD: &str = "correct-horse-battery";

/// App under test with handles on its database and clock.
pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub clock: ManualClock,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_rate(NonZeroU32::new(1000).unwrap()).await
    }

    pub async fn with_rate(login_rate_per_minute: NonZeroU32) -> Self {
        let db = Database::open(":memory:")
            .await
            .expect("Failed to open test database");
        let clock = ManualClock::new(START);
        let config = ServerConfig {
            db: db.clone(),
            jwt_secret: JWT_SECRET.to_vec(),
            access_ttl: ACCESS_TTL,
            refresh_ttl: REFRESH_TTL,
            login_rate_per_minute,
            clock: Arc::new(clock.clone()),
        };
        let router = create_app(&config).expect("Failed to create app");
        Self { router, db, clock }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/auth{}", path))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn signup(&self, username: &str) -> serde_json::Value {
        let response = self
            .post_json(
                "/signup",
                serde_json::json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        self.post_json(
            "/login",
            serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn refresh(&self, token: &str) -> Response<Body> {
        self.post_json("/refreshToken", serde_json::json!({ "token": token }))
            .await
    }

    pub async fn ping(&self, access_token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri("/api/v1/auth/ping");
        if let Some(token) = access_token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
