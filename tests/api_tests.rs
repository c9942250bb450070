mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{PASSWORD, TestApp, body_json, body_text};
use std::collections::BTreeSet;
use std::num::NonZeroU32;
use tokengate::auth::AuthContext;

#[tokio::test]
async fn test_signup_success() {
    let app = TestApp::new().await;

    let json = app.signup("alice").await;

    assert!(json["accessToken"].as_str().is_some());
    assert!(json["token"].as_str().is_some());
    let user_id = json["userId"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(user_id).is_ok());

    let identity = app.db.users().get_by_username("alice").await.unwrap().unwrap();
    assert_eq!(identity.user_id, user_id);
    assert_ne!(identity.password_hash, PASSWORD);
}

#[tokio::test]
async fn test_signup_duplicate_username() {
    let app = TestApp::new().await;
    app.signup("alice").await;

    let response = app
        .post_json(
            "/signup",
            serde_json::json!({ "username": "alice", "password": "another-password" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["kind"], "already_exists");
}

#[tokio::test]
async fn test_signup_invalid_username() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/signup",
            serde_json::json!({ "username": "alice@example", "password": PASSWORD }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["kind"], "invalid_request");
}

#[tokio::test]
async fn test_signup_short_password() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/signup",
            serde_json::json!({ "username": "alice", "password": "short" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.db.users().get_by_username("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;
    app.signup("alice").await;

    let response = app.login("alice", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["accessToken"].as_str().is_some());
    assert!(json["token"].as_str().is_some());
    assert!(json.get("userId").is_none());
}

#[tokio::test]
async fn test_login_trims_username_like_signup() {
    let app = TestApp::new().await;
    let response = app
        .post_json(
            "/signup",
            serde_json::json!({ "username": " carol ", "password": PASSWORD }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.login(" carol ", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.login("carol", PASSWORD).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;
    app.signup("alice").await;

    let response = app.login("alice", "wrong-password").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["kind"], "authentication_failure");
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let app = TestApp::new().await;

    let response = app.login("nobody", PASSWORD).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["kind"], "authentication_failure");
    assert_eq!(app.db.tokens().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_ping_returns_user_id() {
    let app = TestApp::new().await;
    let json = app.signup("alice").await;

    let response = app.ping(json["accessToken"].as_str()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, json["userId"].as_str().unwrap());
}

#[tokio::test]
async fn test_ping_with_lowercase_scheme() {
    let app = TestApp::new().await;
    let json = app.signup("alice").await;

    let request = Request::builder()
        .uri("/api/v1/auth/ping")
        .header(
            header::AUTHORIZATION,
            format!("bearer {}", json["accessToken"].as_str().unwrap()),
        )
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, json["userId"].as_str().unwrap());
}

#[tokio::test]
async fn test_ping_without_header() {
    let app = TestApp::new().await;

    let response = app.ping(None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    assert_eq!(body_json(response).await["kind"], "not_authenticated");
}

#[tokio::test]
async fn test_ping_with_garbage_token() {
    let app = TestApp::new().await;

    let response = app.ping(Some("not-a-token")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ping_with_expired_access_token() {
    let app = TestApp::new().await;
    let json = app.signup("alice").await;
    let access_token = json["accessToken"].as_str().unwrap();

    app.clock.advance(30);
    assert_eq!(app.ping(Some(access_token)).await.status(), StatusCode::OK);

    app.clock.advance(31);
    assert_eq!(
        app.ping(Some(access_token)).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_preexisting_context_is_kept() {
    let app = TestApp::new().await;
    let json = app.signup("alice").await;

    let mut request = Request::builder()
        .uri("/api/v1/auth/ping")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", json["accessToken"].as_str().unwrap()),
        )
        .body(Body::empty())
        .unwrap();
    request.extensions_mut().insert(AuthContext {
        user_id: "already-resolved".to_string(),
        username: "someone".to_string(),
        authorities: BTreeSet::new(),
    });

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "already-resolved");
}

#[tokio::test]
async fn test_storage_failure_on_protected_route() {
    let app = TestApp::new().await;
    let json = app.signup("alice").await;

    app.db.pool().close().await;
    let response = app.ping(json["accessToken"].as_str()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["kind"], "storage_failure");
}

#[tokio::test]
async fn test_storage_failure_on_login() {
    let app = TestApp::new().await;

    app.db.pool().close().await;
    let response = app.login("alice", PASSWORD).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["kind"], "storage_failure");
}

#[tokio::test]
async fn test_login_rate_limited() {
    let app = TestApp::with_rate(NonZeroU32::new(2).unwrap()).await;

    for _ in 0..2 {
        let response = app.login("alice", PASSWORD).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app.login("alice", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["kind"], "rate_limited");
}

#[tokio::test]
async fn test_rate_limit_does_not_cover_refresh() {
    let app = TestApp::with_rate(NonZeroU32::new(1).unwrap()).await;

    for _ in 0..3 {
        let response = app.refresh("unknown-token").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
