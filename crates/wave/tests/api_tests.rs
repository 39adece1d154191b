//! API integration tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use wave::ws::{IncomingKind, IncomingMessage, MessageHandler};

mod common;
use common::{test_app, test_app_with_state};

/// Register a user over HTTP and return the parsed response body.
async fn register_user(app: &Router, username: &str, email: &str, password: &str) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/register")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_string(&json!({
                        "username": username,
                        "email": email,
                        "password": password
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Test that health endpoint works without authentication.
#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

/// Test successful registration returns a token and the profile.
#[tokio::test]
async fn test_register_success() {
    let app = test_app().await;

    let json = register_user(&app, "alice", "alice@example.com", "password123").await;

    assert!(json["token"].is_string());
    assert_eq!(json["user"]["username"], "alice");
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert!(json["user"]["id"].is_i64());
    // The password hash must never leave the server
    assert!(json["user"].get("password_hash").is_none());
}

/// Test that a duplicate username is rejected with a conflict.
#[tokio::test]
async fn test_register_duplicate_username() {
    let app = test_app().await;

    register_user(&app, "alice", "alice@example.com", "password123").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/register")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_string(&json!({
                        "username": "alice",
                        "email": "other@example.com",
                        "password": "password123"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Test that a malformed email is rejected.
#[tokio::test]
async fn test_register_invalid_email() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/register")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_string(&json!({
                        "username": "alice",
                        "email": "not-an-email",
                        "password": "password123"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Test login with the registered username.
#[tokio::test]
async fn test_login_success() {
    let app = test_app().await;

    register_user(&app, "alice", "alice@example.com", "password123").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/login")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_string(&json!({
                        "username": "alice",
                        "password": "password123"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["token"].is_string());
    assert_eq!(json["user"]["username"], "alice");
}

/// Test login also accepts the email address in the username field.
#[tokio::test]
async fn test_login_with_email() {
    let app = test_app().await;

    register_user(&app, "alice", "alice@example.com", "password123").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/login")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_string(&json!({
                        "username": "alice@example.com",
                        "password": "password123"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

/// Test login with the wrong password.
#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = test_app().await;

    register_user(&app, "alice", "alice@example.com", "password123").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/login")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_string(&json!({
                        "username": "alice",
                        "password": "wrong"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test that protected endpoints require authentication.
#[tokio::test]
async fn test_me_requires_auth() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test fetching the current user's profile with a bearer token.
#[tokio::test]
async fn test_get_me_with_token() {
    let app = test_app().await;

    let registered = register_user(&app, "alice", "alice@example.com", "password123").await;
    let token = registered["token"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .method(Method::GET)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["username"], "alice");
    assert_eq!(json["email"], "alice@example.com");
}

/// Test updating the current user's profile.
#[tokio::test]
async fn test_update_me() {
    let app = test_app().await;

    let registered = register_user(&app, "alice", "alice@example.com", "password123").await;
    let token = registered["token"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .method(Method::PUT)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_string(&json!({
                        "full_name": "Alice Example"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["full_name"], "Alice Example");
}

/// Test that message history requires authentication.
#[tokio::test]
async fn test_history_requires_auth() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/messages/general")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test that a room with no messages returns an empty array.
#[tokio::test]
async fn test_history_empty_room() {
    let app = test_app().await;

    let registered = register_user(&app, "alice", "alice@example.com", "password123").await;
    let token = registered["token"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/messages/general")
                .method(Method::GET)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json, json!([]));
}

/// Test that persisted messages come back with the sender attached.
#[tokio::test]
async fn test_history_returns_messages() {
    let (app, state) = test_app_with_state().await;

    let registered = register_user(&app, "alice", "alice@example.com", "password123").await;
    let token = registered["token"].as_str().unwrap().to_string();
    let user_id = registered["user"]["id"].as_i64().unwrap();

    // Persist a message the same way the hub does
    state
        .messages
        .handle(&IncomingMessage {
            kind: IncomingKind::Text,
            content: "hello room".to_string(),
            room_id: "general".to_string(),
            user_id,
            username: "alice".to_string(),
        })
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/messages/general")
                .method(Method::GET)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["content"], "hello room");
    assert_eq!(list[0]["room_id"], "general");
    assert_eq!(list[0]["user"]["username"], "alice");
}

/// Test that the token query parameter works where headers are awkward.
#[tokio::test]
async fn test_token_query_param_auth() {
    let app = test_app().await;

    let registered = register_user(&app, "alice", "alice@example.com", "password123").await;
    let token = registered["token"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/messages/general?token={}", token))
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

/// Test that a garbage bearer token is rejected.
#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/me")
                .method(Method::GET)
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
