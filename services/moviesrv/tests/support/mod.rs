//! Shared helpers for API integration tests
#![allow(dead_code)]
#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::sqlite::SqliteClient;
use moviesrv::bootstrap::create_app_state;
use moviesrv::{create_routes, AppState, MoviesrvConfig};
use serde_json::{json, Value};
use tower::util::ServiceExt;

pub const TEST_JWT_KEY: &str = "integration-test-signing-key";
pub const TEST_PASSWORD: &str = "P@ssw0rd!";

pub fn test_config() -> MoviesrvConfig {
    let mut config = MoviesrvConfig::default();
    config.jwt.key = TEST_JWT_KEY.to_string();
    config.jwt.issuer = "marquee-test".to_string();
    config.jwt.audience = "marquee-clients".to_string();
    config.jwt.expiration_in_days = 30;
    config
}

/// Router and state over a fresh in-memory database
pub async fn create_test_app() -> (Router, Arc<AppState>) {
    let client = SqliteClient::in_memory().await.unwrap();
    let state = create_app_state(test_config(), client).await.unwrap();
    (create_routes(state.clone()), state)
}

/// Send a request; JSON bodies are parsed, anything else comes back as a string
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into_owned()))
    };
    (status, body)
}

/// Helper to make JSON requests, optionally with a bearer token
pub async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let body = match body {
        Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
        None => Body::empty(),
    };
    send(app, builder.body(body).unwrap()).await
}

pub fn register_body(username: &str, email: &str, password: &str) -> Value {
    json!({
        "firstName": "Test",
        "lastName": "User",
        "username": username,
        "email": email,
        "password": password
    })
}

/// Register a user and return its token
pub async fn register_user(app: &Router, username: &str, email: &str) -> String {
    let (status, body) = json_request(
        app,
        "POST",
        "/api/auth/register",
        Some(register_body(username, email, TEST_PASSWORD)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    json_request(
        app,
        "POST",
        "/api/auth/token",
        Some(json!({ "email": email, "password": password })),
        None,
    )
    .await
}

/// Register an administrator and return a token carrying the Admin role
pub async fn admin_token(app: &Router, state: &AppState) -> String {
    register_user(app, "root", "root@example.com").await;
    let message = state
        .auth
        .grant_role_by_email("root@example.com", "Admin")
        .await
        .unwrap();
    assert_eq!(message, "");

    let (status, body) = login(app, "root@example.com", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// A part of a multipart form
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

const BOUNDARY: &str = "----moviesrv-test-boundary";

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            },
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            },
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn multipart_request(
    app: &Router,
    method: &str,
    uri: &str,
    parts: &[Part<'_>],
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    send(app, builder.body(Body::from(multipart_body(parts))).unwrap()).await
}
