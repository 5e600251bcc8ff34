#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use planbook::config::AppConfig;
use planbook::state::AppState;
use planbook::store::memory::MemoryStore;
use planbook::store::{GameStore, IdentityStore, StudyStore};

/// Build the full router over a fresh in-memory store. Each test gets an
/// isolated world; no external services are involved.
pub fn test_app() -> Router {
    let store = Arc::new(MemoryStore::new());

    let users: Arc<dyn IdentityStore> = store.clone();
    let games: Arc<dyn GameStore> = store.clone();
    let studies: Arc<dyn StudyStore> = store;

    let state = AppState {
        config: Arc::new(AppConfig::development()),
        users,
        games,
        studies,
    };

    planbook::app(state)
}

/// Fire one request at the router and decode the JSON response.
/// An empty body decodes to `Value::Null`.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Register a user and return its wire representation plus a valid token.
pub async fn register(app: &Router, username: &str, email: &str) -> (Value, String) {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": email,
            "password": "hunter22"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    let token = body["token"].as_str().unwrap().to_string();
    (body["user"].clone(), token)
}

/// Create a game plan for the given token and return it.
pub async fn create_game(app: &Router, token: &str, title: &str, date: &str) -> Value {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/games",
        Some(token),
        Some(json!({
            "title": title,
            "genre": "Adventure",
            "plannedDate": date,
            "duration": "2 hours"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "create game failed: {}", body);
    body
}
