use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::{self, password};
use crate::error::ApiError;
use crate::models::game::required;
use crate::models::NewUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/register - create an identity and mint its first token
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request: RegisterRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e), None))?;

    let mut field_errors = HashMap::new();
    let username = required(request.username, "username", &mut field_errors);
    let email = required(request.email, "email", &mut field_errors);
    let plain = required(request.password, "password", &mut field_errors);
    if !field_errors.is_empty() {
        return Err(ApiError::validation(
            "Missing required fields",
            Some(field_errors),
        ));
    }

    let password_hash = password::hash_password(&plain).map_err(|e| {
        tracing::error!("password hashing failed: {}", e);
        ApiError::internal("Failed to process credentials")
    })?;

    let user = state
        .users
        .insert_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await?;

    let token = auth::mint_token(&state.config.security, user.id)?;

    tracing::info!("registered user {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "token": token })),
    ))
}

/// POST /api/auth/login - verify credentials and mint a fresh token.
/// Unknown email and wrong password return the same generic error.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let request: LoginRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e), None))?;

    let mut field_errors = HashMap::new();
    let email = required(request.email, "email", &mut field_errors);
    let plain = required(request.password, "password", &mut field_errors);
    if !field_errors.is_empty() {
        return Err(ApiError::validation(
            "Missing required fields",
            Some(field_errors),
        ));
    }

    let user = match state.users.find_user_by_email(&email).await? {
        Some(user) if password::verify_password(&plain, &user.password_hash) => user,
        _ => return Err(ApiError::InvalidCredentials),
    };

    let token = auth::mint_token(&state.config.security, user.id)?;

    Ok(Json(json!({ "user": user, "token": token })))
}
