use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth;
use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

/// Resolved identity attached to the request after token verification.
/// Carries everything but the password hash.
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// The raw bearer token, kept alongside the resolved identity for the
/// lifetime of the request.
#[derive(Clone, Debug)]
pub struct RawToken(pub String);

/// Credential verifier. Every request through this layer is independently
/// re-verified; there is no server-side session cache.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match bearer_token(&headers) {
        Some(token) => token,
        None => {
            tracing::warn!("rejected request without bearer token");
            return Err(ApiError::unauthenticated(
                "No authentication token, access denied",
            ));
        }
    };

    let user = resolve_identity(&state, &token).await.map_err(|e| {
        tracing::warn!("authentication failed: {}", e);
        e
    })?;

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(RawToken(token));

    Ok(next.run(request).await)
}

/// Verify a token and look up the identity it asserts. Shared with routes
/// that sit outside the middleware but still resolve a caller themselves.
pub async fn resolve_identity(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let claims = auth::verify_token(&state.config.security, token)?;

    let user = state
        .users
        .find_user_by_id(claims.sub)
        .await?
        .ok_or(ApiError::IdentityNotFound)?;

    Ok(AuthUser::from(user))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
