// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::TokenError;
use crate::store::StoreError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    DuplicateIdentity(String),
    InvalidUpdate(String),

    // 401 Unauthorized
    InvalidCredentials,
    Unauthenticated(String),
    InvalidToken(String),
    TokenExpired,
    IdentityNotFound,

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => 400,
            ApiError::DuplicateIdentity(_) => 400,
            ApiError::InvalidUpdate(_) => 400,
            ApiError::InvalidCredentials => 401,
            ApiError::Unauthenticated(_) => 401,
            ApiError::InvalidToken(_) => 401,
            ApiError::TokenExpired => 401,
            ApiError::IdentityNotFound => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. } => message,
            ApiError::DuplicateIdentity(msg) => msg,
            ApiError::InvalidUpdate(msg) => msg,
            ApiError::InvalidCredentials => "Invalid email or password",
            ApiError::Unauthenticated(msg) => msg,
            ApiError::InvalidToken(msg) => msg,
            ApiError::TokenExpired => "Token has expired",
            ApiError::IdentityNotFound => "Token is valid but user not found",
            ApiError::NotFound(msg) => msg,
            ApiError::Internal(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::DuplicateIdentity(_) => "DUPLICATE_IDENTITY",
            ApiError::InvalidUpdate(_) => "INVALID_UPDATE",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::InvalidToken(_) => "INVALID_TOKEN",
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::IdentityNotFound => "IDENTITY_NOT_FOUND",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_FAILURE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation {
                message,
                field_errors,
            } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn duplicate_identity(message: impl Into<String>) -> Self {
        ApiError::DuplicateIdentity(message.into())
    }

    pub fn invalid_update(message: impl Into<String>) -> Self {
        ApiError::InvalidUpdate(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        ApiError::InvalidToken(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

// Convert store failures, logging internal detail and returning generic messages
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => {
                ApiError::duplicate_identity(format!("{} already exists", what))
            }
            StoreError::Sqlx(sqlx_err) => {
                tracing::error!("store error: {}", sqlx_err);
                ApiError::internal("An error occurred while processing your request")
            }
            StoreError::Migration(msg) => {
                tracing::error!("migration error: {}", msg);
                ApiError::internal("Service is being updated, please try again later")
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Invalid(msg) => ApiError::invalid_token(format!("Invalid token: {}", msg)),
            TokenError::MissingSecret => {
                tracing::error!("JWT secret is not configured");
                ApiError::internal("Authentication is not configured")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
