pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Claims embedded in a session token. The token is the only session state;
/// nothing is persisted server-side and a minted token cannot be revoked
/// before its expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("JWT secret is not configured")]
    MissingSecret,
}

/// Mint a signed session token bound to one user id.
pub fn mint_token(security: &SecurityConfig, user_id: Uuid) -> Result<String, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let claims = Claims::new(user_id, security.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| TokenError::Invalid(e.to_string()))
}

/// Verify signature and expiry, returning the embedded claims.
pub fn verify_token(security: &SecurityConfig, token: &str) -> Result<Claims, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn mint_then_verify_round_trips_subject() {
        let security = AppConfig::development().security;
        let user_id = Uuid::new_v4();

        let token = mint_token(&security, user_id).unwrap();
        let claims = verify_token(&security, &token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let security = AppConfig::development().security;
        // Expired well past the default validation leeway
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (Utc::now() - Duration::hours(2)).timestamp(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(security.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&security, &token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let security = AppConfig::development().security;
        let mut other = security.clone();
        other.jwt_secret = "a-different-secret".to_string();

        let token = mint_token(&other, Uuid::new_v4()).unwrap();

        assert!(matches!(
            verify_token(&security, &token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn empty_secret_refuses_to_mint() {
        let mut security = AppConfig::development().security;
        security.jwt_secret = String::new();

        assert!(matches!(
            mint_token(&security, Uuid::new_v4()),
            Err(TokenError::MissingSecret)
        ));
    }
}
