use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Session claims issued by the identity provider; `sub` is the user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, email: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id.into(),
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Validate signature and expiry, returning the decoded claims
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(JwtError::InvalidToken("empty subject".to_string()));
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn round_trips_subject_through_signed_token() {
        let security = AppConfig::development().security;
        let token = generate_jwt(&Claims::new("u1", Some("a@b.c".into()), 1), &security).unwrap();
        let claims = validate_jwt(&token, &security).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let security = AppConfig::development().security;
        let mut other = security.clone();
        other.jwt_secret = "someone-else".to_string();

        let token = generate_jwt(&Claims::new("u1", None, 1), &other).unwrap();
        assert!(matches!(validate_jwt(&token, &security), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let security = AppConfig::development().security;
        let mut claims = Claims::new("u1", None, 1);
        claims.exp = Utc::now().timestamp() - 3600;
        claims.iat = claims.exp - 60;

        let token = generate_jwt(&claims, &security).unwrap();
        assert!(validate_jwt(&token, &security).is_err());
    }

    #[test]
    fn missing_secret_never_verifies() {
        let mut security = AppConfig::development().security;
        security.jwt_secret.clear();
        assert!(matches!(generate_jwt(&Claims::new("u1", None, 1), &security), Err(JwtError::InvalidSecret)));
        assert!(matches!(validate_jwt("a.b.c", &security), Err(JwtError::InvalidSecret)));
    }
}
