//! Password hashing and bearer-token authentication.

use crate::error::{ApiError, StashError};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Hash a password with Argon2id and a fresh random salt. Returns a
/// PHC-format string.
pub fn hash_password(password: &str) -> Result<String, StashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StashError::PasswordHashError(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a PHC-format hash string. `Ok(false)` on
/// mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, StashError> {
    let parsed = PasswordHash::new(hash).map_err(|e| StashError::PasswordHashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// JWT claims carried by a bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Identity attached to each authenticated request
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
}

/// Issues and validates HS256 bearer tokens
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_days: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_days,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, StashError> {
        let exp = Utc::now() + Duration::days(self.ttl_days);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp() as usize,
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding,
        )?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, StashError> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

/// Authentication middleware: validates the bearer token and inserts an
/// [`AuthContext`] into request extensions for handlers to extract.
pub async fn auth_middleware(
    auth: axum::Extension<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Authorization header is required".into()))?;

    // Clients historically send the raw token as well, so the prefix is
    // optional.
    let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value);

    let claims = auth
        .verify(token)
        .map_err(|_| ApiError::Forbidden("Invalid or expired token".into()))?;

    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| ApiError::Forbidden("Invalid token format".into()))?;

    req.extensions_mut().insert(AuthContext { user_id });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("hunter2...").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2...", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("pw", "not-a-phc-string").is_err());
    }

    #[test]
    fn token_round_trip() {
        let service = TokenService::new("test-secret", 7);
        let user_id = Uuid::new_v4();
        let token = service.issue(user_id).unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let service = TokenService::new("test-secret", 7);
        let other = TokenService::new("other-secret", 7);
        let token = service.issue(Uuid::new_v4()).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn token_rejects_garbage() {
        let service = TokenService::new("test-secret", 7);
        assert!(service.verify("not.a.token").is_err());
    }
}
