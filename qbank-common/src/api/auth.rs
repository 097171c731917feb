//! JWT issuance/verification and salted password hashing
//!
//! Tokens are HS256 with a 7-day expiry, signed with the process-wide
//! secret from configuration. Passwords are stored as hex SHA-256 of
//! `salt + password` next to their per-account random salt.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::Role;

/// Token lifetime.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token encoding failed: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    InvalidToken,
}

/// Claims carried by every QBank token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id as a string.
    pub sub: String,
    pub email: String,
    pub phone: Option<String>,
    pub name: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: i64, email: &str, phone: Option<&str>, name: &str, role: Role) -> Self {
        let now = Utc::now();
        Self {
            sub: id.to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
            name: name.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        }
    }
}

/// Sign a token for the given claims.
pub fn issue_token(secret: &str, claims: &Claims) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Encoding)
}

/// Verify signature and expiry, returning the claims.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;
    Ok(data.claims)
}

/// Decode claims WITHOUT verifying the signature. Display purposes only
/// (e.g. the dashboard greeting); never an authorization input — the
/// gateway re-verifies every request.
pub fn decode_for_display(token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|_| AuthError::InvalidToken)?;
    Ok(data.claims)
}

/// Generate a fresh random salt as 32 hex characters.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with its salt, returning 64 hex characters.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compare a candidate password against the stored salt + hash.
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    hash_password(password, salt) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-testing-purposes-only";

    #[test]
    fn test_issue_and_verify_token() {
        let claims = Claims::new(7, "doc@example.com", Some("555-0100"), "Dr. Vega", Role::Doctor);
        let token = issue_token(SECRET, &claims).unwrap();
        assert!(!token.is_empty());

        let decoded = verify_token(SECRET, &token).unwrap();
        assert_eq!(decoded.sub, "7");
        assert_eq!(decoded.email, "doc@example.com");
        assert_eq!(decoded.role, Role::Doctor);
        assert_eq!(decoded.exp - decoded.iat, TOKEN_TTL_DAYS * 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims::new(1, "a@b.c", None, "A", Role::Admin);
        let token = issue_token(SECRET, &claims).unwrap();
        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token(SECRET, "invalid.token.here").is_err());
    }

    #[test]
    fn test_display_decode_ignores_signature() {
        let claims = Claims::new(2, "x@y.z", None, "X", Role::User);
        let token = issue_token("some-unknown-secret", &claims).unwrap();
        let decoded = decode_for_display(&token).unwrap();
        assert_eq!(decoded.name, "X");
    }

    #[test]
    fn test_password_round_trip() {
        let salt = generate_salt();
        assert_eq!(salt.len(), 32);

        let hash = hash_password("correct horse", &salt);
        assert_eq!(hash.len(), 64);
        assert!(verify_password("correct horse", &salt, &hash));
        assert!(!verify_password("wrong horse", &salt, &hash));
    }

    #[test]
    fn test_salts_differ_between_accounts() {
        // Same password, different salt, different hash.
        let (s1, s2) = (generate_salt(), generate_salt());
        assert_ne!(s1, s2);
        assert_ne!(hash_password("pw", &s1), hash_password("pw", &s2));
    }
}
