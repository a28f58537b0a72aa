//! JWT token validation using HS256.
//!
//! Tokens are issued by the storefront auth service with a shared secret.
//! This backend only verifies them and reads the caller's role.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject; an opaque account id, not necessarily a UUID
    pub sub: String,
    /// Role of the user at issue time ("user" or "admin")
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Verification settings for incoming tokens.
#[derive(Clone)]
pub struct JwtConfig {
    decoding_key: DecodingKey,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("leeway_secs", &self.leeway_secs)
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a config from the shared HMAC secret.
    pub fn new(secret: &str) -> Result<Self, JwtError> {
        Self::with_leeway(secret, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a config from the shared HMAC secret with custom leeway.
    pub fn with_leeway(secret: &str, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidKey("JWT secret cannot be empty".to_string()));
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            leeway_secs,
        })
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test_secret_key_for_jwt_testing_12345";

    fn issue(secret: &str, role: &str, exp_offset_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "64b7f0c2a1e4".to_string(),
            role: role.to_string(),
            exp: now + exp_offset_secs,
            iat: now,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_token() {
        let config = JwtConfig::with_leeway(SECRET, 0).unwrap();
        let token = issue(SECRET, "admin", 600);

        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.sub, "64b7f0c2a1e4");
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = JwtConfig::with_leeway(SECRET, 0).unwrap();
        let token = issue(SECRET, "admin", -120);

        assert!(matches!(
            config.validate_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = JwtConfig::new(SECRET).unwrap();
        let token = issue("another-secret", "admin", 600);

        assert!(matches!(
            config.validate_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let config = JwtConfig::new(SECRET).unwrap();
        assert!(config.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(JwtConfig::new(""), Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = JwtConfig::new(SECRET).unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(SECRET));
    }
}
