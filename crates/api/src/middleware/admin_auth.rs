//! Admin JWT authentication middleware.
//!
//! The analytics routes are reserved for administrators. Callers present a
//! Bearer token issued by the storefront auth service; its `role` claim must
//! match the configured admin role.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::config::JwtAuthConfig;
use crate::error::ApiError;
use shared::jwt::{Claims, JwtConfig, JwtError};

const NOT_AUTHORIZED: &str = "Not authorized to access this route";

/// Authenticated administrator, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// Subject claim of the token.
    pub subject: String,
    pub role: String,
}

impl AdminAuth {
    /// Validates a token and checks the role claim.
    pub fn authorize(
        jwt_config: &JwtConfig,
        admin_role: &str,
        token: &str,
    ) -> Result<Self, ApiError> {
        let claims: Claims = jwt_config.validate_token(token).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            ApiError::Unauthorized(NOT_AUTHORIZED.to_string())
        })?;

        if claims.role != admin_role {
            tracing::warn!(
                subject = %claims.sub,
                role = %claims.role,
                "Non-admin token rejected on admin route"
            );
            return Err(ApiError::Forbidden(format!(
                "User role {} is not authorized to access this route",
                claims.role
            )));
        }

        Ok(Self {
            subject: claims.sub,
            role: claims.role,
        })
    }

    /// Creates a JwtConfig from JwtAuthConfig.
    pub fn create_jwt_config(config: &JwtAuthConfig) -> Result<JwtConfig, JwtError> {
        JwtConfig::with_leeway(&config.secret, config.leeway_secs)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that requires an admin JWT.
///
/// Missing or invalid tokens get 401; valid tokens without the admin role
/// get 403.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(token) = bearer_token(header) else {
        return ApiError::Unauthorized(NOT_AUTHORIZED.to_string()).into_response();
    };

    let jwt_config = match AdminAuth::create_jwt_config(&state.config.jwt) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to create JWT config: {}", e);
            return ApiError::ServiceUnavailable("Authentication service unavailable".to_string())
                .into_response();
        }
    };

    match AdminAuth::authorize(&jwt_config, &state.config.jwt.admin_role, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "admin-auth-test-secret";

    fn token(role: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "64b7f0c2a1".to_string(),
            role: role.to_string(),
            exp: now + 600,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer   ")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn test_admin_token_authorized() {
        let config = JwtConfig::new(SECRET).unwrap();
        let auth = AdminAuth::authorize(&config, "admin", &token("admin")).unwrap();
        assert_eq!(auth.role, "admin");
        assert_eq!(auth.subject, "64b7f0c2a1");
    }

    #[test]
    fn test_user_token_forbidden() {
        let config = JwtConfig::new(SECRET).unwrap();
        let result = AdminAuth::authorize(&config, "admin", &token("user"));
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_foreign_token_unauthorized() {
        let config = JwtConfig::new("some-other-secret").unwrap();
        let result = AdminAuth::authorize(&config, "admin", &token("admin"));
        match result {
            Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, NOT_AUTHORIZED),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }
}
