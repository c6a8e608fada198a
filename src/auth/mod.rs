/*!
 * # Authentication and Authorization Module
 *
 * JWT bearer authentication plus a declarative role policy. The middleware
 * chain is: `auth_middleware` validates the token and attaches an
 * [`AuthUser`]; `policy_middleware` then checks the route's permission
 * against the policy table in [`policy`].
 */

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::user;
use crate::errors::ErrorResponse;

pub mod policy;

pub use policy::*;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Subject (user ID)
    pub username: String, // Login name, shown in audit entries
    pub role: String,     // Single role per user
    pub jti: String,      // JWT ID
    pub iat: i64,         // Issued at time
    pub exp: i64,         // Expiration time
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: String,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Policy check for this user.
    pub fn can(&self, permission: &str) -> bool {
        role_allows(&self.role, permission)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, token_expiration: Duration) -> Self {
        Self {
            jwt_secret,
            token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            token_expiration: Duration::from_secs(cfg.jwt_expiration as u64),
        }
    }
}

/// Issued token plus its lifetime, returned by the login endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Handles token issuance, validation, and credential hashing
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &user::Model) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_in = self.config.token_expiration.as_secs() as i64;

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + expires_in,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(IssuedToken { token, expires_in })
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        Ok(claims)
    }

    /// Argon2 hash for passwords and app keys.
    pub fn hash_secret(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::InternalError(format!("Hashing failed: {}", e)))
    }

    /// Constant-time verification against a stored argon2 hash. A malformed
    /// stored hash verifies as false rather than erroring.
    pub fn verify_secret(&self, secret: &str, stored_hash: &str) -> bool {
        PasswordHash::new(stored_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(secret.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth
            | Self::InvalidCredentials
            | Self::InvalidToken
            | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::TokenCreation(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "authentication internals failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorResponse { error: message };
        (status, Json(body)).into_response()
    }
}

/// Policy middleware checking the route's permission against the user's role
pub async fn policy_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    if !user.can(&required_permission) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extract authentication info from request headers
fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if auth_value.starts_with("Bearer ") {
                let token = auth_value.trim_start_matches("Bearer ").trim();
                let claims = auth_service.validate_token(token)?;

                let user_id = claims
                    .sub
                    .parse::<i32>()
                    .map_err(|_| AuthError::InvalidToken)?;

                return Ok(AuthUser {
                    user_id,
                    username: claims.username,
                    role: claims.role,
                    token_id: claims.jti,
                });
            }
        }
    }

    Err(AuthError::MissingAuth)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            policy_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        AuthService::new(AuthConfig::new(
            "unit_test_secret_that_is_long_enough_for_hs256_token_signing_1234".into(),
            Duration::from_secs(8 * 60 * 60),
        ))
    }

    fn test_user(role: &str) -> user::Model {
        user::Model {
            id: 7,
            username: "ramesh".into(),
            password_hash: String::new(),
            role: role.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let service = test_service();
        let issued = service.generate_token(&test_user("clerk")).unwrap();
        assert_eq!(issued.expires_in, 8 * 60 * 60);

        let claims = service.validate_token(&issued.token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "ramesh");
        assert_eq!(claims.role, "clerk");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service();
        let issued = service.generate_token(&test_user("low")).unwrap();

        let mut tampered = issued.token.clone();
        tampered.push('x');
        assert!(matches!(
            service.validate_token(&tampered),
            Err(AuthError::InvalidToken)
        ));

        let other = AuthService::new(AuthConfig::new(
            "a_completely_different_secret_that_is_also_long_enough_4567890ab".into(),
            Duration::from_secs(60),
        ));
        assert!(other.validate_token(&issued.token).is_err());
    }

    #[test]
    fn secret_hash_verifies_and_rejects() {
        let service = test_service();
        let hash = service.hash_secret("tulsi-2024").unwrap();
        assert!(service.verify_secret("tulsi-2024", &hash));
        assert!(!service.verify_secret("wrong", &hash));
        assert!(!service.verify_secret("tulsi-2024", "not-a-phc-string"));
    }

    #[test]
    fn auth_user_policy_shortcuts() {
        let admin = AuthUser {
            user_id: 1,
            username: "admin".into(),
            role: ROLE_ADMIN.into(),
            token_id: "t".into(),
        };
        assert!(admin.is_admin());
        assert!(admin.can(perm::MEMOS_DELETE));

        let low = AuthUser {
            user_id: 2,
            username: "viewer".into(),
            role: ROLE_LOW.into(),
            token_id: "t".into(),
        };
        assert!(!low.is_admin());
        assert!(low.can(perm::MEMOS_READ));
        assert!(!low.can(perm::MEMOS_CREATE));
    }
}
