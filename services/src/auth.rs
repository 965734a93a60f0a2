//! Bearer-token authentication for `/v1/*` routes.
//!
//! Identity is owned by a third-party provider: users sign in against it in
//! the browser and the front end forwards the provider-issued JWT with each
//! request. This module only verifies that token and exposes the subject as
//! the current user id; there is no user table on our side.
//!
//! The token must:
//! - Be signed (HS256) with the provider secret configured as `JWT_SECRET`
//! - Have a valid `exp` (expiration) claim
//! - Have a `sub` (subject) claim containing the user's UUID

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims carried by a provider-issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's opaque identity, a UUID string.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
}

/// Authenticated user context extracted from a valid bearer token.
///
/// # Rejection
///
/// Returns `AuthError` (401 Unauthorized) if no token is provided, the
/// token is malformed or expired, the signature does not verify, or the
/// subject is not a UUID.
#[derive(Debug, Clone)]
pub struct RequireUser {
    user_id: uuid::Uuid,
    claims: Claims,
}

impl RequireUser {
    /// The authenticated user's id (parsed from the `sub` claim).
    pub fn user_id(&self) -> uuid::Uuid {
        self.user_id
    }

    /// The full claims for advanced use cases.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}

/// Error type for authentication failures.
#[derive(Debug, Serialize)]
pub struct AuthError {
    pub error: String,
    pub message: String,
}

impl AuthError {
    fn missing_token() -> Self {
        Self {
            error: "missing_token".to_string(),
            message: "Authorization header with Bearer token is required".to_string(),
        }
    }

    fn invalid_format() -> Self {
        Self {
            error: "invalid_format".to_string(),
            message: "Authorization header must be in format: Bearer <token>".to_string(),
        }
    }

    fn invalid_token(reason: impl Into<String>) -> Self {
        Self {
            error: "invalid_token".to_string(),
            message: reason.into(),
        }
    }

    fn missing_config() -> Self {
        Self {
            error: "server_error".to_string(),
            message: "Server configuration error".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    let header_value = headers.get(AUTHORIZATION)?;
    let header_str = header_value.to_str().ok()?;

    let stripped = header_str.strip_prefix("Bearer ")?;
    if stripped.is_empty() {
        return None;
    }
    Some(stripped)
}

/// Validate a bearer token and return the claims.
fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token has expired".to_string(),
        jsonwebtoken::errors::ErrorKind::InvalidSignature => "Invalid token signature".to_string(),
        _ => format!("Token validation failed: {}", e),
    })?;

    Ok(token_data.claims)
}

/// Sign a token the way the identity provider would.
///
/// The service never issues tokens in production; this exists for local
/// development and the test suites.
pub fn sign_token(
    user_id: uuid::Uuid,
    jwt_secret: &str,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get JWT secret from request extensions (set via Extension layer)
        let config = parts
            .extensions
            .get::<crate::config::Config>()
            .ok_or_else(AuthError::missing_config)?;

        let jwt_secret = config.jwt_secret();

        // Extract Bearer token from Authorization header
        let token = extract_bearer_token(&parts.headers).ok_or_else(|| {
            // Distinguish between missing header and invalid format
            if parts.headers.get(AUTHORIZATION).is_some() {
                AuthError::invalid_format()
            } else {
                AuthError::missing_token()
            }
        })?;

        // Validate the token
        let claims = validate_token(token, jwt_secret).map_err(AuthError::invalid_token)?;

        // The provider's subject is an opaque UUID
        let user_id = uuid::Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::invalid_token("Token subject is not a valid user id"))?;

        Ok(RequireUser { user_id, claims })
    }
}
