/**
 * Operator Authentication
 *
 * Checks the operator password against a bcrypt hash and issues tokens.
 * Operator-only actions read the token from the `Authorization: Bearer`
 * header.
 */

use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};

use crate::backend::auth::sessions::{create_token, verify_token, Claims};
use crate::backend::error::BackendError;

pub struct OperatorAuth {
    /// bcrypt hash of the operator password; `None` disables login
    password_hash: Option<String>,
    jwt_secret: String,
}

impl OperatorAuth {
    pub fn new(password_hash: Option<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            password_hash,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Hash a plaintext password with the given bcrypt cost
    pub fn from_password(
        password: &str,
        cost: u32,
        jwt_secret: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let hash = bcrypt::hash(password, cost)
            .map_err(|e| BackendError::state(format!("Failed to hash operator password: {}", e)))?;
        Ok(Self::new(Some(hash), jwt_secret))
    }

    pub fn is_configured(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Exchange the operator password for a token
    pub fn login(&self, password: &str) -> Result<String, BackendError> {
        let Some(hash) = &self.password_hash else {
            tracing::warn!("Operator login attempted but no operator password is configured");
            return Err(BackendError::handler(
                StatusCode::SERVICE_UNAVAILABLE,
                "Operator login is not configured",
            ));
        };

        let valid = bcrypt::verify(password, hash).map_err(|e| {
            tracing::error!("Password verification error: {:?}", e);
            BackendError::state("Failed to verify password")
        })?;
        if !valid {
            tracing::warn!("Invalid operator password");
            return Err(BackendError::handler(StatusCode::UNAUTHORIZED, "Invalid password"));
        }

        create_token(&self.jwt_secret).map_err(|e| {
            tracing::error!("Failed to create token: {:?}", e);
            BackendError::state("Failed to create token")
        })
    }

    /// Require a valid operator token on the request
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Claims, BackendError> {
        let token = bearer_token(headers).ok_or_else(|| {
            tracing::debug!("Missing or malformed Authorization header");
            BackendError::unauthorized()
        })?;
        verify_token(token, &self.jwt_secret).map_err(|e| {
            tracing::warn!("Invalid token: {:?}", e);
            BackendError::unauthorized()
        })
    }
}

/// Token of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
