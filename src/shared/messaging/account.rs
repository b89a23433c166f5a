//! Account Types
//!
//! Customer registration and operator login bodies, and the error envelope
//! every action may answer with.

use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Body of the `register` action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub email: String,
}

/// Response of the `register` action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: u64,
    pub email: String,
}

/// Body of the `login` action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Response of the `login` action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    /// Bearer token for operator-only actions
    pub token: String,
}

/// `{ "error": ... }` envelope returned on application errors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// Trim and lowercase an email, rejecting values without `@`
pub fn normalize_email(raw: &str) -> Result<String, SharedError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(SharedError::validation("email", "Invalid email"));
    }
    Ok(email)
}
