/**
 * Operator Session Tokens
 *
 * JWT generation and validation for the operator console. Tokens carry no
 * user identity beyond the operator role; any valid token unlocks the
 * operator-only actions.
 */

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Subject of every operator token
pub const OPERATOR_SUBJECT: &str = "operator";

/// Operator tokens expire after 12 hours
pub const TOKEN_TTL_SECS: u64 = 12 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Always [`OPERATOR_SUBJECT`]
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Create an operator token signed with `secret`
pub fn create_token(secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as u64;
    let claims = Claims {
        sub: OPERATOR_SUBJECT.to_string(),
        exp: now + TOKEN_TTL_SECS,
        iat: now,
    };
    let key = EncodingKey::from_secret(secret.as_ref());
    encode(&Header::default(), &claims, &key)
}

/// Verify and decode an operator token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_ref());
    let mut validation = Validation::default();
    validation.sub = Some(OPERATOR_SUBJECT.to_string());

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}
