//! Bearer token inspection
//!
//! The client never holds the signing secret. It reads the subject and expiry out of the
//! token to key session-scoped state and to refuse obviously stale tokens; the server
//! remains the only validator.

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use pulse_core::UserId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Claims the client relies on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(alias = "id", alias = "userId")]
    pub sub: String,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub.clone())
    }

    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Time until expiry, `None` once expired
    #[must_use]
    pub fn expires_in(&self) -> Option<Duration> {
        let remaining = self.exp - Utc::now().timestamp();
        u64::try_from(remaining)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Decode a bearer token's claims without verifying its signature
///
/// # Errors
/// `InvalidToken` if the token is not a well-formed JWT carrying `sub` and `exp`,
/// `TokenExpired` if it already expired.
pub fn inspect_token(token: &str) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| {
            tracing::debug!(error = %e, "Token inspection failed");
            AppError::InvalidToken
        })?;

    if data.claims.is_expired() {
        return Err(AppError::TokenExpired);
    }

    Ok(data.claims)
}
