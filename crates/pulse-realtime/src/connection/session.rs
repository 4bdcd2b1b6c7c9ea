//! Authenticated session owning the channel lifetime

use pulse_common::{inspect_token, AppError, AppResult};
use pulse_core::{UserId, UserSummary};
use std::fmt;

use crate::transport::AuthPayload;

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user: UserSummary,
    token: String,
}

impl Session {
    pub fn new(user: UserSummary, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    /// Build a session from a bearer token, reading the user id from its claims
    ///
    /// # Errors
    /// Fails if the token is malformed or already expired.
    pub fn from_token(token: impl Into<String>) -> AppResult<Self> {
        let token = token.into();
        let claims = inspect_token(&token)?;
        Ok(Self::new(UserSummary::new(claims.user_id()), token))
    }

    /// Like [`Session::from_token`], for a token that may be unset or blank
    pub fn from_optional_token(token: Option<String>) -> AppResult<Self> {
        let token = token
            .filter(|token| !token.trim().is_empty())
            .ok_or(AppError::MissingAuth)?;
        Self::from_token(token)
    }

    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Same user with the same token; a rotated token means a new channel
    pub fn same_credentials(&self, other: &Self) -> bool {
        self.user.id == other.user.id && self.token == other.token
    }

    pub fn auth(&self) -> AuthPayload {
        AuthPayload {
            token: self.token.clone(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user.id)
            .field("token", &"<redacted>")
            .finish()
    }
}
