//! Authentication types for the domain layer.
//!
//! An `AuthenticatedUser` is produced by a `SessionValidator` adapter from a
//! bearer token and carried through the request explicitly, in request
//! extensions. Nothing here knows which identity provider issued the token.

use super::UserId;
use thiserror::Error;

/// Caller identity established from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Subject of the token; also the key of the user's profile row.
    pub id: UserId,

    /// Email claim, absent for phone-only accounts.
    pub email: Option<String>,

    /// Provider role claim (`authenticated` for signed-in users).
    pub role: String,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: Option<String>, role: impl Into<String>) -> Self {
        Self {
            id,
            email,
            role: role.into(),
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is malformed, has a bad signature, or the wrong audience.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// The provider could not be consulted (network, config, ...).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// True if the caller should sign in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
