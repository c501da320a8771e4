//! Session validation port for bearer tokens.
//!
//! The HTTP layer calls this once per request and carries the resulting
//! [`AuthenticatedUser`] in request extensions. There is no process-wide
//! session state.
//!
//! # Contract
//!
//! Implementations must:
//! - Validate the token signature
//! - Validate audience and expiry claims
//! - Return `AuthError::InvalidToken` for malformed/bad signature tokens
//! - Return `AuthError::TokenExpired` for expired tokens
//! - Return `AuthError::ServiceUnavailable` for transient errors

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw access token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
