//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, auth types and error types used across the
//! billing domain.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{LedgerEntryId, OrderId, PaymentId, UserId};
pub use timestamp::Timestamp;
