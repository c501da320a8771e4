//! Subscription-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidRequest | 400 |
//! | UnknownPlan | 400 |
//! | PlanMismatch | 400 |
//! | InvalidSignature | 400 |
//! | PaymentUserMismatch | 400 |
//! | ProfileNotFound | 404 |
//! | GatewayUnavailable | 500 |
//! | GatewayRejected | 500 |
//! | GatewayMisconfigured | 500 |
//! | ProfileUpdateFailed | 500 |
//! | Infrastructure | 500 |
//! | ProfileUnavailable | 503 |

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, UserId, ValidationError};

/// Errors from ordering, reconciling and reading subscriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Missing or malformed input.
    InvalidRequest { field: String, message: String },

    /// The SKU is not in the plan catalog.
    UnknownPlan(String),

    /// Client-sent plan details disagree with the catalog.
    PlanMismatch { field: String, expected: String, actual: String },

    /// The gateway could not be reached or failed; safe to retry checkout.
    GatewayUnavailable(String),

    /// The gateway refused the order. The message is the gateway's own.
    GatewayRejected(String),

    /// Our gateway credentials were refused.
    GatewayMisconfigured(String),

    /// The payment signature did not verify. Nothing was written.
    InvalidSignature,

    /// The payment, or the order it paid, belongs to another user.
    PaymentUserMismatch { payment_id: PaymentId },

    /// The payment verified but the plan could not be granted.
    ///
    /// Money was collected without entitlement; needs manual remediation.
    ProfileUpdateFailed { payment_id: PaymentId, reason: String },

    ProfileNotFound(UserId),

    /// The profile store could not answer a read.
    ProfileUnavailable(String),

    Infrastructure(String),
}

impl SubscriptionError {
    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unknown_plan(sku: impl Into<String>) -> Self {
        SubscriptionError::UnknownPlan(sku.into())
    }

    pub fn plan_mismatch(
        field: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        SubscriptionError::PlanMismatch {
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn profile_update_failed(payment_id: PaymentId, reason: impl Into<String>) -> Self {
        SubscriptionError::ProfileUpdateFailed {
            payment_id,
            reason: reason.into(),
        }
    }

    pub fn payment_user_mismatch(payment_id: PaymentId) -> Self {
        SubscriptionError::PaymentUserMismatch { payment_id }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            SubscriptionError::UnknownPlan(_) => ErrorCode::UnknownPlan,
            SubscriptionError::PlanMismatch { .. } => ErrorCode::PlanMismatch,
            SubscriptionError::GatewayUnavailable(_) => ErrorCode::GatewayUnavailable,
            SubscriptionError::GatewayRejected(_) => ErrorCode::GatewayRejected,
            SubscriptionError::GatewayMisconfigured(_) => ErrorCode::GatewayMisconfigured,
            SubscriptionError::InvalidSignature => ErrorCode::InvalidSignature,
            SubscriptionError::PaymentUserMismatch { .. } => ErrorCode::PaymentUserMismatch,
            SubscriptionError::ProfileUpdateFailed { .. } => ErrorCode::ProfileUpdateFailed,
            SubscriptionError::ProfileNotFound(_) => ErrorCode::ProfileNotFound,
            SubscriptionError::ProfileUnavailable(_) => ErrorCode::ProfileUnavailable,
            SubscriptionError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to show the client.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::InvalidRequest { field, message } => {
                format!("Invalid '{}': {}", field, message)
            }
            SubscriptionError::UnknownPlan(sku) => format!("Unknown plan: {}", sku),
            SubscriptionError::PlanMismatch {
                field,
                expected,
                actual,
            } => format!(
                "Plan {} does not match catalog (expected {}, got {})",
                field, expected, actual
            ),
            SubscriptionError::GatewayUnavailable(_) => {
                "Payment gateway is unavailable, please try again".to_string()
            }
            SubscriptionError::GatewayRejected(message) => message.clone(),
            SubscriptionError::GatewayMisconfigured(_) => {
                "Payment gateway is not configured correctly".to_string()
            }
            SubscriptionError::InvalidSignature => "Invalid payment signature".to_string(),
            SubscriptionError::PaymentUserMismatch { .. } => {
                "Payment does not belong to this account".to_string()
            }
            SubscriptionError::ProfileUpdateFailed { .. } => {
                "Payment verified but subscription could not be activated".to_string()
            }
            SubscriptionError::ProfileNotFound(_) => "Profile not found".to_string(),
            SubscriptionError::ProfileUnavailable(_) => {
                "Profile is temporarily unavailable".to_string()
            }
            SubscriptionError::Infrastructure(_) => "Internal server error".to_string(),
        }
    }

    /// Diagnostic detail for operators, included in some responses.
    pub fn details(&self) -> Option<String> {
        match self {
            SubscriptionError::ProfileUpdateFailed { payment_id, reason } => {
                Some(format!("payment {}: {}", payment_id, reason))
            }
            _ => None,
        }
    }

    /// True if the caller may retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubscriptionError::GatewayUnavailable(_) | SubscriptionError::ProfileUnavailable(_)
        )
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionError::GatewayUnavailable(reason)
            | SubscriptionError::GatewayMisconfigured(reason)
            | SubscriptionError::ProfileUnavailable(reason)
            | SubscriptionError::Infrastructure(reason) => {
                write!(f, "{}: {}", self.message(), reason)
            }
            _ => match self.details() {
                Some(details) => write!(f, "{} ({})", self.message(), details),
                None => write!(f, "{}", self.message()),
            },
        }
    }
}

impl std::error::Error for SubscriptionError {}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::InvalidRequest {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
