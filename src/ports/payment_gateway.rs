//! Payment gateway port for order creation and lookup.
//!
//! The gateway is the source of truth for order ids and for what an order
//! was raised for. Every failure is an
//! explicit [`GatewayError`]; implementations never fabricate an order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::OrderId;
use crate::domain::subscription::{NewOrder, Order, SubscriptionError};

/// Registers orders with an external payment gateway.
///
/// No caching or automatic retry: each call registers a new order. Callers
/// wanting idempotency reuse the `receipt`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> Result<Order, GatewayError>;

    /// Reads back an order as the gateway stores it, notes included.
    async fn fetch_order(&self, order_id: &OrderId) -> Result<Order, GatewayError>;
}

/// Gateway failure with enough context to decide on retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub code: GatewayErrorCode,

    /// Human-readable message; for `Rejected` this is the gateway's own text.
    pub message: String,

    /// Gateway's error code (if available).
    pub gateway_code: Option<String>,

    pub retryable: bool,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            gateway_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_gateway_code(mut self, code: impl Into<String>) -> Self {
        self.gateway_code = Some(code.into());
        self
    }

    /// Could not reach the gateway, or it failed on its side.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Unavailable, message)
    }

    /// The gateway refused the request as invalid.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Rejected, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Authentication, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for SubscriptionError {
    fn from(err: GatewayError) -> Self {
        match err.code {
            GatewayErrorCode::Unavailable | GatewayErrorCode::InvalidResponse => {
                SubscriptionError::GatewayUnavailable(err.to_string())
            }
            GatewayErrorCode::Rejected => SubscriptionError::GatewayRejected(err.message),
            GatewayErrorCode::Authentication => {
                SubscriptionError::GatewayMisconfigured(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Connect failure, timeout, or gateway-side 5xx.
    Unavailable,

    /// 4xx: the request itself was invalid.
    Rejected,

    /// Our credentials were refused.
    Authentication,

    /// The gateway answered with something we could not parse.
    InvalidResponse,
}

impl GatewayErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayErrorCode::Unavailable)
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::Unavailable => "gateway_unavailable",
            GatewayErrorCode::Rejected => "invalid_order_request",
            GatewayErrorCode::Authentication => "authentication_error",
            GatewayErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(GatewayError::unavailable("timeout").retryable);
        assert!(!GatewayError::rejected("bad currency").retryable);
        assert!(!GatewayError::authentication("bad key").retryable);
        assert!(!GatewayError::invalid_response("garbage").retryable);
    }

    #[test]
    fn rejection_maps_to_verbatim_message() {
        let err = GatewayError::rejected("Order amount less than minimum amount allowed")
            .with_gateway_code("BAD_REQUEST_ERROR");
        assert_eq!(err.gateway_code.as_deref(), Some("BAD_REQUEST_ERROR"));

        let mapped: SubscriptionError = err.into();
        assert_eq!(
            mapped,
            SubscriptionError::GatewayRejected(
                "Order amount less than minimum amount allowed".to_string()
            )
        );
    }

    #[test]
    fn unavailable_maps_to_retryable_subscription_error() {
        let mapped: SubscriptionError = GatewayError::unavailable("connection refused").into();
        assert!(matches!(mapped, SubscriptionError::GatewayUnavailable(_)));
        assert!(mapped.is_retryable());
    }

    #[test]
    fn authentication_maps_to_misconfigured() {
        let mapped: SubscriptionError = GatewayError::authentication("Authentication failed").into();
        assert!(matches!(mapped, SubscriptionError::GatewayMisconfigured(_)));
    }

    #[test]
    fn display_includes_code() {
        let err = GatewayError::rejected("Currency is not supported");
        assert_eq!(err.to_string(), "invalid_order_request: Currency is not supported");
    }
}
