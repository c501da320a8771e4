//! Razorpay Orders API payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{OrderId, Timestamp};
use crate::domain::subscription::{CurrencyCode, NewOrder, Order, OrderStatus};
use crate::ports::GatewayError;

/// `POST /v1/orders` request body.
#[derive(Debug, Serialize)]
pub(super) struct CreateOrderBody<'a> {
    pub amount: i64,
    pub currency: &'a str,
    pub receipt: &'a str,
    pub notes: &'a BTreeMap<String, String>,
}

impl<'a> From<&'a NewOrder> for CreateOrderBody<'a> {
    fn from(order: &'a NewOrder) -> Self {
        Self {
            amount: order.amount,
            currency: order.currency.as_str(),
            receipt: &order.receipt,
            notes: order.notes.as_map(),
        }
    }
}

/// Razorpay serializes empty notes as `[]` and populated ones as an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RazorpayNotes {
    Map(BTreeMap<String, String>),
    Empty(Vec<serde_json::Value>),
}

impl Default for RazorpayNotes {
    fn default() -> Self {
        RazorpayNotes::Map(BTreeMap::new())
    }
}

impl RazorpayNotes {
    pub fn into_map(self) -> BTreeMap<String, String> {
        match self {
            RazorpayNotes::Map(map) => map,
            RazorpayNotes::Empty(_) => BTreeMap::new(),
        }
    }
}

/// Order entity as returned by Razorpay.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
    #[serde(default)]
    pub notes: RazorpayNotes,
    /// Unix seconds.
    pub created_at: i64,
}

impl RazorpayOrder {
    pub fn into_order(self) -> Result<Order, GatewayError> {
        let id = OrderId::new(self.id)
            .map_err(|_| GatewayError::invalid_response("order id missing from response"))?;
        let currency = CurrencyCode::parse(&self.currency).map_err(|_| {
            GatewayError::invalid_response(format!("unexpected currency {}", self.currency))
        })?;
        let status = match self.status.as_str() {
            "created" => OrderStatus::Created,
            "attempted" => OrderStatus::Attempted,
            "paid" => OrderStatus::Paid,
            other => {
                return Err(GatewayError::invalid_response(format!(
                    "unknown order status {}",
                    other
                )))
            }
        };
        let created_at = Timestamp::from_unix_secs(self.created_at)
            .ok_or_else(|| GatewayError::invalid_response("created_at out of range"))?;

        Ok(Order {
            id,
            amount: self.amount,
            currency,
            receipt: self.receipt,
            notes: self.notes.into_map(),
            status,
            created_at,
        })
    }
}

/// Error envelope: `{"error": {"code": ..., "description": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayErrorBody {
    pub error: RazorpayErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::GatewayErrorCode;

    const ORDER_JSON: &str = r#"{
        "id": "order_EKwxwAgItmmXdp",
        "entity": "order",
        "amount": 49900,
        "amount_paid": 0,
        "amount_due": 49900,
        "currency": "INR",
        "receipt": "receipt_1",
        "offer_id": null,
        "status": "created",
        "attempts": 0,
        "notes": {"userId": "user-1", "planSku": "premium-monthly"},
        "created_at": 1582628071
    }"#;

    #[test]
    fn parses_order_entity() {
        let order: RazorpayOrder = serde_json::from_str(ORDER_JSON).unwrap();
        let order = order.into_order().unwrap();

        assert_eq!(order.id.as_str(), "order_EKwxwAgItmmXdp");
        assert_eq!(order.amount, 49_900);
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.notes.get("userId").map(String::as_str), Some("user-1"));
        assert_eq!(order.created_at.as_unix_secs(), 1_582_628_071);
    }

    #[test]
    fn empty_notes_array_becomes_empty_map() {
        let json = ORDER_JSON.replace(
            r#"{"userId": "user-1", "planSku": "premium-monthly"}"#,
            "[]",
        );
        let order: RazorpayOrder = serde_json::from_str(&json).unwrap();

        assert!(order.into_order().unwrap().notes.is_empty());
    }

    #[test]
    fn unknown_status_is_invalid_response() {
        let json = ORDER_JSON.replace(r#""created""#, r#""archived""#);
        let order: RazorpayOrder = serde_json::from_str(&json).unwrap();

        let err = order.into_order().unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::InvalidResponse);
    }

    #[test]
    fn parses_error_envelope() {
        let body: RazorpayErrorBody = serde_json::from_str(
            r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"The amount must be at least INR 1.00","source":"business","field":"amount"}}"#,
        )
        .unwrap();

        assert_eq!(body.error.code.as_deref(), Some("BAD_REQUEST_ERROR"));
        assert_eq!(body.error.field.as_deref(), Some("amount"));
    }
}
