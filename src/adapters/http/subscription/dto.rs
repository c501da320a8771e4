//! HTTP DTOs for subscription endpoints.
//!
//! Field names are camelCase on the wire. Request fields are optional at the
//! serde level so a missing field comes back as `INVALID_REQUEST` naming the
//! field, rather than a generic deserialization failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::application::handlers::subscription::{ReconcilePaymentResult, SubscriptionSummary};
use crate::domain::subscription::{CurrencyCode, LedgerEntry, Order, Plan, SubscriptionError};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Plan the client is checking out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSelection {
    pub plan_sku: Option<String>,
    pub plan_name: Option<String>,
    pub plan_price: Option<i64>,
    pub duration_months: Option<u32>,
}

/// `POST /subscriptions/create-order`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub amount: Option<i64>,
    pub subscription: Option<PlanSelection>,
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: BTreeMap<String, serde_json::Value>,
}

/// `POST /subscriptions/verify-payment`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub subscription: Option<PlanSelection>,
}

/// Pulls a required field or names it in the error.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, SubscriptionError> {
    value.ok_or_else(|| SubscriptionError::invalid_request(field, "is required"))
}

/// Like [`required`], also rejecting blank strings.
pub fn required_str(value: Option<String>, field: &str) -> Result<String, SubscriptionError> {
    let value = required(value, field)?;
    if value.trim().is_empty() {
        return Err(SubscriptionError::invalid_request(field, "must not be empty"));
    }
    Ok(value)
}

/// Gateway notes are string-valued; scalars are stringified, others refused.
pub fn notes_to_strings(
    notes: BTreeMap<String, serde_json::Value>,
) -> Result<BTreeMap<String, String>, SubscriptionError> {
    notes
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(SubscriptionError::invalid_request(
                        format!("notes.{}", key),
                        "must be a string, number or boolean",
                    ))
                }
            };
            Ok((key, value))
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Gateway order as returned to the checkout client.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub notes: BTreeMap<String, String>,
    pub status: String,
    /// Unix seconds, as the gateway reports it.
    pub created_at: i64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            amount: order.amount,
            currency: order.currency.to_string(),
            receipt: order.receipt,
            notes: order.notes,
            status: order.status.as_str().to_string(),
            created_at: order.created_at.as_unix_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatedPlan {
    pub name: String,
    pub sku: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    pub plan: ActivatedPlan,
    pub already_applied: bool,
}

impl From<ReconcilePaymentResult> for VerifyPaymentResponse {
    fn from(result: ReconcilePaymentResult) -> Self {
        Self {
            success: true,
            message: "Subscription activated successfully".to_string(),
            plan: ActivatedPlan {
                name: result.plan.name,
                sku: result.plan.sku,
                start_date: result.subscription.start_date.map(|t| t.to_rfc3339()),
                end_date: result.subscription.end_date.map(|t| t.to_rfc3339()),
            },
            already_applied: result.already_applied,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPlan {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// `GET /subscriptions/me`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub has_active_subscription: bool,
    pub checked_at: String,
    /// Null until a plan has ever been applied.
    pub plan: Option<CurrentPlan>,
}

impl From<SubscriptionSummary> for SubscriptionResponse {
    fn from(summary: SubscriptionSummary) -> Self {
        let sub = summary.subscription;
        let plan = sub.plan_sku.is_some().then(|| CurrentPlan {
            sku: sub.plan_sku.clone(),
            name: sub.plan_name.clone(),
            price: sub.plan_price,
            status: sub.status.as_str().to_string(),
            start_date: sub.start_date.map(|t| t.to_rfc3339()),
            end_date: sub.end_date.map(|t| t.to_rfc3339()),
        });
        Self {
            has_active_subscription: summary.has_active_subscription,
            checked_at: summary.checked_at.to_rfc3339(),
            plan,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecordResponse {
    pub payment_id: String,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub plan_sku: String,
    pub plan_name: String,
    pub duration_months: u32,
    pub payment_method: String,
    pub status: String,
    pub created_at: String,
}

impl From<LedgerEntry> for PaymentRecordResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            payment_id: entry.payment_id.to_string(),
            order_id: entry.order_id.to_string(),
            amount: entry.amount,
            currency: entry.currency.to_string(),
            plan_sku: entry.plan_sku,
            plan_name: entry.plan_name,
            duration_months: entry.duration_months,
            payment_method: entry.payment_method,
            status: entry.status.to_string(),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentsResponse {
    pub payments: Vec<PaymentRecordResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub currency: String,
    pub duration_months: u32,
}

impl PlanResponse {
    pub fn new(plan: &Plan, currency: CurrencyCode) -> Self {
        Self {
            sku: plan.sku.clone(),
            name: plan.name.clone(),
            price: plan.price,
            currency: currency.to_string(),
            duration_months: plan.duration_months,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<PlanResponse>,
}

/// Error body shared by every subscription endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
            details: None,
            retryable: false,
        }
    }
}

impl From<&SubscriptionError> for ErrorResponse {
    fn from(err: &SubscriptionError) -> Self {
        Self {
            success: false,
            error: err.message(),
            code: err.code().to_string(),
            details: err.details(),
            retryable: err.is_retryable(),
        }
    }
}
