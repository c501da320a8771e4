//! Payments ledger entries.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::CurrencyCode;
use super::payment::Payment;
use super::plan::Plan;
use crate::domain::foundation::{LedgerEntryId, OrderId, PaymentId, Timestamp, UserId};

/// Method tag recorded for gateway checkouts.
pub const PAYMENT_METHOD_RAZORPAY: &str = "razorpay";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerStatus {
    Completed,
}

impl LedgerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a verified payment. One per payment id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub user_id: UserId,
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub amount: i64,
    pub currency: CurrencyCode,
    pub plan_sku: String,
    pub plan_name: String,
    pub duration_months: u32,
    pub payment_method: String,
    pub status: LedgerStatus,
    pub created_at: Timestamp,
}

impl LedgerEntry {
    /// Entry for a payment that bought `plan`.
    pub fn completed(
        user_id: UserId,
        payment: &Payment,
        plan: &Plan,
        currency: CurrencyCode,
        now: Timestamp,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            user_id,
            payment_id: payment.id.clone(),
            order_id: payment.order_id.clone(),
            amount: plan.price,
            currency,
            plan_sku: plan.sku.clone(),
            plan_name: plan.name.clone(),
            duration_months: plan.duration_months,
            payment_method: PAYMENT_METHOD_RAZORPAY.to_string(),
            status: LedgerStatus::Completed,
            created_at: now,
        }
    }
}

/// Result of an append; appends are idempotent on payment id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Recorded,
    Duplicate,
}
