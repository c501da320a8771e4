//! Gateway orders and the notes that tie them back to a user and plan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::currency::CurrencyCode;
use super::plan::Plan;
use crate::domain::foundation::{OrderId, Timestamp, UserId, ValidationError};

/// Gateway limit on the number of notes per order.
pub const MAX_NOTES: usize = 15;

/// Gateway limit on a single note value.
pub const MAX_NOTE_VALUE_LEN: usize = 256;

/// Gateway limit on the receipt reference.
pub const MAX_RECEIPT_LEN: usize = 40;

pub const NOTE_USER_ID: &str = "userId";
pub const NOTE_PLAN_SKU: &str = "planSku";
pub const NOTE_PLAN_NAME: &str = "planName";
pub const NOTE_DURATION_MONTHS: &str = "durationMonths";

/// Key/value notes attached to an order.
///
/// Always carries the purchasing user and plan so a payment callback can be
/// resolved from the order alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNotes(BTreeMap<String, String>);

impl OrderNotes {
    /// Merges caller notes with the reserved keys; reserved keys win.
    pub fn for_plan(
        user_id: &UserId,
        plan: &Plan,
        extra: BTreeMap<String, String>,
    ) -> Result<Self, ValidationError> {
        let mut notes = extra;
        notes.insert(NOTE_USER_ID.to_string(), user_id.to_string());
        notes.insert(NOTE_PLAN_SKU.to_string(), plan.sku.clone());
        notes.insert(NOTE_PLAN_NAME.to_string(), plan.name.clone());
        notes.insert(
            NOTE_DURATION_MONTHS.to_string(),
            plan.duration_months.to_string(),
        );
        Self::from_map(notes)
    }

    /// Accepts an arbitrary map as long as it names a user and plan.
    pub fn from_map(notes: BTreeMap<String, String>) -> Result<Self, ValidationError> {
        for key in [NOTE_USER_ID, NOTE_PLAN_SKU] {
            match notes.get(key) {
                Some(value) if !value.trim().is_empty() => {}
                _ => return Err(ValidationError::empty_field(format!("notes.{}", key))),
            }
        }
        if notes.len() > MAX_NOTES {
            return Err(ValidationError::out_of_range(
                "notes",
                0,
                MAX_NOTES as i64,
                notes.len() as i64,
            ));
        }
        if let Some((key, _)) = notes
            .iter()
            .find(|(_, value)| value.chars().count() > MAX_NOTE_VALUE_LEN)
        {
            return Err(ValidationError::invalid_format(
                format!("notes.{}", key),
                format!("longer than {} characters", MAX_NOTE_VALUE_LEN),
            ));
        }
        Ok(Self(notes))
    }

    pub fn user_id(&self) -> &str {
        self.get(NOTE_USER_ID).unwrap_or_default()
    }

    pub fn plan_sku(&self) -> &str {
        self.get(NOTE_PLAN_SKU).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

/// What we ask the gateway to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub amount: i64,
    pub currency: CurrencyCode,
    pub receipt: String,
    pub notes: OrderNotes,
}

impl NewOrder {
    pub fn new(
        amount: i64,
        currency: CurrencyCode,
        receipt: impl Into<String>,
        notes: OrderNotes,
    ) -> Result<Self, ValidationError> {
        if amount <= 0 {
            return Err(ValidationError::out_of_range("amount", 1, i64::MAX, amount));
        }
        let receipt = receipt.into();
        if receipt.trim().is_empty() {
            return Err(ValidationError::empty_field("receipt"));
        }
        if receipt.chars().count() > MAX_RECEIPT_LEN {
            return Err(ValidationError::invalid_format(
                "receipt",
                format!("longer than {} characters", MAX_RECEIPT_LEN),
            ));
        }
        Ok(Self {
            amount,
            currency,
            receipt,
            notes,
        })
    }

    /// Receipt used when the caller does not pick one.
    pub fn default_receipt(now: Timestamp) -> String {
        format!("receipt_{}", now.as_unix_millis())
    }
}

/// Gateway-side order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Attempted,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Attempted => "attempted",
            OrderStatus::Paid => "paid",
        }
    }
}

/// An order registered with the gateway. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub amount: i64,
    pub currency: CurrencyCode,
    pub receipt: Option<String>,
    pub notes: BTreeMap<String, String>,
    pub status: OrderStatus,
    pub created_at: Timestamp,
}

impl Order {
    /// User the order was raised for, as written into its notes.
    pub fn noted_user_id(&self) -> Option<&str> {
        self.notes.get(NOTE_USER_ID).map(String::as_str)
    }

    /// Plan the order was raised for, as written into its notes.
    pub fn noted_plan_sku(&self) -> Option<&str> {
        self.notes.get(NOTE_PLAN_SKU).map(String::as_str)
    }
}
