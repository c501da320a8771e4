//! Subscription state embedded in a user profile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::plan::Plan;
use crate::domain::foundation::{PaymentId, Timestamp, ValidationError};

/// Stored plan status. Whether a plan is *effective* also depends on its
/// end date; see [`Subscription::is_active_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Active,
    #[default]
    Inactive,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "active",
            PlanStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PlanStatus::Active),
            "inactive" => Ok(PlanStatus::Inactive),
            other => Err(ValidationError::invalid_format(
                "plan_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// `[start, end)` of an applied plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl SubscriptionWindow {
    /// Window of `duration_months` calendar months from `start`.
    pub fn starting_at(start: Timestamp, duration_months: u32) -> Result<Self, ValidationError> {
        let end = start.add_months(duration_months).ok_or_else(|| {
            ValidationError::invalid_format("plan_end_date", "subscription end is out of range")
        })?;
        Ok(Self { start, end })
    }
}

/// Subscription fields of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subscription {
    pub plan_sku: Option<String>,
    pub plan_name: Option<String>,
    pub plan_price: Option<i64>,
    pub status: PlanStatus,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

impl Subscription {
    /// The single definition of "has an active subscription".
    ///
    /// A stored `active` status with a missing or past end date is not active.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        match (self.status, self.end_date) {
            (PlanStatus::Active, Some(end)) => end.is_after(&now),
            _ => false,
        }
    }

    pub fn window(&self) -> Option<SubscriptionWindow> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(SubscriptionWindow { start, end }),
            _ => None,
        }
    }
}

/// A verified purchase to be written to a profile.
///
/// The payment id makes applying the same grant twice a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanGrant {
    pub payment_id: PaymentId,
    pub plan: Plan,
    pub window: SubscriptionWindow,
}

impl PlanGrant {
    pub fn new(payment_id: PaymentId, plan: Plan, start: Timestamp) -> Result<Self, ValidationError> {
        let window = SubscriptionWindow::starting_at(start, plan.duration_months)?;
        Ok(Self {
            payment_id,
            plan,
            window,
        })
    }

    /// Subscription state the profile holds once this grant is applied.
    pub fn subscription(&self) -> Subscription {
        Subscription {
            plan_sku: Some(self.plan.sku.clone()),
            plan_name: Some(self.plan.name.clone()),
            plan_price: Some(self.plan.price),
            status: PlanStatus::Active,
            start_date: Some(self.window.start),
            end_date: Some(self.window.end),
        }
    }
}
