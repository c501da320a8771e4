//! User profile as seen by billing.

use serde::{Deserialize, Serialize};

use super::state::Subscription;
use crate::domain::foundation::{PaymentId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscription: Subscription,
    /// Payment whose grant produced the current subscription.
    pub plan_payment_id: Option<PaymentId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    /// Fresh profile with no plan, as created at sign-up.
    pub fn new(id: UserId, email: Option<String>, now: Timestamp) -> Self {
        Self {
            id,
            email,
            username: None,
            first_name: None,
            last_name: None,
            subscription: Subscription::default(),
            plan_payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_active_subscription(&self, now: Timestamp) -> bool {
        self.subscription.is_active_at(now)
    }
}

/// Outcome of applying a grant to a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPlan {
    pub profile: Profile,
    /// The profile already carried this payment's grant; nothing was written.
    pub already_applied: bool,
}

/// What a profile read produced.
///
/// `Unavailable` means the store could not answer. It is never turned into
/// a placeholder profile, so callers cannot mistake it for "no plan".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookup {
    Found(Profile),
    NotFound,
    Unavailable { reason: String },
}

impl ProfileLookup {
    /// `None` when entitlement cannot be determined.
    pub fn has_active_subscription(&self, now: Timestamp) -> Option<bool> {
        match self {
            ProfileLookup::Found(profile) => Some(profile.has_active_subscription(now)),
            ProfileLookup::NotFound => Some(false),
            ProfileLookup::Unavailable { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::PlanStatus;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_760_000_000).unwrap()
    }

    #[test]
    fn new_profile_has_no_plan() {
        let profile = Profile::new(UserId::new("user-1").unwrap(), None, now());
        assert_eq!(profile.subscription.status, PlanStatus::Inactive);
        assert!(!profile.has_active_subscription(now()));
    }

    #[test]
    fn unavailable_lookup_has_unknown_entitlement() {
        let lookup = ProfileLookup::Unavailable {
            reason: "timeout".to_string(),
        };
        assert_eq!(lookup.has_active_subscription(now()), None);
        assert_eq!(ProfileLookup::NotFound.has_active_subscription(now()), Some(false));
    }

    #[test]
    fn found_lookup_uses_end_date() {
        let mut profile = Profile::new(UserId::new("user-1").unwrap(), None, now());
        profile.subscription.status = PlanStatus::Active;
        profile.subscription.end_date = Some(now().add_days(3));

        let lookup = ProfileLookup::Found(profile);
        assert_eq!(lookup.has_active_subscription(now()), Some(true));
        assert_eq!(lookup.has_active_subscription(now().add_days(4)), Some(false));
    }
}
