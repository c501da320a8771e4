//! Profile store port - subscription fields on user profiles.
//!
//! Profiles are keyed by user id. `apply_plan` must be atomic per user:
//! readers see either the old subscription or the new one, never a mix.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::{AppliedPlan, PlanGrant, Profile};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns `Ok(None)` for an unknown user; `Err` only when the store failed.
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError>;

    /// Writes the grant's plan, price, `active` status and window.
    ///
    /// If the profile already holds a grant for the same payment id it is
    /// returned unchanged with `already_applied = true`. A missing profile
    /// is `ErrorCode::ProfileNotFound`.
    async fn apply_plan(
        &self,
        user_id: &UserId,
        grant: &PlanGrant,
    ) -> Result<AppliedPlan, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ProfileStore) {}
    }
}
