//! In-memory profile store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, UserId};
use crate::domain::subscription::{AppliedPlan, PlanGrant, Profile};
use crate::ports::ProfileStore;

/// Profiles keyed by user id behind a single lock.
///
/// `apply_plan` checks and writes under the write lock, so concurrent grants
/// for one user serialize and readers never see a half-applied plan. Every
/// payment ever granted is remembered, so an older payment replayed after a
/// newer one is still recognised.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    inner: Arc<RwLock<Inner>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
struct Inner {
    profiles: HashMap<UserId, Profile>,
    granted: HashMap<PaymentId, UserId>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a profile.
    pub async fn insert(&self, profile: Profile) {
        self.inner
            .write()
            .await
            .profiles
            .insert(profile.id.clone(), profile);
    }

    /// Snapshot without going through the outage flags.
    pub async fn get(&self, user_id: &UserId) -> Option<Profile> {
        self.inner.read().await.profiles.get(user_id).cloned()
    }

    /// Makes `get_profile` fail as if the store were down.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes `apply_plan` fail as if the store were down.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::database("profile store unavailable"));
        }
        Ok(self.inner.read().await.profiles.get(user_id).cloned())
    }

    async fn apply_plan(
        &self,
        user_id: &UserId,
        grant: &PlanGrant,
    ) -> Result<AppliedPlan, DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("profile store unavailable"));
        }

        let mut inner = self.inner.write().await;
        let Inner { profiles, granted } = &mut *inner;
        let profile = profiles.get_mut(user_id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::ProfileNotFound,
                format!("No profile for user {}", user_id),
            )
        })?;

        if let Some(owner) = granted.get(&grant.payment_id) {
            if owner != user_id {
                return Err(DomainError::new(
                    ErrorCode::PaymentUserMismatch,
                    format!("Payment {} was granted to another user", grant.payment_id),
                ));
            }
            return Ok(AppliedPlan {
                profile: profile.clone(),
                already_applied: true,
            });
        }
        if profile.plan_payment_id.as_ref() == Some(&grant.payment_id) {
            return Ok(AppliedPlan {
                profile: profile.clone(),
                already_applied: true,
            });
        }

        profile.subscription = grant.subscription();
        profile.plan_payment_id = Some(grant.payment_id.clone());
        profile.updated_at = grant.window.start;
        granted.insert(grant.payment_id.clone(), user_id.clone());

        Ok(AppliedPlan {
            profile: profile.clone(),
            already_applied: false,
        })
    }
}
