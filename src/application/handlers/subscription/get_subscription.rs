//! GetSubscriptionHandler - the caller's subscription and whether it is active.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{ProfileLookup, Subscription, SubscriptionError};
use crate::ports::{Clock, ProfileStore};

#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSummary {
    pub subscription: Subscription,
    pub has_active_subscription: bool,
    pub checked_at: Timestamp,
}

pub struct GetSubscriptionHandler {
    profiles: Arc<dyn ProfileStore>,
    clock: Arc<dyn Clock>,
}

impl GetSubscriptionHandler {
    pub fn new(profiles: Arc<dyn ProfileStore>, clock: Arc<dyn Clock>) -> Self {
        Self { profiles, clock }
    }

    /// Reads the profile, classifying store failures as `Unavailable`.
    pub async fn lookup(&self, user_id: &UserId) -> ProfileLookup {
        match self.profiles.get_profile(user_id).await {
            Ok(Some(profile)) => ProfileLookup::Found(profile),
            Ok(None) => ProfileLookup::NotFound,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Profile lookup failed");
                ProfileLookup::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<SubscriptionSummary, SubscriptionError> {
        let now = self.clock.now();
        match self.lookup(&query.user_id).await {
            ProfileLookup::Found(profile) => Ok(SubscriptionSummary {
                has_active_subscription: profile.has_active_subscription(now),
                subscription: profile.subscription,
                checked_at: now,
            }),
            ProfileLookup::NotFound => Err(SubscriptionError::ProfileNotFound(query.user_id)),
            ProfileLookup::Unavailable { reason } => {
                Err(SubscriptionError::ProfileUnavailable(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemoryProfileStore;
    use crate::domain::foundation::PaymentId;
    use crate::domain::subscription::{Plan, PlanGrant, Profile};

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_760_000_000).unwrap()
    }

    async fn store_with_plan(granted_at: Timestamp) -> Arc<InMemoryProfileStore> {
        let store = Arc::new(InMemoryProfileStore::new());
        store.insert(Profile::new(user(), None, granted_at)).await;
        let plan = Plan::new("premium-monthly", "Premium Plan", 49_900, 1).unwrap();
        let grant = PlanGrant::new(PaymentId::new("pay_1").unwrap(), plan, granted_at).unwrap();
        store.apply_plan(&user(), &grant).await.unwrap();
        store
    }

    #[tokio::test]
    async fn current_plan_is_active() {
        let store = store_with_plan(now().add_days(-5)).await;
        let handler = GetSubscriptionHandler::new(store, Arc::new(FixedClock::at(now())));

        let summary = handler
            .handle(GetSubscriptionQuery { user_id: user() })
            .await
            .unwrap();

        assert!(summary.has_active_subscription);
        assert_eq!(summary.checked_at, now());
    }

    #[tokio::test]
    async fn lapsed_plan_with_active_status_is_not_active() {
        let store = store_with_plan(now().add_days(-60)).await;
        let handler = GetSubscriptionHandler::new(store, Arc::new(FixedClock::at(now())));

        let summary = handler
            .handle(GetSubscriptionQuery { user_id: user() })
            .await
            .unwrap();

        assert_eq!(summary.subscription.status.as_str(), "active");
        assert!(!summary.has_active_subscription);
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let handler = GetSubscriptionHandler::new(
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(FixedClock::at(now())),
        );

        let result = handler.handle(GetSubscriptionQuery { user_id: user() }).await;

        assert!(matches!(result, Err(SubscriptionError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn store_outage_is_unavailable_not_a_placeholder() {
        let store = Arc::new(InMemoryProfileStore::new());
        store.insert(Profile::new(user(), None, now())).await;
        store.fail_reads(true);
        let handler = GetSubscriptionHandler::new(store, Arc::new(FixedClock::at(now())));

        assert!(matches!(
            handler.lookup(&user()).await,
            ProfileLookup::Unavailable { .. }
        ));
        assert!(matches!(
            handler.handle(GetSubscriptionQuery { user_id: user() }).await,
            Err(SubscriptionError::ProfileUnavailable(_))
        ));
    }
}
