//! PostgreSQL implementation of ProfileStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, parse_user_id_as_uuid};
use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, Timestamp, UserId};
use crate::domain::subscription::{AppliedPlan, PlanGrant, PlanStatus, Profile, Subscription};
use crate::ports::ProfileStore;

const PROFILE_COLUMNS: &str = "id, email, username, first_name, last_name, plan_sku, plan_name, \
     plan_price, plan_status, plan_start_date, plan_end_date, plan_payment_id, created_at, updated_at";

pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a profile.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: Option<String>,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    plan_sku: Option<String>,
    plan_name: Option<String>,
    plan_price: Option<i64>,
    plan_status: String,
    plan_start_date: Option<DateTime<Utc>>,
    plan_end_date: Option<DateTime<Utc>>,
    plan_payment_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = DomainError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let status: PlanStatus = row.plan_status.parse().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid plan_status: {}", e))
        })?;
        let plan_payment_id = row
            .plan_payment_id
            .map(PaymentId::new)
            .transpose()
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid plan_payment_id: {}", e))
            })?;

        Ok(Profile {
            id: UserId::new(row.id.to_string()).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid id: {}", e))
            })?,
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            subscription: Subscription {
                plan_sku: row.plan_sku,
                plan_name: row.plan_name,
                plan_price: row.plan_price,
                status,
                start_date: row.plan_start_date.map(Timestamp::from_datetime),
                end_date: row.plan_end_date.map(Timestamp::from_datetime),
            },
            plan_payment_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError> {
        let Ok(id) = parse_user_id_as_uuid(user_id) else {
            return Ok(None);
        };

        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load profile", e))?;

        row.map(Profile::try_from).transpose()
    }

    async fn apply_plan(
        &self,
        user_id: &UserId,
        grant: &PlanGrant,
    ) -> Result<AppliedPlan, DomainError> {
        let id = parse_user_id_as_uuid(user_id)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        // Row lock serializes concurrent grants for the same user
        let current: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM profiles WHERE id = $1 FOR UPDATE",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock profile", e))?;

        let current = current.ok_or_else(|| {
            DomainError::new(
                ErrorCode::ProfileNotFound,
                format!("No profile for user {}", user_id),
            )
        })?;

        // Any payment already in the ledger was granted before, even if the
        // profile has since moved on to a newer one.
        let recorded_for: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM payments WHERE payment_id = $1")
                .bind(grant.payment_id.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to check payment ledger", e))?;

        if let Some(owner) = recorded_for {
            tx.rollback()
                .await
                .map_err(|e| db_error("Failed to release profile lock", e))?;
            if owner != id {
                return Err(DomainError::new(
                    ErrorCode::PaymentUserMismatch,
                    format!("Payment {} is recorded for another user", grant.payment_id),
                ));
            }
            return Ok(AppliedPlan {
                profile: Profile::try_from(current)?,
                already_applied: true,
            });
        }

        if current.plan_payment_id.as_deref() == Some(grant.payment_id.as_str()) {
            tx.rollback()
                .await
                .map_err(|e| db_error("Failed to release profile lock", e))?;
            return Ok(AppliedPlan {
                profile: Profile::try_from(current)?,
                already_applied: true,
            });
        }

        let updated: ProfileRow = sqlx::query_as(&format!(
            r#"
            UPDATE profiles SET
                plan_sku = $2,
                plan_name = $3,
                plan_price = $4,
                plan_status = $5,
                plan_start_date = $6,
                plan_end_date = $7,
                plan_payment_id = $8,
                updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(&grant.plan.sku)
        .bind(&grant.plan.name)
        .bind(grant.plan.price)
        .bind(PlanStatus::Active.as_str())
        .bind(grant.window.start.as_datetime())
        .bind(grant.window.end.as_datetime())
        .bind(grant.payment_id.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to apply plan", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit plan grant", e))?;

        Ok(AppliedPlan {
            profile: Profile::try_from(updated)?,
            already_applied: false,
        })
    }
}
