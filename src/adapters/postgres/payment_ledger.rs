//! PostgreSQL implementation of PaymentLedger.
//!
//! Rows are inserted once and never updated. The unique `payment_id`
//! constraint makes a replayed append a no-op.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, parse_user_id_as_uuid};
use crate::domain::foundation::{
    DomainError, ErrorCode, LedgerEntryId, OrderId, PaymentId, Timestamp, UserId,
};
use crate::domain::subscription::{AppendOutcome, CurrencyCode, LedgerEntry, LedgerStatus};
use crate::ports::PaymentLedger;

const ENTRY_COLUMNS: &str = "id, user_id, payment_id, order_id, amount, currency, plan_sku, \
     plan_name, duration_months, payment_method, status, created_at";

pub struct PostgresPaymentLedger {
    pool: PgPool,
}

impl PostgresPaymentLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    id: Uuid,
    user_id: Uuid,
    payment_id: String,
    order_id: String,
    amount: i64,
    currency: String,
    plan_sku: String,
    plan_name: String,
    duration_months: i32,
    payment_method: String,
    status: String,
    created_at: DateTime<Utc>,
}

fn corrupt(field: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Invalid {}: {}", field, e))
}

fn parse_status(s: &str) -> Result<LedgerStatus, DomainError> {
    match s {
        "completed" => Ok(LedgerStatus::Completed),
        other => Err(corrupt("status", other)),
    }
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = DomainError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        Ok(LedgerEntry {
            id: LedgerEntryId::from_uuid(row.id),
            user_id: UserId::new(row.user_id.to_string()).map_err(|e| corrupt("user_id", e))?,
            payment_id: PaymentId::new(row.payment_id).map_err(|e| corrupt("payment_id", e))?,
            order_id: OrderId::new(row.order_id).map_err(|e| corrupt("order_id", e))?,
            amount: row.amount,
            currency: CurrencyCode::parse(&row.currency).map_err(|e| corrupt("currency", e))?,
            plan_sku: row.plan_sku,
            plan_name: row.plan_name,
            duration_months: u32::try_from(row.duration_months)
                .map_err(|e| corrupt("duration_months", e))?,
            payment_method: row.payment_method,
            status: parse_status(&row.status)?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl PaymentLedger for PostgresPaymentLedger {
    async fn append(&self, entry: &LedgerEntry) -> Result<AppendOutcome, DomainError> {
        let user_id = parse_user_id_as_uuid(&entry.user_id)?;
        let duration = i32::try_from(entry.duration_months)
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, payment_id, order_id, amount, currency, plan_sku,
                plan_name, duration_months, payment_method, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (payment_id) DO NOTHING
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(user_id)
        .bind(entry.payment_id.as_str())
        .bind(entry.order_id.as_str())
        .bind(entry.amount)
        .bind(entry.currency.as_str())
        .bind(&entry.plan_sku)
        .bind(&entry.plan_name)
        .bind(duration)
        .bind(&entry.payment_method)
        .bind(entry.status.as_str())
        .bind(entry.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to append payment", e))?;

        if result.rows_affected() == 0 {
            Ok(AppendOutcome::Duplicate)
        } else {
            Ok(AppendOutcome::Recorded)
        }
    }

    async fn find_by_payment_id(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<LedgerEntry>, DomainError> {
        let row: Option<LedgerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE payment_id = $1",
            ENTRY_COLUMNS
        ))
        .bind(payment_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find payment", e))?;

        row.map(LedgerEntry::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<LedgerEntry>, DomainError> {
        let Ok(id) = parse_user_id_as_uuid(user_id) else {
            return Ok(Vec::new());
        };

        let rows: Vec<LedgerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
            ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list payments", e))?;

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }
}
