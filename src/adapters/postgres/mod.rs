//! PostgreSQL adapters - Database implementations for the storage ports.
//!
//! - `PostgresProfileStore` - Subscription fields on `profiles`
//! - `PostgresPaymentLedger` - Append-only `payments` table
//!
//! Both expect the schema in `migrations/`; see [`run_migrations`].

mod payment_ledger;
mod profile_store;

pub use payment_ledger::PostgresPaymentLedger;
pub use profile_store::PostgresProfileStore;

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Applies the bundled migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Supabase user ids are UUIDs; anything else cannot be in the table.
fn parse_user_id_as_uuid(user_id: &UserId) -> Result<Uuid, DomainError> {
    Uuid::parse_str(user_id.as_str()).map_err(|e| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("User ID must be a valid UUID: {}", e),
        )
    })
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, e))
}
