//! Payment ledger port - append-only record of verified payments.
//!
//! Gateways and clients may deliver the same confirmation more than once, so
//! appends are idempotent on payment id: a second append for the same
//! payment reports `Duplicate` and writes nothing.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, UserId};
use crate::domain::subscription::{AppendOutcome, LedgerEntry};

#[async_trait]
pub trait PaymentLedger: Send + Sync {
    async fn append(&self, entry: &LedgerEntry) -> Result<AppendOutcome, DomainError>;

    async fn find_by_payment_id(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<LedgerEntry>, DomainError>;

    /// A user's entries, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<LedgerEntry>, DomainError>;
}
