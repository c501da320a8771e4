//! In-memory payments ledger.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, PaymentId, UserId};
use crate::domain::subscription::{AppendOutcome, LedgerEntry};
use crate::ports::PaymentLedger;

#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentLedger {
    entries: Arc<RwLock<Vec<LedgerEntry>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryPaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry in append order.
    pub async fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.read().await.clone()
    }

    /// Makes every call fail as if the ledger were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::database("payments ledger unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    async fn append(&self, entry: &LedgerEntry) -> Result<AppendOutcome, DomainError> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.payment_id == entry.payment_id) {
            return Ok(AppendOutcome::Duplicate);
        }
        entries.push(entry.clone());
        Ok(AppendOutcome::Recorded)
    }

    async fn find_by_payment_id(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<LedgerEntry>, DomainError> {
        self.check_available()?;
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|e| &e.payment_id == payment_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<LedgerEntry>, DomainError> {
        self.check_available()?;
        let mut entries: Vec<LedgerEntry> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{OrderId, Timestamp};
    use crate::domain::subscription::{CurrencyCode, Payment, Plan};

    fn entry(payment: &str) -> LedgerEntry {
        let payment = Payment::new(
            PaymentId::new(payment).unwrap(),
            OrderId::new("order_1").unwrap(),
            "sig",
        );
        let plan = Plan::new("premium-monthly", "Premium Plan", 49_900, 1).unwrap();
        LedgerEntry::completed(
            UserId::new("user-1").unwrap(),
            &payment,
            &plan,
            CurrencyCode::INR,
            Timestamp::from_unix_secs(1_760_000_000).unwrap(),
        )
    }

    #[tokio::test]
    async fn duplicate_payment_ids_are_ignored() {
        let ledger = InMemoryPaymentLedger::new();

        assert_eq!(ledger.append(&entry("pay_1")).await.unwrap(), AppendOutcome::Recorded);
        assert_eq!(ledger.append(&entry("pay_1")).await.unwrap(), AppendOutcome::Duplicate);
        assert_eq!(ledger.entries().await.len(), 1);
    }

    #[tokio::test]
    async fn find_by_payment_id_returns_entry() {
        let ledger = InMemoryPaymentLedger::new();
        ledger.append(&entry("pay_1")).await.unwrap();

        let found = ledger
            .find_by_payment_id(&PaymentId::new("pay_1").unwrap())
            .await
            .unwrap();
        assert_eq!(found.unwrap().plan_sku, "premium-monthly");
        assert!(ledger
            .find_by_payment_id(&PaymentId::new("pay_2").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unavailable_ledger_rejects_appends() {
        let ledger = InMemoryPaymentLedger::new();
        ledger.set_unavailable(true);

        assert!(ledger.append(&entry("pay_1")).await.is_err());

        ledger.set_unavailable(false);
        assert!(ledger.entries().await.is_empty());
    }
}
