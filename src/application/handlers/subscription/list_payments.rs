//! ListPaymentsHandler - the caller's payment history from the ledger.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{LedgerEntry, SubscriptionError};
use crate::ports::PaymentLedger;

pub struct ListPaymentsHandler {
    ledger: Arc<dyn PaymentLedger>,
}

impl ListPaymentsHandler {
    pub fn new(ledger: Arc<dyn PaymentLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<Vec<LedgerEntry>, SubscriptionError> {
        self.ledger.list_for_user(user_id).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to list payments");
            SubscriptionError::infrastructure(e.to_string())
        })
    }
}
