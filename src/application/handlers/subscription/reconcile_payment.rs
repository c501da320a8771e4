//! ReconcilePaymentHandler - applies a verified checkout payment to a profile.
//!
//! Steps run strictly in order and stop at the first fatal failure:
//!
//! 1. Verify the payment signature. Failure: `InvalidSignature`, no writes.
//! 2. Resolve the claimed plan against the catalog.
//! 3. Fetch the order from the gateway. Its noted user, noted plan and amount
//!    must match the caller and the resolved plan.
//! 4. Look the payment up in the ledger. Recorded for another user:
//!    `PaymentUserMismatch`. Recorded for this user: the stored subscription
//!    is returned and nothing is written.
//! 5. Compute the window: now plus the plan's duration in calendar months.
//! 6. Apply the grant to the profile. Failure: `ProfileUpdateFailed`, no
//!    ledger write.
//! 7. Append to the payments ledger. Failure is logged, not returned.
//!
//! Once step 6 has committed the grant stands, whatever happens to the
//! request afterwards.

use std::sync::Arc;

use crate::domain::foundation::{ErrorCode, UserId};
use crate::domain::subscription::{
    AppendOutcome, CurrencyCode, LedgerEntry, Payment, PaymentSignatureVerifier, Plan,
    PlanCatalog, PlanGrant, Subscription, SubscriptionError,
};
use crate::ports::{Clock, PaymentGateway, PaymentLedger, ProfileStore};

/// A checkout confirmation plus the plan the client says it bought.
#[derive(Debug, Clone)]
pub struct ReconcilePaymentCommand {
    pub user_id: UserId,
    pub payment: Payment,
    pub plan_sku: String,
    pub plan_name: Option<String>,
    pub plan_price: Option<i64>,
    pub duration_months: Option<u32>,
}

/// What happened to the audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerRecord {
    Recorded,
    /// Already in the ledger from an earlier delivery.
    Duplicate,
    /// Write failed; the grant still stands.
    Failed { reason: String },
}

impl From<AppendOutcome> for LedgerRecord {
    fn from(outcome: AppendOutcome) -> Self {
        match outcome {
            AppendOutcome::Recorded => LedgerRecord::Recorded,
            AppendOutcome::Duplicate => LedgerRecord::Duplicate,
        }
    }
}

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcilePaymentResult {
    pub plan: Plan,
    /// The profile's subscription after the grant.
    pub subscription: Subscription,
    /// This payment had already been applied; the stored window is returned.
    pub already_applied: bool,
    pub ledger: LedgerRecord,
}

pub struct ReconcilePaymentHandler {
    verifier: Arc<PaymentSignatureVerifier>,
    gateway: Arc<dyn PaymentGateway>,
    catalog: Arc<PlanCatalog>,
    profiles: Arc<dyn ProfileStore>,
    ledger: Arc<dyn PaymentLedger>,
    currency: CurrencyCode,
    clock: Arc<dyn Clock>,
}

impl ReconcilePaymentHandler {
    pub fn new(
        verifier: Arc<PaymentSignatureVerifier>,
        gateway: Arc<dyn PaymentGateway>,
        catalog: Arc<PlanCatalog>,
        profiles: Arc<dyn ProfileStore>,
        ledger: Arc<dyn PaymentLedger>,
        currency: CurrencyCode,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            gateway,
            catalog,
            profiles,
            ledger,
            currency,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcilePaymentCommand,
    ) -> Result<ReconcilePaymentResult, SubscriptionError> {
        let payment = &cmd.payment;
        let user_id = &cmd.user_id;

        // 1. Verify
        if !self.verifier.verify(payment) {
            tracing::warn!(
                user_id = %user_id,
                payment_id = %payment.id,
                order_id = %payment.order_id,
                "Rejected payment with invalid signature"
            );
            return Err(SubscriptionError::InvalidSignature);
        }

        // 2. Resolve plan
        let plan = self.resolve_plan(&cmd)?;

        // 3. Check the order was raised for this user and plan
        self.check_order(payment, plan, user_id).await?;

        // 4. Replays are answered from the ledger
        if let Some(result) = self.already_recorded(payment, plan, user_id).await? {
            return Ok(result);
        }

        // 5. Compute window
        let now = self.clock.now();
        let grant = PlanGrant::new(payment.id.clone(), plan.clone(), now)?;

        // 6. Apply to profile
        let applied = self
            .profiles
            .apply_plan(user_id, &grant)
            .await
            .map_err(|e| {
                if e.code == ErrorCode::PaymentUserMismatch {
                    tracing::warn!(
                        user_id = %user_id,
                        payment_id = %payment.id,
                        "Payment was already granted to another user"
                    );
                    return SubscriptionError::payment_user_mismatch(payment.id.clone());
                }
                tracing::error!(
                    user_id = %user_id,
                    payment_id = %payment.id,
                    order_id = %payment.order_id,
                    plan_sku = %plan.sku,
                    error = %e,
                    "Payment verified but plan grant failed; manual remediation required"
                );
                SubscriptionError::profile_update_failed(payment.id.clone(), e.to_string())
            })?;

        if applied.already_applied {
            tracing::info!(
                user_id = %user_id,
                payment_id = %payment.id,
                "Payment already applied; returning stored subscription"
            );
        } else {
            tracing::info!(
                user_id = %user_id,
                payment_id = %payment.id,
                plan_sku = %plan.sku,
                end_date = %grant.window.end.to_rfc3339(),
                "Plan granted"
            );
        }

        // 7. Record ledger entry
        let entry = LedgerEntry::completed(user_id.clone(), payment, plan, self.currency, now);
        let ledger = match self.ledger.append(&entry).await {
            Ok(outcome) => LedgerRecord::from(outcome),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    payment_id = %payment.id,
                    order_id = %payment.order_id,
                    amount = entry.amount,
                    error = %e,
                    "Ledger write failed; subscription stays granted"
                );
                LedgerRecord::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(ReconcilePaymentResult {
            plan: plan.clone(),
            subscription: applied.profile.subscription,
            already_applied: applied.already_applied,
            ledger,
        })
    }

    async fn check_order(
        &self,
        payment: &Payment,
        plan: &Plan,
        user_id: &UserId,
    ) -> Result<(), SubscriptionError> {
        let order = self
            .gateway
            .fetch_order(&payment.order_id)
            .await
            .map_err(|e| {
                tracing::warn!(
                    order_id = %payment.order_id,
                    payment_id = %payment.id,
                    error = %e,
                    retryable = e.retryable,
                    "Order lookup failed"
                );
                SubscriptionError::from(e)
            })?;

        if order.noted_user_id() != Some(user_id.as_str()) {
            tracing::warn!(
                user_id = %user_id,
                order_id = %order.id,
                payment_id = %payment.id,
                "Order was raised for another user"
            );
            return Err(SubscriptionError::payment_user_mismatch(payment.id.clone()));
        }
        let noted_sku = order.noted_plan_sku().unwrap_or_default();
        if noted_sku != plan.sku {
            return Err(SubscriptionError::plan_mismatch(
                "order.planSku",
                noted_sku,
                &plan.sku,
            ));
        }
        if order.amount != plan.price {
            return Err(SubscriptionError::plan_mismatch(
                "order.amount",
                plan.price,
                order.amount,
            ));
        }
        if order.currency != self.currency {
            return Err(SubscriptionError::plan_mismatch(
                "order.currency",
                self.currency,
                order.currency,
            ));
        }
        Ok(())
    }

    /// The stored outcome when this payment is already in the ledger.
    ///
    /// A failed lookup is not fatal: the profile store still refuses to
    /// grant a payment twice.
    async fn already_recorded(
        &self,
        payment: &Payment,
        plan: &Plan,
        user_id: &UserId,
    ) -> Result<Option<ReconcilePaymentResult>, SubscriptionError> {
        let entry = match self.ledger.find_by_payment_id(&payment.id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!(
                    payment_id = %payment.id,
                    error = %e,
                    "Ledger lookup failed; relying on profile store replay check"
                );
                return Ok(None);
            }
        };

        if &entry.user_id != user_id {
            tracing::warn!(
                user_id = %user_id,
                payment_id = %payment.id,
                "Payment is recorded for another user"
            );
            return Err(SubscriptionError::payment_user_mismatch(payment.id.clone()));
        }

        let profile = self
            .profiles
            .get_profile(user_id)
            .await
            .map_err(|e| SubscriptionError::ProfileUnavailable(e.to_string()))?
            .ok_or_else(|| SubscriptionError::ProfileNotFound(user_id.clone()))?;

        tracing::info!(
            user_id = %user_id,
            payment_id = %payment.id,
            "Payment already recorded; returning stored subscription"
        );
        Ok(Some(ReconcilePaymentResult {
            plan: plan.clone(),
            subscription: profile.subscription,
            already_applied: true,
            ledger: LedgerRecord::Duplicate,
        }))
    }

    fn resolve_plan(&self, cmd: &ReconcilePaymentCommand) -> Result<&Plan, SubscriptionError> {
        let plan = self
            .catalog
            .get(&cmd.plan_sku)
            .ok_or_else(|| SubscriptionError::unknown_plan(&cmd.plan_sku))?;

        if let Some(price) = cmd.plan_price {
            if price != plan.price {
                return Err(SubscriptionError::plan_mismatch("price", plan.price, price));
            }
        }
        if let Some(months) = cmd.duration_months {
            if months != plan.duration_months {
                return Err(SubscriptionError::plan_mismatch(
                    "durationMonths",
                    plan.duration_months,
                    months,
                ));
            }
        }
        if let Some(name) = &cmd.plan_name {
            if name != &plan.name {
                return Err(SubscriptionError::plan_mismatch("name", &plan.name, name));
            }
        }
        Ok(plan)
    }
}
