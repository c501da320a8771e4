//! CreateOrderHandler - registers a gateway order for a plan purchase.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{
    CurrencyCode, NewOrder, Order, OrderNotes, PlanCatalog, SubscriptionError,
};
use crate::ports::{Clock, PaymentGateway};

/// Command to start checkout for a plan.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub user_id: UserId,
    pub plan_sku: String,
    /// Amount the client expects to pay, in minor units.
    pub amount: i64,
    /// Duration the client expects, checked against the catalog when sent.
    pub duration_months: Option<u32>,
    pub receipt: Option<String>,
    pub notes: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderResult {
    pub order: Order,
}

/// Validates a checkout request against the catalog and registers the order.
///
/// The gateway's answer is returned as-is. A gateway failure is an error;
/// no substitute order is ever produced.
pub struct CreateOrderHandler {
    gateway: Arc<dyn PaymentGateway>,
    catalog: Arc<PlanCatalog>,
    currency: CurrencyCode,
    clock: Arc<dyn Clock>,
}

impl CreateOrderHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        catalog: Arc<PlanCatalog>,
        currency: CurrencyCode,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            currency,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateOrderCommand,
    ) -> Result<CreateOrderResult, SubscriptionError> {
        // 1. Resolve the plan being bought
        let plan = self
            .catalog
            .get(&cmd.plan_sku)
            .ok_or_else(|| SubscriptionError::unknown_plan(&cmd.plan_sku))?;

        // 2. The charge must be exactly the plan price
        if cmd.amount <= 0 {
            return Err(SubscriptionError::invalid_request(
                "amount",
                "must be a positive integer",
            ));
        }
        if cmd.amount != plan.price {
            return Err(SubscriptionError::plan_mismatch("price", plan.price, cmd.amount));
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

        // 3. Build the order with notes tying it to user and plan
        let notes = OrderNotes::for_plan(&cmd.user_id, plan, cmd.notes)?;
        let receipt = cmd
            .receipt
            .unwrap_or_else(|| NewOrder::default_receipt(self.clock.now()));
        let new_order = NewOrder::new(plan.price, self.currency, receipt, notes)?;

        // 4. Register with the gateway
        let order = self.gateway.create_order(new_order).await.map_err(|e| {
            tracing::warn!(
                user_id = %cmd.user_id,
                plan_sku = %plan.sku,
                error = %e,
                retryable = e.retryable,
                "Order creation failed"
            );
            SubscriptionError::from(e)
        })?;

        tracing::info!(
            user_id = %cmd.user_id,
            order_id = %order.id,
            plan_sku = %plan.sku,
            amount = order.amount,
            currency = %order.currency,
            "Order created"
        );

        Ok(CreateOrderResult { order })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::domain::foundation::{OrderId, Timestamp};
    use crate::domain::subscription::{OrderStatus, Plan};
    use crate::ports::GatewayError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockGateway {
        received: Mutex<Vec<NewOrder>>,
        error: Option<GatewayError>,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                received: Mutex::new(Vec::new()),
                error: None,
            }
        }

        fn failing(error: GatewayError) -> Self {
            Self {
                received: Mutex::new(Vec::new()),
                error: Some(error),
            }
        }

        fn received(&self) -> Vec<NewOrder> {
            self.received.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn create_order(&self, order: NewOrder) -> Result<Order, GatewayError> {
            self.received.lock().unwrap().push(order.clone());
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
            Ok(Order {
                id: OrderId::new("order_test_1").unwrap(),
                amount: order.amount,
                currency: order.currency,
                receipt: Some(order.receipt),
                notes: order.notes.as_map().clone(),
                status: OrderStatus::Created,
                created_at: Timestamp::from_unix_secs(1_760_000_000).unwrap(),
            })
        }

        async fn fetch_order(&self, _order_id: &OrderId) -> Result<Order, GatewayError> {
            Err(GatewayError::rejected("not used by checkout"))
        }
    }

    fn catalog() -> Arc<PlanCatalog> {
        Arc::new(
            PlanCatalog::new(vec![
                Plan::new("premium-monthly", "Premium Plan", 49_900, 1).unwrap(),
                Plan::new("premium-annual", "Premium Annual", 999_000, 12).unwrap(),
            ])
            .unwrap(),
        )
    }

    fn handler(gateway: Arc<MockGateway>) -> CreateOrderHandler {
        let clock = FixedClock::at(Timestamp::from_unix_secs(1_700_000_000).unwrap());
        CreateOrderHandler::new(gateway, catalog(), CurrencyCode::INR, Arc::new(clock))
    }

    fn command() -> CreateOrderCommand {
        CreateOrderCommand {
            user_id: UserId::new("user-1").unwrap(),
            plan_sku: "premium-monthly".to_string(),
            amount: 49_900,
            duration_months: Some(1),
            receipt: None,
            notes: BTreeMap::new(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn creates_order_for_plan_price() {
        let gateway = Arc::new(MockGateway::new());
        let result = handler(gateway.clone()).handle(command()).await.unwrap();

        assert_eq!(result.order.amount, 49_900);
        assert_eq!(result.order.currency, CurrencyCode::INR);
        assert_eq!(result.order.status, OrderStatus::Created);

        let sent = gateway.received();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].notes.user_id(), "user-1");
        assert_eq!(sent[0].notes.plan_sku(), "premium-monthly");
    }

    #[tokio::test]
    async fn default_receipt_uses_clock() {
        let gateway = Arc::new(MockGateway::new());
        handler(gateway.clone()).handle(command()).await.unwrap();

        assert_eq!(gateway.received()[0].receipt, "receipt_1700000000000");
    }

    #[tokio::test]
    async fn caller_receipt_and_notes_are_forwarded() {
        let gateway = Arc::new(MockGateway::new());
        let mut cmd = command();
        cmd.receipt = Some("checkout-42".to_string());
        cmd.notes.insert("campaign".to_string(), "diwali".to_string());

        let result = handler(gateway.clone()).handle(cmd).await.unwrap();

        assert_eq!(result.order.receipt.as_deref(), Some("checkout-42"));
        assert_eq!(result.order.notes.get("campaign").map(String::as_str), Some("diwali"));
    }

    #[tokio::test]
    async fn each_call_creates_a_new_order() {
        let gateway = Arc::new(MockGateway::new());
        let handler = handler(gateway.clone());
        handler.handle(command()).await.unwrap();
        handler.handle(command()).await.unwrap();

        assert_eq!(gateway.received().len(), 2);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Validation
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_plan_is_rejected_before_gateway() {
        let gateway = Arc::new(MockGateway::new());
        let mut cmd = command();
        cmd.plan_sku = "enterprise".to_string();

        let result = handler(gateway.clone()).handle(cmd).await;

        assert!(matches!(result, Err(SubscriptionError::UnknownPlan(_))));
        assert!(gateway.received().is_empty());
    }

    #[tokio::test]
    async fn amount_must_match_plan_price() {
        let gateway = Arc::new(MockGateway::new());
        let mut cmd = command();
        cmd.amount = 100;

        let result = handler(gateway.clone()).handle(cmd).await;

        assert!(matches!(result, Err(SubscriptionError::PlanMismatch { .. })));
        assert!(gateway.received().is_empty());
    }

    #[tokio::test]
    async fn non_positive_amount_is_invalid_request() {
        let mut cmd = command();
        cmd.amount = 0;

        let result = handler(Arc::new(MockGateway::new())).handle(cmd).await;

        assert!(matches!(result, Err(SubscriptionError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn duration_must_match_plan() {
        let mut cmd = command();
        cmd.duration_months = Some(12);

        let result = handler(Arc::new(MockGateway::new())).handle(cmd).await;

        assert!(matches!(
            result,
            Err(SubscriptionError::PlanMismatch { ref field, .. }) if field == "durationMonths"
        ));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Gateway failures
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unreachable_gateway_is_retryable_error() {
        let gateway = Arc::new(MockGateway::failing(GatewayError::unavailable("timeout")));

        let err = handler(gateway).handle(command()).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::GatewayUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn gateway_rejection_is_surfaced_verbatim() {
        let gateway = Arc::new(MockGateway::failing(GatewayError::rejected(
            "The currency provided is not supported",
        )));

        let err = handler(gateway).handle(command()).await.unwrap_err();

        assert_eq!(err.message(), "The currency provided is not supported");
        assert!(!err.is_retryable());
    }
}
