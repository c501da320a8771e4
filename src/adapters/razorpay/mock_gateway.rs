//! Mock payment gateway for tests and local development.
//!
//! Every order it creates is recorded and can be fetched back. An injected
//! error is returned instead of an order, never alongside one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::foundation::{OrderId, Timestamp};
use crate::domain::subscription::{NewOrder, Order, OrderStatus};
use crate::ports::{GatewayError, PaymentGateway};

/// Mock payment gateway.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::new();
/// mock.fail_next(GatewayError::unavailable("timeout"));
/// assert!(mock.create_order(order).await.is_err());
/// ```
#[derive(Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
    sequence: AtomicU64,
}

#[derive(Default)]
struct MockState {
    /// Error returned by the next call, then cleared.
    next_error: Option<GatewayError>,

    /// Error returned by every call until cleared.
    sticky_error: Option<GatewayError>,

    call_log: Vec<GatewayCall>,

    orders: HashMap<OrderId, Order>,
}

/// A recorded `create_order` call.
#[derive(Debug, Clone)]
pub struct GatewayCall {
    pub request: NewOrder,
    pub result: Result<OrderId, GatewayError>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway that refuses every request as unreachable.
    pub fn unavailable() -> Self {
        let mock = Self::new();
        mock.fail_always(GatewayError::unavailable("mock gateway unavailable"));
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    pub fn fail_next(&self, error: GatewayError) {
        self.state().next_error = Some(error);
    }

    pub fn fail_always(&self, error: GatewayError) {
        self.state().sticky_error = Some(error);
    }

    /// Registers an order as if the gateway had created it.
    pub fn insert_order(&self, order: Order) {
        self.state().orders.insert(order.id.clone(), order);
    }

    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.sticky_error = None;
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Inspection Methods
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().call_log.len()
    }

    pub fn order(&self, id: &OrderId) -> Option<Order> {
        self.state().orders.get(id).cloned()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_injected(&self) -> Option<GatewayError> {
        let mut state = self.state();
        state.next_error.take().or_else(|| state.sticky_error.clone())
    }

    fn next_order_id(&self) -> Result<OrderId, GatewayError> {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        OrderId::new(format!("order_mock{:010}", n))
            .map_err(|e| GatewayError::invalid_response(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(&self, order: NewOrder) -> Result<Order, GatewayError> {
        let injected = self.take_injected();

        if let Some(err) = injected {
            self.state().call_log.push(GatewayCall {
                request: order,
                result: Err(err.clone()),
            });
            return Err(err);
        }

        let id = self.next_order_id()?;
        let created = Order {
            id: id.clone(),
            amount: order.amount,
            currency: order.currency,
            receipt: Some(order.receipt.clone()),
            notes: order.notes.as_map().clone(),
            status: OrderStatus::Created,
            created_at: Timestamp::now(),
        };
        let mut state = self.state();
        state.orders.insert(id.clone(), created.clone());
        state.call_log.push(GatewayCall {
            request: order,
            result: Ok(id),
        });
        Ok(created)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Order, GatewayError> {
        if let Some(err) = self.take_injected() {
            return Err(err);
        }
        self.order(order_id)
            .ok_or_else(|| GatewayError::rejected("The id provided does not exist"))
    }
}
