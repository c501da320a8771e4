//! Subscription command and query handlers.

mod create_order;
mod get_subscription;
mod list_payments;
mod reconcile_payment;

pub use create_order::{CreateOrderCommand, CreateOrderHandler, CreateOrderResult};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery, SubscriptionSummary};
pub use list_payments::ListPaymentsHandler;
pub use reconcile_payment::{
    LedgerRecord, ReconcilePaymentCommand, ReconcilePaymentHandler, ReconcilePaymentResult,
};
