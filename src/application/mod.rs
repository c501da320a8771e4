//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::subscription::{
    CreateOrderCommand, CreateOrderHandler, CreateOrderResult, GetSubscriptionHandler,
    GetSubscriptionQuery, LedgerRecord, ListPaymentsHandler, ReconcilePaymentCommand,
    ReconcilePaymentHandler, ReconcilePaymentResult, SubscriptionSummary,
};
