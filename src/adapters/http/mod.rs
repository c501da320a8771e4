//! HTTP adapters - REST API for subscription checkout and reconciliation.

pub mod app;
pub mod middleware;
pub mod subscription;

pub use app::{create_app, health, HttpSettings};
pub use subscription::{subscription_router, SubscriptionApiError, SubscriptionAppState};
