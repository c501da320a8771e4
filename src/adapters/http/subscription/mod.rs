//! HTTP adapter for subscription endpoints.
//!
//! - `POST /subscriptions/create-order` - Register a gateway order for a plan
//! - `POST /subscriptions/verify-payment` - Verify a payment and grant the plan
//! - `GET /subscriptions/me` - Current subscription and whether it is active
//! - `GET /subscriptions/payments` - Payment history
//! - `GET /subscriptions/plans` - Plan catalog

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{SubscriptionApiError, SubscriptionAppState};
pub use routes::{subscription_router, subscription_routes};
