//! Axum router configuration for subscription endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_order, get_subscription, list_payments, list_plans, verify_payment,
    SubscriptionAppState,
};

/// Create the subscription API router, mounted at `/subscriptions`.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `POST /create-order` - Register a gateway order
/// - `POST /verify-payment` - Verify payment and grant the plan
/// - `GET /me` - Current subscription
/// - `GET /payments` - Payment history
///
/// ## Public Endpoints
/// - `GET /plans` - Plan catalog
pub fn subscription_routes() -> Router<SubscriptionAppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify-payment", post(verify_payment))
        .route("/me", get(get_subscription))
        .route("/payments", get(list_payments))
        .route("/plans", get(list_plans))
}

pub fn subscription_router() -> Router<SubscriptionAppState> {
    Router::new().nest("/subscriptions", subscription_routes())
}
