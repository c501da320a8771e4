//! HTTP handlers for subscription endpoints.
//!
//! These handlers connect axum routes to the subscription command/query handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::subscription::{
    CreateOrderCommand, CreateOrderHandler, GetSubscriptionHandler, GetSubscriptionQuery,
    ListPaymentsHandler, ReconcilePaymentCommand, ReconcilePaymentHandler,
};
use crate::domain::foundation::{OrderId, PaymentId};
use crate::domain::subscription::{
    CurrencyCode, Payment, PaymentSignatureVerifier, PlanCatalog, SubscriptionError,
};
use crate::ports::{Clock, PaymentGateway, PaymentLedger, ProfileStore};

use super::dto::{
    notes_to_strings, required, required_str, CreateOrderRequest, ErrorResponse, OrderResponse,
    PaymentRecordResponse, PaymentsResponse, PlanResponse, PlansResponse, SubscriptionResponse,
    VerifyPaymentRequest, VerifyPaymentResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for subscription routes; cloned per request.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub profiles: Arc<dyn ProfileStore>,
    pub ledger: Arc<dyn PaymentLedger>,
    pub verifier: Arc<PaymentSignatureVerifier>,
    pub catalog: Arc<PlanCatalog>,
    pub currency: CurrencyCode,
    pub clock: Arc<dyn Clock>,
}

impl SubscriptionAppState {
    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(
            self.gateway.clone(),
            self.catalog.clone(),
            self.currency,
            self.clock.clone(),
        )
    }

    pub fn reconcile_payment_handler(&self) -> ReconcilePaymentHandler {
        ReconcilePaymentHandler::new(
            self.verifier.clone(),
            self.gateway.clone(),
            self.catalog.clone(),
            self.profiles.clone(),
            self.ledger.clone(),
            self.currency,
            self.clock.clone(),
        )
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.profiles.clone(), self.clock.clone())
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.ledger.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /subscriptions/create-order - Register a gateway order for a plan
pub async fn create_order(
    State(state): State<SubscriptionAppState>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, SubscriptionApiError> {
    let Json(req) = body?;
    let plan = required(req.subscription, "subscription")?;

    let cmd = CreateOrderCommand {
        user_id: user.id,
        plan_sku: required_str(plan.plan_sku, "subscription.planSku")?,
        amount: required(req.amount, "amount")?,
        duration_months: plan.duration_months,
        receipt: req.receipt,
        notes: notes_to_strings(req.notes)?,
    };

    let result = state.create_order_handler().handle(cmd).await?;
    Ok(Json(OrderResponse::from(result.order)))
}

/// POST /subscriptions/verify-payment - Verify a checkout payment and grant the plan
pub async fn verify_payment(
    State(state): State<SubscriptionAppState>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<Json<VerifyPaymentResponse>, SubscriptionApiError> {
    let Json(req) = body?;

    let payment_id = PaymentId::new(required_str(req.razorpay_payment_id, "razorpayPaymentId")?)?;
    let order_id = OrderId::new(required_str(req.razorpay_order_id, "razorpayOrderId")?)?;
    let signature = required_str(req.razorpay_signature, "razorpaySignature")?;
    let plan = required(req.subscription, "subscription")?;

    let cmd = ReconcilePaymentCommand {
        user_id: user.id,
        payment: Payment::new(payment_id, order_id, signature),
        plan_sku: required_str(plan.plan_sku, "subscription.planSku")?,
        plan_name: plan.plan_name,
        plan_price: plan.plan_price,
        duration_months: plan.duration_months,
    };

    let result = state.reconcile_payment_handler().handle(cmd).await?;
    Ok(Json(VerifyPaymentResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /subscriptions/me - The caller's subscription and whether it is active
pub async fn get_subscription(
    State(state): State<SubscriptionAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<SubscriptionResponse>, SubscriptionApiError> {
    let summary = state
        .get_subscription_handler()
        .handle(GetSubscriptionQuery { user_id: user.id })
        .await?;
    Ok(Json(SubscriptionResponse::from(summary)))
}

/// GET /subscriptions/payments - The caller's payment history, newest first
pub async fn list_payments(
    State(state): State<SubscriptionAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<PaymentsResponse>, SubscriptionApiError> {
    let entries = state.list_payments_handler().handle(&user.id).await?;
    Ok(Json(PaymentsResponse {
        payments: entries.into_iter().map(PaymentRecordResponse::from).collect(),
    }))
}

/// GET /subscriptions/plans - The plan catalog (public)
pub async fn list_plans(State(state): State<SubscriptionAppState>) -> Json<PlansResponse> {
    Json(PlansResponse {
        plans: state
            .catalog
            .plans()
            .iter()
            .map(|plan| PlanResponse::new(plan, state.currency))
            .collect(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts subscription errors to HTTP responses.
#[derive(Debug)]
pub struct SubscriptionApiError(pub SubscriptionError);

impl From<SubscriptionError> for SubscriptionApiError {
    fn from(err: SubscriptionError) -> Self {
        Self(err)
    }
}

impl From<crate::domain::foundation::ValidationError> for SubscriptionApiError {
    fn from(err: crate::domain::foundation::ValidationError) -> Self {
        Self(SubscriptionError::from(err))
    }
}

impl From<JsonRejection> for SubscriptionApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(SubscriptionError::invalid_request("body", rejection.body_text()))
    }
}

impl SubscriptionApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SubscriptionError::InvalidRequest { .. }
            | SubscriptionError::UnknownPlan(_)
            | SubscriptionError::PlanMismatch { .. }
            | SubscriptionError::InvalidSignature
            | SubscriptionError::PaymentUserMismatch { .. } => StatusCode::BAD_REQUEST,
            SubscriptionError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
            SubscriptionError::ProfileUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SubscriptionError::GatewayUnavailable(_)
            | SubscriptionError::GatewayRejected(_)
            | SubscriptionError::GatewayMisconfigured(_)
            | SubscriptionError::ProfileUpdateFailed { .. }
            | SubscriptionError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SubscriptionApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "Subscription request failed");
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}
