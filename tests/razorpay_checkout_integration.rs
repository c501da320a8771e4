//! Checkout through the real Razorpay adapter against a local stub gateway.
//!
//! The stub echoes the order request back the way Razorpay does and serves
//! created orders back by id, so the whole path runs over real HTTP:
//! client → router → reqwest → stub.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use nox_billing::adapters::auth::MockSessionValidator;
use nox_billing::adapters::clock::FixedClock;
use nox_billing::adapters::http::{create_app, HttpSettings, SubscriptionAppState};
use nox_billing::adapters::memory::{InMemoryPaymentLedger, InMemoryProfileStore};
use nox_billing::adapters::razorpay::{RazorpayConfig, RazorpayGateway};
use nox_billing::domain::foundation::{Timestamp, UserId};
use nox_billing::domain::subscription::{
    signature, CurrencyCode, PaymentSignatureVerifier, PlanCatalog, Profile,
};

const KEY_ID: &str = "rzp_test_integration";
const KEY_SECRET: &str = "integration_secret";
const TOKEN: &str = "token-bob";
const USER_ID: &str = "0d7a0f52-6a4c-4b9e-8d35-2e6f1b9c7a44";

#[derive(Clone, Default)]
struct StubLog {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    orders: Arc<Mutex<HashMap<String, Value>>>,
}

/// Serves `POST /v1/orders`, answering with an order built from the request,
/// and `GET /v1/orders/:id` for orders it created.
async fn stub_gateway(status: StatusCode, error: Option<Value>) -> (String, StubLog) {
    let log = StubLog::default();
    let state = log.clone();
    let lookup = log.clone();
    let app = Router::new()
        .route(
            "/v1/orders/:id",
            get(move |Path(id): Path<String>| {
                let lookup = lookup.clone();
                async move {
                    // Razorpay marks an order paid once a payment captures
                    match lookup.orders.lock().unwrap().get(&id).cloned() {
                        Some(mut order) => {
                            order["status"] = json!("paid");
                            (StatusCode::OK, Json(order))
                        }
                        None => (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"error": {
                                "code": "BAD_REQUEST_ERROR",
                                "description": "The id provided does not exist"
                            }})),
                        ),
                    }
                }
            }),
        )
        .route(
            "/v1/orders",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let state = state.clone();
                let error = error.clone();
                async move {
                    let auth = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    state.requests.lock().unwrap().push((auth, body.clone()));
                    let reply = error.unwrap_or_else(|| {
                        json!({
                            "id": "order_StubGateway001",
                            "entity": "order",
                            "amount": body["amount"],
                            "amount_paid": 0,
                            "amount_due": body["amount"],
                            "currency": body["currency"],
                            "receipt": body["receipt"],
                            "status": "created",
                            "attempts": 0,
                            "notes": body["notes"],
                            "created_at": 1_768_471_200
                        })
                    });
                    if status.is_success() {
                        state
                            .orders
                            .lock()
                            .unwrap()
                            .insert("order_StubGateway001".to_string(), reply.clone());
                    }
                    (status, Json(reply))
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), log)
}

async fn app_against(base_url: &str) -> (Router, InMemoryProfileStore, InMemoryPaymentLedger) {
    let now = Timestamp::from_unix_secs(1_768_471_200).unwrap();
    let profiles = InMemoryProfileStore::new();
    profiles
        .insert(Profile::new(UserId::new(USER_ID).unwrap(), None, now))
        .await;
    let ledger = InMemoryPaymentLedger::new();

    let gateway = RazorpayGateway::new(
        RazorpayConfig::new(KEY_ID, KEY_SECRET)
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(2)),
    );

    let state = SubscriptionAppState {
        gateway: Arc::new(gateway),
        profiles: Arc::new(profiles.clone()),
        ledger: Arc::new(ledger.clone()),
        verifier: Arc::new(PaymentSignatureVerifier::new(KEY_SECRET)),
        catalog: Arc::new(PlanCatalog::builtin()),
        currency: CurrencyCode::INR,
        clock: Arc::new(FixedClock::at(now)),
    };
    let validator = MockSessionValidator::new()
        .with_test_user(TOKEN, USER_ID)
        .unwrap();
    let settings = HttpSettings {
        request_timeout: Duration::from_secs(5),
        cors_origins: Vec::new(),
    };

    (
        create_app(state, Arc::new(validator), &settings),
        profiles,
        ledger,
    )
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn premium_monthly() -> Value {
    json!({
        "planSku": "premium-monthly",
        "planName": "Premium Plan",
        "planPrice": 99900,
        "durationMonths": 1
    })
}

#[tokio::test]
async fn order_from_gateway_can_be_verified_and_applied() {
    let (base, log) = stub_gateway(StatusCode::OK, None).await;
    let (router, profiles, ledger) = app_against(&base).await;

    let (status, order) = post_json(
        &router,
        "/subscriptions/create-order",
        json!({ "amount": 99900, "subscription": premium_monthly(), "receipt": "rcpt-bob-1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", order);
    assert_eq!(order["id"], "order_StubGateway001");
    assert_eq!(order["receipt"], "rcpt-bob-1");

    let requests = log.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let (auth, sent) = &requests[0];
    assert!(auth.as_deref().unwrap().starts_with("Basic "));
    assert_eq!(sent["amount"], 99900);
    assert_eq!(sent["currency"], "INR");
    assert_eq!(sent["notes"]["userId"], USER_ID);
    assert_eq!(sent["notes"]["planSku"], "premium-monthly");

    let order_id = "order_StubGateway001";
    let payment_id = "pay_StubGateway001";
    let (status, body) = post_json(
        &router,
        "/subscriptions/verify-payment",
        json!({
            "razorpayOrderId": order_id,
            "razorpayPaymentId": payment_id,
            "razorpaySignature": signature::sign(order_id, payment_id, KEY_SECRET),
            "subscription": premium_monthly()
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let profile = profiles.get(&UserId::new(USER_ID).unwrap()).await.unwrap();
    assert_eq!(profile.subscription.plan_sku.as_deref(), Some("premium-monthly"));
    assert_eq!(ledger.entries().await.len(), 1);
}

#[tokio::test]
async fn gateway_rejection_message_reaches_client() {
    let error = json!({
        "error": {
            "code": "BAD_REQUEST_ERROR",
            "description": "The amount must be atleast INR 1.00",
            "field": "amount"
        }
    });
    let (base, _log) = stub_gateway(StatusCode::BAD_REQUEST, Some(error)).await;
    let (router, _, _) = app_against(&base).await;

    let (status, body) = post_json(
        &router,
        "/subscriptions/create-order",
        json!({ "amount": 99900, "subscription": premium_monthly() }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "GATEWAY_REJECTED");
    assert_eq!(body["error"], "The amount must be atleast INR 1.00");
}

#[tokio::test]
async fn unreachable_gateway_is_retryable() {
    // Nothing listens on port 9 in the test environment.
    let (router, _, ledger) = app_against("http://127.0.0.1:9").await;

    let (status, body) = post_json(
        &router,
        "/subscriptions/create-order",
        json!({ "amount": 99900, "subscription": premium_monthly() }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "GATEWAY_UNAVAILABLE");
    assert_eq!(body["retryable"], true);
    assert!(ledger.entries().await.is_empty());
}
