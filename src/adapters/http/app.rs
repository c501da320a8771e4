//! Router assembly: routes, auth and the tower middleware stack.

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{middleware, Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::middleware::{auth_middleware, AuthState};
use super::subscription::{subscription_router, SubscriptionAppState};

/// HTTP settings taken from `ServerConfig`.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl From<&crate::config::ServerConfig> for HttpSettings {
    fn from(server: &crate::config::ServerConfig) -> Self {
        Self {
            request_timeout: server.request_timeout(),
            cors_origins: server.cors_origins_list(),
        }
    }
}

/// GET /health - Liveness check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(parsed)
}

/// Builds the full application router.
pub fn create_app(
    state: SubscriptionAppState,
    validator: AuthState,
    settings: &HttpSettings,
) -> Router {
    // Outermost first
    let stack = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&settings.cors_origins))
        .layer(TimeoutLayer::new(settings.request_timeout));

    Router::new()
        .merge(subscription_router())
        .layer(middleware::from_fn_with_state(validator, auth_middleware))
        .route("/health", get(health))
        .layer(stack)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::clock::SystemClock;
    use crate::adapters::memory::{InMemoryPaymentLedger, InMemoryProfileStore};
    use crate::adapters::razorpay::MockPaymentGateway;
    use crate::domain::subscription::{CurrencyCode, PaymentSignatureVerifier, PlanCatalog};

    fn app() -> Router {
        let state = SubscriptionAppState {
            gateway: Arc::new(MockPaymentGateway::new()),
            profiles: Arc::new(InMemoryProfileStore::new()),
            ledger: Arc::new(InMemoryPaymentLedger::new()),
            verifier: Arc::new(PaymentSignatureVerifier::new("secret")),
            catalog: Arc::new(PlanCatalog::builtin()),
            currency: CurrencyCode::INR,
            clock: Arc::new(SystemClock),
        };
        let settings = HttpSettings {
            request_timeout: Duration::from_secs(5),
            cors_origins: vec!["https://app.example.com".to_string(), "bad\norigin".to_string()],
        };
        create_app(state, Arc::new(MockSessionValidator::new()), &settings)
    }

    #[tokio::test]
    async fn health_is_public_and_carries_request_id() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn plans_are_public() {
        let response = app()
            .oneshot(Request::get("/subscriptions/plans").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn subscription_me_requires_auth() {
        let response = app()
            .oneshot(Request::get("/subscriptions/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
