//! Razorpay Orders API client.
//!
//! `POST /v1/orders` to create, `GET /v1/orders/{id}` to read one back, both
//! basic-auth with the key pair. Failures are
//! classified so callers can tell a retryable outage from a rejected request:
//!
//! | Outcome                      | `GatewayErrorCode` |
//! |------------------------------|--------------------|
//! | connect error, timeout, 5xx  | `Unavailable`      |
//! | 401                          | `Authentication`   |
//! | other 4xx                    | `Rejected`         |
//! | unparseable 2xx body         | `InvalidResponse`  |

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::config::PaymentConfig;
use crate::domain::foundation::OrderId;
use crate::domain::subscription::{NewOrder, Order};
use crate::ports::{GatewayError, PaymentGateway};

use super::wire_types::{CreateOrderBody, RazorpayErrorBody, RazorpayOrder};

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Razorpay API configuration.
#[derive(Clone)]
pub struct RazorpayConfig {
    key_id: String,
    key_secret: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl RazorpayConfig {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: SecretString::new(key_secret.into()),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl From<&PaymentConfig> for RazorpayConfig {
    fn from(config: &PaymentConfig) -> Self {
        RazorpayConfig::new(&config.razorpay_key_id, config.razorpay_key_secret.clone())
            .with_base_url(&config.api_base_url)
            .with_timeout(config.request_timeout())
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Razorpay implementation of `PaymentGateway`.
pub struct RazorpayGateway {
    config: RazorpayConfig,
    http_client: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn classify_failure(status: reqwest::StatusCode, body: &str) -> GatewayError {
        let detail = serde_json::from_str::<RazorpayErrorBody>(body)
            .ok()
            .map(|b| b.error);
        let description = detail.as_ref().and_then(|d| d.description.clone());
        let gateway_code = detail.and_then(|d| d.code);

        let err = if status == reqwest::StatusCode::UNAUTHORIZED {
            GatewayError::authentication(
                description.unwrap_or_else(|| "Authentication failed".to_string()),
            )
        } else if status.is_server_error() {
            GatewayError::unavailable(format!("Razorpay returned {}", status))
        } else {
            GatewayError::rejected(
                description.unwrap_or_else(|| format!("Order request rejected ({})", status)),
            )
        };

        match gateway_code {
            Some(code) => err.with_gateway_code(code),
            None => err,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, order: NewOrder) -> Result<Order, GatewayError> {
        let url = format!("{}/v1/orders", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.expose_secret()))
            .timeout(self.config.timeout)
            .json(&CreateOrderBody::from(&order))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, timeout = e.is_timeout(), "Razorpay request failed");
                GatewayError::unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = Self::classify_failure(status, &body);
            tracing::warn!(
                status = status.as_u16(),
                gateway_code = ?err.gateway_code,
                receipt = %order.receipt,
                "Razorpay refused order"
            );
            return Err(err);
        }

        let razorpay_order: RazorpayOrder = response.json().await.map_err(|e| {
            GatewayError::invalid_response(format!("Failed to parse Razorpay response: {}", e))
        })?;
        let created = razorpay_order.into_order()?;

        tracing::info!(
            order_id = %created.id,
            amount = created.amount,
            currency = %created.currency,
            "Razorpay order created"
        );
        Ok(created)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Order, GatewayError> {
        // The id becomes a path segment.
        let well_formed = order_id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !well_formed {
            return Err(GatewayError::rejected(format!("malformed order id {}", order_id)));
        }
        let url = format!("{}/v1/orders/{}", self.config.api_base_url, order_id.as_str());

        let response = self
            .http_client
            .get(&url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.expose_secret()))
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, timeout = e.is_timeout(), "Razorpay request failed");
                GatewayError::unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = Self::classify_failure(status, &body);
            tracing::warn!(
                status = status.as_u16(),
                gateway_code = ?err.gateway_code,
                order_id = %order_id,
                "Razorpay order lookup failed"
            );
            return Err(err);
        }

        let razorpay_order: RazorpayOrder = response.json().await.map_err(|e| {
            GatewayError::invalid_response(format!("Failed to parse Razorpay response: {}", e))
        })?;
        let fetched = razorpay_order.into_order()?;
        if &fetched.id != order_id {
            return Err(GatewayError::invalid_response(format!(
                "Asked for order {} but gateway returned {}",
                order_id, fetched.id
            )));
        }

        tracing::debug!(order_id = %fetched.id, status = fetched.status.as_str(), "Razorpay order fetched");
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::subscription::{CurrencyCode, OrderNotes, OrderStatus, Plan};
    use crate::ports::GatewayErrorCode;
    use axum::http::{HeaderMap, StatusCode};
    use axum::extract::Path;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured {
        auth: Arc<Mutex<Option<String>>>,
        body: Arc<Mutex<Option<serde_json::Value>>>,
        fetched: Arc<Mutex<Option<String>>>,
    }

    fn auth_of(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    async fn stub_server(status: StatusCode, reply: serde_json::Value) -> (String, Captured) {
        let captured = Captured::default();
        let state = captured.clone();
        let lookup_state = captured.clone();
        let lookup_reply = reply.clone();
        let app = Router::new()
            .route(
                "/v1/orders",
                post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                    let state = state.clone();
                    let reply = reply.clone();
                    async move {
                        *state.auth.lock().unwrap() = auth_of(&headers);
                        *state.body.lock().unwrap() = Some(body);
                        (status, Json(reply))
                    }
                }),
            )
            .route(
                "/v1/orders/:id",
                get(move |headers: HeaderMap, Path(id): Path<String>| {
                    let state = lookup_state.clone();
                    let reply = lookup_reply.clone();
                    async move {
                        *state.auth.lock().unwrap() = auth_of(&headers);
                        *state.fetched.lock().unwrap() = Some(id);
                        (status, Json(reply))
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    fn gateway(base: &str) -> RazorpayGateway {
        RazorpayGateway::new(
            RazorpayConfig::new("rzp_test_key", "test_secret")
                .with_base_url(base)
                .with_timeout(Duration::from_secs(2)),
        )
    }

    fn new_order() -> NewOrder {
        let plan = Plan::new("premium-monthly", "Premium Plan", 49_900, 1).unwrap();
        let notes =
            OrderNotes::for_plan(&UserId::new("user-1").unwrap(), &plan, BTreeMap::new()).unwrap();
        NewOrder::new(49_900, CurrencyCode::INR, "receipt_1", notes).unwrap()
    }

    fn order_reply() -> serde_json::Value {
        serde_json::json!({
            "id": "order_123",
            "entity": "order",
            "amount": 49900,
            "currency": "INR",
            "receipt": "receipt_1",
            "status": "created",
            "notes": {"userId": "user-1"},
            "created_at": 1_700_000_000
        })
    }

    #[tokio::test]
    async fn creates_order_with_basic_auth_and_json_body() {
        let (base, captured) = stub_server(StatusCode::OK, order_reply()).await;

        let order = gateway(&base).create_order(new_order()).await.unwrap();

        assert_eq!(order.id.as_str(), "order_123");
        assert_eq!(order.status, OrderStatus::Created);

        // base64("rzp_test_key:test_secret")
        assert_eq!(
            captured.auth.lock().unwrap().as_deref(),
            Some("Basic cnpwX3Rlc3Rfa2V5OnRlc3Rfc2VjcmV0")
        );
        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["amount"], 49_900);
        assert_eq!(body["currency"], "INR");
        assert_eq!(body["receipt"], "receipt_1");
        assert_eq!(body["notes"]["userId"], "user-1");
        assert_eq!(body["notes"]["planSku"], "premium-monthly");
    }

    #[tokio::test]
    async fn fetches_order_by_id_with_notes() {
        let mut reply = order_reply();
        reply["status"] = "paid".into();
        reply["notes"]["planSku"] = "premium-monthly".into();
        let (base, captured) = stub_server(StatusCode::OK, reply).await;

        let id = OrderId::new("order_123").unwrap();
        let order = gateway(&base).fetch_order(&id).await.unwrap();

        assert_eq!(captured.fetched.lock().unwrap().as_deref(), Some("order_123"));
        assert_eq!(
            captured.auth.lock().unwrap().as_deref(),
            Some("Basic cnpwX3Rlc3Rfa2V5OnRlc3Rfc2VjcmV0")
        );
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.amount, 49_900);
        assert_eq!(order.noted_user_id(), Some("user-1"));
        assert_eq!(order.noted_plan_sku(), Some("premium-monthly"));
    }

    #[tokio::test]
    async fn fetch_rejects_reply_for_a_different_order() {
        let (base, _) = stub_server(StatusCode::OK, order_reply()).await;

        let id = OrderId::new("order_999").unwrap();
        let err = gateway(&base).fetch_order(&id).await.unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn fetch_refuses_ids_that_would_leave_the_orders_path() {
        let (base, captured) = stub_server(StatusCode::OK, order_reply()).await;

        let id = OrderId::new("../payments/pay_1").unwrap();
        let err = gateway(&base).fetch_order(&id).await.unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::Rejected);
        assert!(captured.fetched.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn fetching_unknown_order_is_rejected() {
        let (base, _) = stub_server(
            StatusCode::BAD_REQUEST,
            serde_json::json!({"error": {
                "code": "BAD_REQUEST_ERROR",
                "description": "The id provided does not exist"
            }}),
        )
        .await;

        let id = OrderId::new("order_missing").unwrap();
        let err = gateway(&base).fetch_order(&id).await.unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::Rejected);
        assert_eq!(err.message, "The id provided does not exist");
    }

    #[tokio::test]
    async fn bad_request_is_rejected_with_gateway_text() {
        let (base, _) = stub_server(
            StatusCode::BAD_REQUEST,
            serde_json::json!({"error": {
                "code": "BAD_REQUEST_ERROR",
                "description": "Order amount less than minimum amount allowed"
            }}),
        )
        .await;

        let err = gateway(&base).create_order(new_order()).await.unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::Rejected);
        assert_eq!(err.message, "Order amount less than minimum amount allowed");
        assert_eq!(err.gateway_code.as_deref(), Some("BAD_REQUEST_ERROR"));
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn unauthorized_is_authentication_error() {
        let (base, _) = stub_server(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"error": {"code": "BAD_REQUEST_ERROR", "description": "Authentication failed"}}),
        )
        .await;

        let err = gateway(&base).create_order(new_order()).await.unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::Authentication);
    }

    #[tokio::test]
    async fn server_error_is_retryable_unavailable() {
        let (base, _) =
            stub_server(StatusCode::BAD_GATEWAY, serde_json::json!({"error": {}})).await;

        let err = gateway(&base).create_order(new_order()).await.unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::Unavailable);
        assert!(err.retryable);
    }

    #[tokio::test]
    async fn garbage_success_body_is_invalid_response() {
        let (base, _) = stub_server(StatusCode::OK, serde_json::json!({"unexpected": true})).await;

        let err = gateway(&base).create_order(new_order()).await.unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn unreachable_gateway_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = gateway(&format!("http://{}", addr))
            .create_order(new_order())
            .await
            .unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::Unavailable);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = RazorpayConfig::new("rzp_test_key", "very-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("rzp_test_key"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = RazorpayConfig::new("k", "s").with_base_url("http://localhost:9000/");
        assert_eq!(config.api_base_url, "http://localhost:9000");
    }
}
