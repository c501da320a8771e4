//! Razorpay payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Razorpay Orders API.
//!
//! # Security
//!
//! - The key secret is held in `secrecy::SecretString` and only exposed to
//!   build the basic-auth header
//! - Payment signatures are checked with the same secret by
//!   `domain::subscription::signature`, not here
//!
//! # Configuration
//!
//! Credentials come from `PaymentConfig`:
//! - `NOX_BILLING__PAYMENT__RAZORPAY_KEY_ID`
//! - `NOX_BILLING__PAYMENT__RAZORPAY_KEY_SECRET`

mod mock_gateway;
mod razorpay_adapter;
mod wire_types;

pub use mock_gateway::{GatewayCall, MockPaymentGateway};
pub use razorpay_adapter::{RazorpayConfig, RazorpayGateway};
pub use wire_types::{RazorpayErrorBody, RazorpayErrorDetail, RazorpayNotes, RazorpayOrder};
