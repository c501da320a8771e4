//! Payment gateway configuration (Razorpay)

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::subscription::CurrencyCode;

/// Razorpay credentials and request settings.
///
/// The key secret signs checkout callbacks as well as authenticating
/// order creation, so it is redacted from `Debug` output.
#[derive(Clone, Deserialize)]
pub struct PaymentConfig {
    /// Public key id (`rzp_test_...` or `rzp_live_...`)
    pub razorpay_key_id: String,

    /// Key secret shared with the gateway
    pub razorpay_key_secret: String,

    /// Gateway API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// ISO currency used for every order
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.razorpay_key_id.starts_with("rzp_test_")
    }

    pub fn is_live_mode(&self) -> bool {
        self.razorpay_key_id.starts_with("rzp_live_")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parsed order currency
    pub fn currency_code(&self) -> Result<CurrencyCode, ValidationError> {
        CurrencyCode::parse(&self.currency)
            .map_err(|_| ValidationError::UnsupportedCurrency(self.currency.clone()))
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.razorpay_key_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__RAZORPAY_KEY_ID"));
        }
        if self.razorpay_key_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__RAZORPAY_KEY_SECRET"));
        }
        if !self.is_test_mode() && !self.is_live_mode() {
            return Err(ValidationError::InvalidRazorpayKeyId);
        }
        if *environment == Environment::Production && self.is_test_mode() {
            return Err(ValidationError::TestKeyInProduction);
        }
        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://") {
            return Err(ValidationError::InvalidGatewayUrl);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        self.currency_code()?;
        Ok(())
    }
}

impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("razorpay_key_id", &self.razorpay_key_id)
            .field("razorpay_key_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("currency", &self.currency)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            razorpay_key_id: String::new(),
            razorpay_key_secret: String::new(),
            api_base_url: default_api_base_url(),
            currency: default_currency(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.razorpay.com".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_request_timeout() -> u64 {
    10
}
