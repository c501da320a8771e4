//! Authentication configuration (Supabase)

use serde::Deserialize;
use std::fmt;

use super::error::ValidationError;
use super::server::Environment;

const MIN_JWT_SECRET_LEN: usize = 32;

/// Supabase project settings used to validate access tokens
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Supabase project URL, also the token issuer base
    pub supabase_url: String,

    /// HS256 secret the project signs access tokens with
    pub supabase_jwt_secret: String,

    /// Expected `aud` claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Clock skew tolerated when checking `exp`, in seconds
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Issuer claim Supabase puts on access tokens
    pub fn issuer(&self) -> String {
        format!("{}/auth/v1", self.supabase_url.trim_end_matches('/'))
    }

    /// Validate authentication configuration
    ///
    /// In production, requires HTTPS for the project URL.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.supabase_url.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__SUPABASE_URL"));
        }
        if self.supabase_jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__SUPABASE_JWT_SECRET"));
        }
        if self.supabase_jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ValidationError::JwtSecretTooShort);
        }
        if *environment == Environment::Production && !self.supabase_url.starts_with("https://") {
            return Err(ValidationError::SupabaseUrlMustBeHttps);
        }
        Ok(())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_jwt_secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_jwt_secret: String::new(),
            audience: default_audience(),
            leeway_secs: default_leeway(),
        }
    }
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_leeway() -> u64 {
    30
}
