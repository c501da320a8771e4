//! Supabase access token validation.
//!
//! Supabase signs session tokens with the project's JWT secret (HS256). This
//! adapter checks:
//! - **Signature** against the shared secret
//! - **Issuer (iss)**: `{project_url}/auth/v1`
//! - **Audience (aud)**: `authenticated` unless configured otherwise
//! - **Expiry (exp)**: with a small leeway for clock skew
//!
//! Nothing is fetched over the network, so validation never reports
//! `ServiceUnavailable`.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Settings for [`SupabaseSessionValidator`].
#[derive(Clone)]
pub struct SupabaseConfig {
    pub issuer: String,
    pub audience: String,
    pub leeway_secs: u64,
    jwt_secret: SecretString,
}

impl SupabaseConfig {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        jwt_secret: impl Into<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            leeway_secs: 30,
            jwt_secret: SecretString::new(jwt_secret.into()),
        }
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

impl From<&AuthConfig> for SupabaseConfig {
    fn from(config: &AuthConfig) -> Self {
        SupabaseConfig::new(
            config.issuer(),
            &config.audience,
            config.supabase_jwt_secret.clone(),
        )
        .with_leeway(config.leeway_secs)
    }
}

/// Claims Supabase puts on access tokens that we use.
#[derive(Debug, Serialize, Deserialize)]
struct SupabaseClaims {
    sub: String,
    exp: i64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

pub struct SupabaseSessionValidator {
    config: SupabaseConfig,
    decoding_key: DecodingKey,
}

impl SupabaseSessionValidator {
    pub fn new(config: SupabaseConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes());
        Self {
            config,
            decoding_key,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.leeway = self.config.leeway_secs;
        validation.set_required_spec_claims(&["exp", "iss", "sub", "aud"]);
        validation
    }
}

#[async_trait]
impl SessionValidator for SupabaseSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<SupabaseClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                other => {
                    tracing::debug!(reason = ?other, "Rejected access token");
                    AuthError::InvalidToken
                }
            })?;

        let claims = data.claims;
        let id = UserId::new(claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthenticatedUser::new(
            id,
            claims.email,
            claims.role.unwrap_or_else(|| "authenticated".to_string()),
        ))
    }
}
