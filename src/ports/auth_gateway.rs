//! Auth gateway port for acquiring service credentials.
//!
//! The meeting adapter needs a bearer token for the meeting platform API.
//! Acquisition happens once at session start; failure is fatal to the start.
//!
//! # Contract
//!
//! Implementations must:
//! - Return a token valid for at least a short while after the call
//! - Cache tokens until shortly before expiry where the backend allows it
//! - Return `AuthError::CredentialsRejected` when the provider refuses the
//!   configured credentials, `AuthError::Unavailable` for transport problems

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

/// Bearer token with its expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: Secret<String>,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: Secret::new(secret.into()),
            expires_at,
        }
    }

    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True if the token expires within `margin_secs` of `now`.
    pub fn expires_within(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        self.expires_at <= now + chrono::Duration::seconds(margin_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("credentials rejected: {0}")]
    CredentialsRejected(String),

    #[error("auth service unavailable: {0}")]
    Unavailable(String),

    #[error("malformed token response: {0}")]
    InvalidResponse(String),

    #[error("auth not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Acquires a token for the given scopes.
    async fn acquire_token(&self, scopes: &[String]) -> Result<AccessToken, AuthError>;
}
