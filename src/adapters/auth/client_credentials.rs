//! OAuth2 client-credentials token acquisition against the Microsoft identity platform.
//!
//! Tokens are requested from `{authority}/{tenant}/oauth2/v2.0/token` and
//! cached per scope set until shortly before they expire.

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::ports::{AccessToken, AuthError, AuthGateway};

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Tokens expiring within this many seconds are refreshed.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct ClientCredentialsConfig {
    pub authority: String,
    pub tenant_id: String,
    pub client_id: String,
    client_secret: Secret<String>,
    pub timeout: Duration,
}

impl ClientCredentialsConfig {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            authority: DEFAULT_AUTHORITY.to_string(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

pub struct ClientCredentialsAuth {
    config: ClientCredentialsConfig,
    http_client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, AccessToken>>>,
}

impl ClientCredentialsAuth {
    pub fn new(config: ClientCredentialsConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::NotConfigured(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    async fn request_token(&self, scope: &str) -> Result<AccessToken, AuthError> {
        let url = self.config.token_url();
        tracing::debug!(%url, scope, "requesting access token");

        let response = self
            .http_client
            .post(&url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret().as_str()),
                ("scope", scope),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach token endpoint: {}", e);
                AuthError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: TokenErrorResponse = response.json().await.unwrap_or(TokenErrorResponse {
                error: None,
                error_description: None,
            });
            let message = body
                .error_description
                .or(body.error)
                .unwrap_or_else(|| format!("token endpoint returned {}", status));
            return Err(if status.is_client_error() {
                AuthError::CredentialsRejected(message)
            } else {
                AuthError::Unavailable(message)
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        Ok(AccessToken::new(
            token.access_token,
            Utc::now() + chrono::Duration::seconds(token.expires_in),
        ))
    }
}

#[async_trait]
impl AuthGateway for ClientCredentialsAuth {
    async fn acquire_token(&self, scopes: &[String]) -> Result<AccessToken, AuthError> {
        let scope = scopes.join(" ");

        {
            let cache = self.cache.read().await;
            if let Some(token) = cache.get(&scope) {
                if !token.expires_within(Utc::now(), EXPIRY_MARGIN_SECS) {
                    tracing::debug!("using cached access token");
                    return Ok(token.clone());
                }
            }
        }

        let token = self.request_token(&scope).await?;
        tracing::info!(expires_at = %token.expires_at(), "acquired new access token");
        self.cache.write().await.insert(scope, token.clone());
        Ok(token)
    }
}

impl std::fmt::Debug for ClientCredentialsAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsAuth")
            .field("authority", &self.config.authority)
            .field("tenant_id", &self.config.tenant_id)
            .field("client_id", &self.config.client_id)
            .finish_non_exhaustive()
    }
}
