//! Fixed-token auth gateway for tests and local development.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::ports::{AccessToken, AuthError, AuthGateway};

/// Always returns the same token, or always fails.
#[derive(Debug)]
pub struct StaticTokenAuth {
    token: Result<String, AuthError>,
    requests: AtomicUsize,
}

impl StaticTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Ok(token.into()),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: AuthError) -> Self {
        Self {
            token: Err(error),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthGateway for StaticTokenAuth {
    async fn acquire_token(&self, _scopes: &[String]) -> Result<AccessToken, AuthError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.token
            .clone()
            .map(|t| AccessToken::new(t, Utc::now() + Duration::hours(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_token() {
        let auth = StaticTokenAuth::new("dev-token");
        let token = auth.acquire_token(&[]).await.unwrap();
        assert_eq!(token.expose(), "dev-token");
        assert_eq!(auth.request_count(), 1);
    }

    #[tokio::test]
    async fn failing_returns_error() {
        let auth = StaticTokenAuth::failing(AuthError::CredentialsRejected("bad secret".into()));
        assert!(matches!(
            auth.acquire_token(&[]).await,
            Err(AuthError::CredentialsRejected(_))
        ));
    }
}
