//! Authentication configuration (OAuth2 client credentials)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token authority, e.g. `https://login.microsoftonline.com`
    pub authority: String,

    pub tenant_id: String,

    pub client_id: String,

    pub client_secret: Option<Secret<String>>,

    /// Space-separated in the environment.
    pub scopes: Vec<String>,

    /// Token request timeout in seconds
    pub timeout_secs: u64,
}

impl AuthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|s| !s.is_empty())
    }

    /// Tenant, client id and secret are required; the authority must be http(s).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tenant_id.is_empty() {
            return Err(ValidationError::MissingRequired("auth.tenant_id"));
        }
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("auth.client_id"));
        }
        if self.client_secret().is_none() {
            return Err(ValidationError::MissingRequired("auth.client_secret"));
        }
        if self.scopes.iter().all(|scope| scope.trim().is_empty()) {
            return Err(ValidationError::MissingRequired("auth.scopes"));
        }
        if !self.authority.starts_with("https://") && !self.authority.starts_with("http://") {
            return Err(ValidationError::InvalidUrl("auth.authority"));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authority: "https://login.microsoftonline.com".to_string(),
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: None,
            scopes: vec![GRAPH_DEFAULT_SCOPE.to_string()],
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AuthConfig {
        AuthConfig {
            tenant_id: "tenant".to_string(),
            client_id: "client".to_string(),
            client_secret: Some(Secret::new("secret".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn authority_defaults_to_public_cloud() {
        let config = AuthConfig::default();
        assert_eq!(config.authority, "https://login.microsoftonline.com");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.scopes, [GRAPH_DEFAULT_SCOPE]);
    }

    #[test]
    fn test_validation_requires_a_scope() {
        let config = AuthConfig {
            scopes: vec![" ".to_string()],
            ..complete()
        };
        assert_eq!(config.validate(), Err(ValidationError::MissingRequired("auth.scopes")));
    }

    #[test]
    fn test_validation_requires_credentials() {
        assert_eq!(
            AuthConfig::default().validate(),
            Err(ValidationError::MissingRequired("auth.tenant_id"))
        );
        let config = AuthConfig {
            client_secret: None,
            ..complete()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("auth.client_secret"))
        );
    }

    #[test]
    fn test_validation_rejects_bad_authority() {
        let config = AuthConfig {
            authority: "login.example.com".to_string(),
            ..complete()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUrl("auth.authority")));
    }

    #[test]
    fn test_validation_complete_config() {
        assert!(complete().validate().is_ok());
    }
}
