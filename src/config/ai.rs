//! Language model settings (`INTERVIEW_BOT__AI__*`).

use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub primary_provider: AiProvider,

    /// Consulted when the primary fails transiently. Ignored if it names the primary.
    pub fallback_provider: Option<AiProvider>,

    pub gemini_api_key: Option<Secret<String>>,
    pub gemini_model: String,

    pub openai_api_key: Option<Secret<String>>,
    pub openai_model: String,

    /// Per-HTTP-call limit inside the provider client.
    pub timeout_secs: u64,

    /// OpenAI client retries for transient failures.
    pub max_retries: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Gemini,
    OpenAI,
}

impl AiProvider {
    fn key_name(self) -> &'static str {
        match self {
            AiProvider::Gemini => "ai.gemini_api_key",
            AiProvider::OpenAI => "ai.openai_api_key",
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The key for `provider`; blank keys count as unset.
    pub fn api_key(&self, provider: AiProvider) -> Option<&str> {
        match provider {
            AiProvider::Gemini => self.gemini_api_key.as_ref(),
            AiProvider::OpenAI => self.openai_api_key.as_ref(),
        }
        .map(|secret| secret.expose_secret().as_str())
        .filter(|key| !key.trim().is_empty())
    }

    pub fn has_gemini(&self) -> bool {
        self.api_key(AiProvider::Gemini).is_some()
    }

    pub fn has_openai(&self) -> bool {
        self.api_key(AiProvider::OpenAI).is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_gemini() && !self.has_openai() {
            return Err(ValidationError::NoAiProviderConfigured);
        }
        if self.api_key(self.primary_provider).is_none() {
            return Err(ValidationError::MissingRequired(self.primary_provider.key_name()));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("ai.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            primary_provider: AiProvider::Gemini,
            fallback_provider: None,
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash-exp".into(),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".into(),
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}
