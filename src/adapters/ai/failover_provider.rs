//! Primary/secondary provider chain.
//!
//! A retryable failure from the primary (see [`AIError::is_retryable`]) sends
//! the same request to the secondary. Other failures are returned as is.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

pub struct FailoverAIProvider {
    primary: Arc<dyn AIProvider>,
    fallback: Option<Arc<dyn AIProvider>>,
}

impl FailoverAIProvider {
    pub fn new(primary: Arc<dyn AIProvider>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(self, fallback: Arc<dyn AIProvider>) -> Self {
        Self {
            fallback: Some(fallback),
            ..self
        }
    }
}

fn record_usage(request: &CompletionRequest, provider: &ProviderInfo, response: &CompletionResponse) {
    tracing::debug!(
        session_id = %request.metadata.session_id,
        operation = %request.metadata.trace_id,
        provider = %provider.name,
        model = %response.model,
        prompt_tokens = response.usage.prompt_tokens,
        completion_tokens = response.usage.completion_tokens,
        "completion tokens"
    );
}

#[async_trait]
impl AIProvider for FailoverAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let primary = self.primary.provider_info();
        let err = match self.primary.complete(request.clone()).await {
            Ok(response) => {
                record_usage(&request, &primary, &response);
                return Ok(response);
            }
            Err(err) => err,
        };

        let fallback = match &self.fallback {
            Some(fallback) if err.is_retryable() => fallback,
            _ => return Err(err),
        };

        let secondary = fallback.provider_info();
        tracing::warn!(
            session_id = %request.metadata.session_id,
            primary = %primary.name,
            fallback = %secondary.name,
            error = %err,
            "switching to fallback AI provider"
        );
        let response = fallback.complete(request.clone()).await?;
        record_usage(&request, &secondary, &response);
        Ok(response)
    }

    fn provider_info(&self) -> ProviderInfo {
        self.primary.provider_info()
    }
}
