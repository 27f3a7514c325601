//! OpenAI chat completions client.
//!
//! Posts to `{base_url}/chat/completions` with a bearer key. Transient
//! failures are retried up to `max_retries` times with doubling waits from one
//! second; a 429 waits at least as long as the API asks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::http::{build_client, ensure_success, transport_error};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_OPENAI_MODEL.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.into(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }

    pub fn with_model(self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self
        }
    }

    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn with_max_retries(self, max_retries: u32) -> Self {
        Self { max_retries, ..self }
    }
}

pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn chat_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatBody<'a> {
        let system = request
            .system_prompt
            .as_deref()
            .map(|content| ChatMessage { role: "system", content });
        let turns = request.messages.iter().map(|message| ChatMessage {
            role: wire_role(message.role),
            content: &message.content,
        });

        ChatBody {
            model: &self.config.model,
            messages: system.into_iter().chain(turns).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&self.chat_body(request))
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.timeout))?;

        let reply: ChatReply = ensure_success(response, retry_after_hint)
            .await?
            .json()
            .await
            .map_err(|e| AIError::parse(format!("unreadable chat completion: {}", e)))?;

        reply.into_completion()
    }

    fn backoff(&self, attempt: u32, err: &AIError) -> Duration {
        let doubling = Duration::from_secs(1u64 << attempt.min(6));
        match err {
            AIError::RateLimited { retry_after_secs } => {
                doubling.max(Duration::from_secs(u64::from(*retry_after_secs)))
            }
            _ => doubling,
        }
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut attempt = 0;
        loop {
            let err = match self.attempt(&request).await {
                Ok(completion) => return Ok(completion),
                Err(err) => err,
            };
            if !err.is_retryable() || attempt >= self.config.max_retries {
                return Err(err);
            }

            let wait = self.backoff(attempt, &err);
            tracing::debug!(error = %err, attempt, wait_secs = wait.as_secs(), "retrying OpenAI request");
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", &self.config.model)
    }
}

fn wire_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

/// Reads "try again in 12s" style hints from an error body.
fn retry_after_hint(body: &str) -> Option<u32> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = parsed.pointer("/error/message")?.as_str()?;
    let (_, rest) = message.split_once("try again in ")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    model: String,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatReply {
    fn into_completion(self) -> Result<CompletionResponse, AIError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("chat completion has no choices"))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };
        let content = choice.message.content.unwrap_or_default();
        if finish_reason == FinishReason::ContentFilter && content.trim().is_empty() {
            return Err(AIError::content_filtered("completion withheld by content filter"));
        }

        Ok(CompletionResponse {
            content,
            usage: self
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
                .unwrap_or_default(),
            model: self.model,
            finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::ports::RequestMetadata;

    fn provider(config: OpenAIConfig) -> OpenAIProvider {
        OpenAIProvider::new(config).unwrap()
    }

    #[test]
    fn system_prompt_leads_the_message_list() {
        let provider = provider(OpenAIConfig::new("k").with_model("gpt-4o"));
        let request = CompletionRequest::new(RequestMetadata::new(SessionId::new(), "open"))
            .with_system_prompt("You are an interviewer")
            .with_message(MessageRole::User, "Greet Ada")
            .with_max_tokens(200);

        let body = serde_json::to_value(provider.chat_body(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Greet Ada");
        assert_eq!(body["max_tokens"], 200);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let provider = provider(OpenAIConfig::new("k").with_base_url("http://localhost:9000/v1/"));
        assert_eq!(provider.endpoint(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn retry_hint_is_read_from_error_message() {
        let body = r#"{"error":{"message":"Rate limit reached. Please try again in 12s."}}"#;
        assert_eq!(retry_after_hint(body), Some(12));
        assert_eq!(retry_after_hint("<html>busy</html>"), None);
    }

    #[test]
    fn rate_limit_waits_at_least_the_hint() {
        let provider = provider(OpenAIConfig::new("k"));
        assert_eq!(
            provider.backoff(0, &AIError::rate_limited(12)),
            Duration::from_secs(12)
        );
        assert_eq!(
            provider.backoff(2, &AIError::network("reset")),
            Duration::from_secs(4)
        );
    }

    #[test]
    fn reply_maps_usage_and_finish_reason() {
        let reply: ChatReply = serde_json::from_str(
            r#"{
                "model": "gpt-4o-mini-2024-07-18",
                "choices": [{"message": {"role": "assistant", "content": "Tell me about Rust."}, "finish_reason": "length"}],
                "usage": {"prompt_tokens": 40, "completion_tokens": 8, "total_tokens": 48}
            }"#,
        )
        .unwrap();

        let completion = reply.into_completion().unwrap();
        assert_eq!(completion.content, "Tell me about Rust.");
        assert_eq!(completion.finish_reason, FinishReason::Length);
        assert_eq!(completion.usage.total_tokens, 48);
        assert_eq!(completion.model, "gpt-4o-mini-2024-07-18");
    }

    #[test]
    fn filtered_empty_reply_is_an_error() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"model": "gpt-4o-mini", "choices": [{"message": {"content": null}, "finish_reason": "content_filter"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            reply.into_completion(),
            Err(AIError::ContentFiltered { .. })
        ));
    }

    #[test]
    fn reply_without_choices_is_a_parse_error() {
        let reply: ChatReply = serde_json::from_str(r#"{"model": "gpt-4o-mini", "choices": []}"#).unwrap();
        assert!(matches!(reply.into_completion(), Err(AIError::Parse(_))));
    }
}
