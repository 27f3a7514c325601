//! Scripted [`AIProvider`] for tests.
//!
//! Replies are queued per operation label (`RequestMetadata::trace_id`) or in
//! a shared queue. A request takes the next reply for its label, then the next
//! shared reply, then a canned default.
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response_for("open", "Hello Ada, please introduce yourself.")
//!     .with_error_for("analyze", AIError::unavailable("down"));
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

pub const MOCK_DEFAULT_REPLY: &str = "Mock response";

type Reply = Result<String, AIError>;

#[derive(Debug, Default)]
struct Script {
    shared: VecDeque<Reply>,
    routed: HashMap<String, VecDeque<Reply>>,
    calls: Vec<CompletionRequest>,
}

impl Script {
    fn next_for(&mut self, operation: &str) -> Reply {
        self.routed
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.shared.pop_front())
            .unwrap_or_else(|| Ok(MOCK_DEFAULT_REPLY.to_string()))
    }
}

/// Clones share one script, so a test can keep a handle for call inspection.
#[derive(Debug, Clone, Default)]
pub struct MockAIProvider {
    script: Arc<Mutex<Script>>,
    delay: Duration,
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn queue(self, operation: Option<&str>, reply: Reply) -> Self {
        {
            let mut script = self.script();
            match operation {
                Some(operation) => script
                    .routed
                    .entry(operation.to_string())
                    .or_default()
                    .push_back(reply),
                None => script.shared.push_back(reply),
            }
        }
        self
    }

    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.queue(None, Ok(content.into()))
    }

    pub fn with_error(self, error: AIError) -> Self {
        self.queue(None, Err(error))
    }

    pub fn with_response_for(self, operation: &str, content: impl Into<String>) -> Self {
        self.queue(Some(operation), Ok(content.into()))
    }

    pub fn with_error_for(self, operation: &str, error: AIError) -> Self {
        self.queue(Some(operation), Err(error))
    }

    /// Latency added before every reply.
    pub fn with_delay(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }

    pub fn call_count(&self) -> usize {
        self.script().calls.len()
    }

    pub fn calls_for(&self, operation: &str) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|call| call.metadata.trace_id == operation)
            .count()
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.script().calls.clone()
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let reply = {
            let mut script = self.script();
            let reply = script.next_for(&request.metadata.trace_id);
            script.calls.push(request);
            reply
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        reply.map(|content| CompletionResponse {
            content,
            usage: TokenUsage::new(10, 20),
            model: "mock-model-1".to_string(),
            finish_reason: FinishReason::Stop,
        })
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model-1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::ports::{MessageRole, RequestMetadata};

    fn request(operation: &str) -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(SessionId::new(), operation))
            .with_message(MessageRole::User, "Hello")
    }

    #[tokio::test]
    async fn shared_queue_drains_then_defaults() {
        let provider = MockAIProvider::new().with_response("First").with_response("Second");

        let mut contents = Vec::new();
        for _ in 0..3 {
            contents.push(provider.complete(request("any")).await.unwrap().content);
        }

        assert_eq!(contents, ["First", "Second", MOCK_DEFAULT_REPLY]);
    }

    #[tokio::test]
    async fn labelled_reply_wins_over_shared() {
        let provider = MockAIProvider::new()
            .with_response("shared")
            .with_response_for("analyze", "{\"routed\": true}");

        let routed = provider.complete(request("analyze")).await.unwrap();
        let shared = provider.complete(request("open")).await.unwrap();

        assert_eq!(routed.content, "{\"routed\": true}");
        assert_eq!(shared.content, "shared");
        assert_eq!(provider.calls_for("analyze"), 1);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn scripted_error_is_returned_once() {
        let provider = MockAIProvider::new().with_error_for("open", AIError::rate_limited(30));

        let err = provider.complete(request("open")).await.unwrap_err();
        assert_eq!(err, AIError::rate_limited(30));
        assert!(provider.complete(request("open")).await.is_ok());
    }

    #[tokio::test]
    async fn clones_see_the_same_calls() {
        let provider = MockAIProvider::new();
        let observer = provider.clone();
        provider.complete(request("next_question")).await.unwrap();

        let seen = observer.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].metadata.trace_id, "next_question");
    }

    #[tokio::test(start_paused = true)]
    async fn delay_applies_before_reply() {
        let provider = MockAIProvider::new().with_delay(Duration::from_secs(90));

        let start = tokio::time::Instant::now();
        provider.complete(request("final_assessment")).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(90));
    }
}
