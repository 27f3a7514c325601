//! Speech gateway port - text-to-speech output and continuous recognition.
//!
//! Recognition results never flow back through a return value. The gateway is
//! handed a [`RecognitionSink`] when listening starts and pushes each final
//! utterance into it from whatever task it runs recognition on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::interview::RecognitionSink;

/// Speaking style for synthesized utterances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceStyle {
    #[default]
    Professional,
    Friendly,
    Authoritative,
}

impl fmt::Display for VoiceStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VoiceStyle::Professional => "professional",
            VoiceStyle::Friendly => "friendly",
            VoiceStyle::Authoritative => "authoritative",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    #[error("recognition already running")]
    AlreadyListening,

    #[error("recognition could not start: {0}")]
    StartFailed(String),

    #[error("recognition could not stop cleanly: {0}")]
    StopFailed(String),
}

#[async_trait]
pub trait SpeechGateway: Send + Sync {
    /// Speaks `text` and returns once playback has finished.
    async fn speak(&self, text: &str, style: VoiceStyle) -> Result<(), SpeechError>;

    /// Starts continuous recognition, delivering final results into `sink`.
    async fn start_listening(&self, sink: RecognitionSink) -> Result<(), RecognitionError>;

    /// Stops recognition. Stopping when not listening is a no-op.
    async fn stop_listening(&self) -> Result<(), RecognitionError>;
}
