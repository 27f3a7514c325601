//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the interview domain and the outside world. Adapters implement these ports.
//!
//! ## Session Ports
//!
//! - `AuthGateway` - Service credentials for the meeting platform
//! - `MeetingGateway` - Join, leave and inspect the meeting
//! - `SpeechGateway` - Speak utterances and stream recognized answers
//!
//! ## Intelligence Ports
//!
//! - `AIProvider` - Raw LLM completion
//! - `InterviewAI` - Opening, analysis, next question and final assessment
//!
//! ## Persistence Ports
//!
//! - `ResultStore` - Finished session documents

mod ai_provider;
mod auth_gateway;
mod interview_ai;
mod meeting_gateway;
mod result_store;
mod speech_gateway;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use auth_gateway::{AccessToken, AuthError, AuthGateway};
pub use interview_ai::{AssessmentRequest, InterviewAI, QuestionRequest};
pub use meeting_gateway::{JoinError, MeetingError, MeetingGateway, MeetingInfo, Participant};
pub use result_store::{ResultStore, StorageError};
pub use speech_gateway::{RecognitionError, SpeechError, SpeechGateway, VoiceStyle};
