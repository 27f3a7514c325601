//! Language model adapters.
//!
//! [`GeminiProvider`] and [`OpenAIProvider`] talk to hosted models,
//! [`FailoverAIProvider`] chains two of them, and [`MockAIProvider`] scripts
//! replies for tests. [`LlmInterviewer`] turns any of them into the
//! interviewer the coordinator drives.

mod failover_provider;
mod gemini_provider;
mod http;
mod llm_interviewer;
mod mock_provider;
mod openai_provider;

pub use failover_provider::FailoverAIProvider;
pub use gemini_provider::{GeminiConfig, GeminiProvider, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use llm_interviewer::{
    strip_code_fences, GenerationSettings, LlmInterviewer, ANALYSIS_SETTINGS, ASSESSMENT_SETTINGS,
    NEXT_QUESTION_SETTINGS, OPENING_SETTINGS,
};
pub use mock_provider::{MockAIProvider, MOCK_DEFAULT_REPLY};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
