use thiserror::Error;

/// The environment could not be read into [`super::AppConfig`].
#[derive(Debug, Error)]
#[error("cannot read INTERVIEW_BOT settings: {0}")]
pub struct ConfigError(#[from] config::ConfigError);

/// A loaded setting that the interview cannot run with.
///
/// Each variant names the offending key as `section.field`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is not set")]
    MissingRequired(&'static str),

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("{0} must be an http(s) URL")]
    InvalidUrl(&'static str),

    #[error("interview.poll_interval_ms must be shorter than the response timeout")]
    PollIntervalTooLong,

    #[error("neither ai.gemini_api_key nor ai.openai_api_key is set")]
    NoAiProviderConfigured,
}
