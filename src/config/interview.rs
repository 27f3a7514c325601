//! Interview pacing and limits

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Settings handed to each turn coordinator.
///
/// Built once at startup; command line overrides are applied to the struct
/// before it is passed on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Questions asked before the interview wraps up, opening included
    pub max_questions: u32,

    /// Planned length, recorded in the assessment metadata
    pub duration_minutes: u32,

    /// How long to wait for an answer before reprompting
    pub response_timeout_secs: u64,

    pub poll_interval_ms: u64,

    /// Reprompts allowed for a single question. `None` means no limit.
    pub max_reprompts: Option<u32>,

    /// Pause between an analyzed answer and the next question
    pub inter_turn_delay_ms: u64,

    /// Pause between the closing remarks and leaving the meeting
    pub closing_grace_secs: u64,

    /// Upper bound for each speech or meeting call
    pub gateway_call_timeout_secs: u64,

    /// Upper bound for each AI call
    pub ai_call_timeout_secs: u64,

    pub participant_check_interval_secs: u64,
}

impl InterviewConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn inter_turn_delay(&self) -> Duration {
        Duration::from_millis(self.inter_turn_delay_ms)
    }

    pub fn closing_grace(&self) -> Duration {
        Duration::from_secs(self.closing_grace_secs)
    }

    pub fn gateway_call_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_call_timeout_secs)
    }

    pub fn ai_call_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_call_timeout_secs)
    }

    pub fn participant_check_interval(&self) -> Duration {
        Duration::from_secs(self.participant_check_interval_secs)
    }

    pub fn with_max_questions(mut self, max_questions: u32) -> Self {
        self.max_questions = max_questions;
        self
    }

    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = [
            (self.max_questions as u64, "interview.max_questions"),
            (self.duration_minutes as u64, "interview.duration_minutes"),
            (self.response_timeout_secs, "interview.response_timeout_secs"),
            (self.poll_interval_ms, "interview.poll_interval_ms"),
            (self.gateway_call_timeout_secs, "interview.gateway_call_timeout_secs"),
            (self.ai_call_timeout_secs, "interview.ai_call_timeout_secs"),
            (
                self.participant_check_interval_secs,
                "interview.participant_check_interval_secs",
            ),
        ];
        if let Some((_, field)) = positive.into_iter().find(|(value, _)| *value == 0) {
            return Err(ValidationError::MustBePositive(field));
        }
        if self.poll_interval() >= self.response_timeout() {
            return Err(ValidationError::PollIntervalTooLong);
        }
        Ok(())
    }
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            max_questions: 15,
            duration_minutes: 45,
            response_timeout_secs: 60,
            poll_interval_ms: 1_000,
            max_reprompts: Some(3),
            inter_turn_delay_ms: 2_000,
            closing_grace_secs: 3,
            gateway_call_timeout_secs: 30,
            ai_call_timeout_secs: 60,
            participant_check_interval_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interview_defaults() {
        let config = InterviewConfig::default();
        assert_eq!(config.max_questions, 15);
        assert_eq!(config.duration_minutes, 45);
        assert_eq!(config.response_timeout(), Duration::from_secs(60));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.max_reprompts, Some(3));
        assert_eq!(config.inter_turn_delay(), Duration::from_secs(2));
        assert_eq!(config.closing_grace(), Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = InterviewConfig::default().with_max_questions(0);
        assert_eq!(
            config.validate(),
            Err(ValidationError::MustBePositive("interview.max_questions"))
        );
    }

    #[test]
    fn test_poll_must_be_shorter_than_timeout() {
        let config = InterviewConfig {
            response_timeout_secs: 1,
            poll_interval_ms: 1_000,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::PollIntervalTooLong));
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: InterviewConfig =
            serde_json::from_str(r#"{"max_questions": 4, "max_reprompts": null}"#).unwrap();
        assert_eq!(config.max_questions, 4);
        assert_eq!(config.max_reprompts, None);
        assert_eq!(config.response_timeout_secs, 60);
    }
}
