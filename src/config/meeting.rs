//! Meeting transport configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    pub graph_base_url: String,

    /// Notification endpoint registered with the call
    pub callback_url: String,

    pub bot_app_id: String,

    pub bot_display_name: String,

    /// Meeting API request timeout in seconds
    pub timeout_secs: u64,
}

impl MeetingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.callback_url.is_empty() {
            return Err(ValidationError::MissingRequired("meeting.callback_url"));
        }
        if self.bot_app_id.is_empty() {
            return Err(ValidationError::MissingRequired("meeting.bot_app_id"));
        }
        if !is_http_url(&self.graph_base_url) {
            return Err(ValidationError::InvalidUrl("meeting.graph_base_url"));
        }
        if !is_http_url(&self.callback_url) {
            return Err(ValidationError::InvalidUrl("meeting.callback_url"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("meeting.timeout_secs"));
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            graph_base_url: "https://graph.microsoft.com/v1.0".to_string(),
            callback_url: String::new(),
            bot_app_id: String::new(),
            bot_display_name: "Interview Bot".to_string(),
            timeout_secs: 15,
        }
    }
}
