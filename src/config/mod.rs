//! Runtime settings read from the environment.
//!
//! Every key lives under the `INTERVIEW_BOT` prefix with `__` between path
//! segments, so `interview.max_questions` is `INTERVIEW_BOT__INTERVIEW__MAX_QUESTIONS`.
//! A `.env` file in the working directory is read first when present.
//!
//! ```no_run
//! use interview_conductor::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//! println!("up to {} questions", config.interview.max_questions);
//! # Ok(())
//! # }
//! ```

mod ai;
mod auth;
mod error;
mod interview;
mod meeting;
mod storage;

pub use ai::{AiConfig, AiProvider};
pub use auth::{AuthConfig, GRAPH_DEFAULT_SCOPE};
pub use error::{ConfigError, ValidationError};
pub use interview::InterviewConfig;
pub use meeting::MeetingConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// All settings, one field per section. Missing keys take section defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ai: AiConfig,
    pub auth: AuthConfig,
    pub meeting: MeetingConfig,
    pub interview: InterviewConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Reads `.env` (if any) and then the process environment.
    ///
    /// Numeric and boolean values are parsed from their string form.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = config::Environment::with_prefix("INTERVIEW_BOT")
            .separator("__")
            .list_separator(" ")
            .with_list_parse_key("auth.scopes")
            .try_parsing(true);

        Ok(config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?)
    }

    /// First invalid setting across all sections.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.auth.validate()?;
        self.meeting.validate()?;
        self.interview.validate()?;
        self.storage.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Process environment is shared between test threads.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [(&str, &str); 6] = [
        ("INTERVIEW_BOT__AI__GEMINI_API_KEY", "gm-test"),
        ("INTERVIEW_BOT__AUTH__TENANT_ID", "tenant"),
        ("INTERVIEW_BOT__AUTH__CLIENT_ID", "client"),
        ("INTERVIEW_BOT__AUTH__CLIENT_SECRET", "secret"),
        ("INTERVIEW_BOT__MEETING__CALLBACK_URL", "https://bot.example.com/callback"),
        ("INTERVIEW_BOT__MEETING__BOT_APP_ID", "app-id"),
    ];

    fn set_minimal_env() {
        for (key, value) in VARS {
            env::set_var(key, value);
        }
    }

    fn clear_env() {
        for (key, _) in VARS {
            env::remove_var(key);
        }
        env::remove_var("INTERVIEW_BOT__INTERVIEW__MAX_QUESTIONS");
        env::remove_var("INTERVIEW_BOT__STORAGE__RESULTS_DIR");
        env::remove_var("INTERVIEW_BOT__AUTH__SCOPES");
    }

    #[test]
    fn nested_keys_map_to_sections() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("INTERVIEW_BOT__INTERVIEW__MAX_QUESTIONS", "10");
        env::set_var("INTERVIEW_BOT__STORAGE__RESULTS_DIR", "/tmp/results");
        env::set_var("INTERVIEW_BOT__AUTH__SCOPES", "scope.a scope.b");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.interview.max_questions, 10);
        assert_eq!(config.interview.response_timeout_secs, 60);
        assert_eq!(config.auth.tenant_id, "tenant");
        assert_eq!(config.auth.scopes, ["scope.a", "scope.b"]);
        assert_eq!(config.storage.results_dir, std::path::PathBuf::from("/tmp/results"));
        assert!(config.ai.has_gemini());
    }

    #[test]
    fn minimal_environment_is_valid() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn bare_defaults_are_missing_an_ai_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        assert_eq!(
            AppConfig::default().validate(),
            Err(ValidationError::NoAiProviderConfigured)
        );
    }
}
