//! Result storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory that receives `interview_results_{id}.json` files
    pub results_dir: PathBuf,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.results_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("storage.results_dir"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_working_directory() {
        let config = StorageConfig::default();
        assert_eq!(config.results_dir, PathBuf::from("."));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_dir_rejected() {
        let config = StorageConfig {
            results_dir: PathBuf::new(),
        };
        assert!(config.validate().is_err());
    }
}
