//! JSON file result store.
//!
//! Each session is written to `interview_results_{session_id}.json` under the
//! results directory. Writes go to `<name>.json.tmp` first and are renamed
//! into place, so a reader never sees a half-written document.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::foundation::SessionId;
use crate::domain::interview::SessionResult;
use crate::ports::{ResultStore, StorageError};

#[derive(Debug, Clone)]
pub struct JsonFileResultStore {
    results_dir: PathBuf,
}

impl JsonFileResultStore {
    pub fn new<P: AsRef<Path>>(results_dir: P) -> Self {
        Self {
            results_dir: results_dir.as_ref().to_path_buf(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn result_path(&self, session_id: &SessionId) -> PathBuf {
        self.results_dir
            .join(format!("interview_results_{}.json", session_id))
    }

    fn temp_path(&self, session_id: &SessionId) -> PathBuf {
        self.results_dir
            .join(format!("interview_results_{}.json.tmp", session_id))
    }
}

#[async_trait]
impl ResultStore for JsonFileResultStore {
    async fn save(&self, result: &SessionResult) -> Result<PathBuf, StorageError> {
        let json = serde_json::to_string_pretty(result)?;

        fs::create_dir_all(&self.results_dir).await?;

        let temp_path = self.temp_path(&result.session_id);
        let final_path = self.result_path(&result.session_id);

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &final_path).await?;

        tracing::info!(
            session_id = %result.session_id,
            path = %final_path.display(),
            "saved interview result"
        );
        Ok(final_path)
    }

    async fn load(&self, session_id: &SessionId) -> Result<SessionResult, StorageError> {
        let path = self.result_path(session_id);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(*session_id))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::interview::{
        ConversationLog, ConversationSummary, SessionMetadata, SessionOutcome, Stage,
    };
    use tempfile::TempDir;

    fn cancelled_result() -> SessionResult {
        let mut log = ConversationLog::new();
        log.append_interviewer("Hello! Could you please introduce yourself?", Stage::Introduction);
        let now = Timestamp::now();
        SessionResult {
            session_id: SessionId::new(),
            transcript: log.entries().to_vec(),
            assessment: None,
            summary: ConversationSummary {
                questions_asked: 1,
                current_stage: Stage::Introduction,
                stages_covered: log.stages_covered(),
                total_exchanges: 1,
                candidate_responses: 0,
                interview_progress: "1/15".to_string(),
            },
            metadata: SessionMetadata::new(now, now, 1, 45),
            outcome: SessionOutcome::Cancelled,
        }
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileResultStore::new(dir.path());
        let result = cancelled_result();

        let path = store.save(&result).await.unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("interview_results_{}.json", result.session_id)
        );
        assert!(!store.temp_path(&result.session_id).exists());

        let loaded = store.load(&result.session_id).await.unwrap();
        assert_eq!(loaded, result);
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileResultStore::new(dir.path().join("nested").join("results"));
        let path = store.save(&cancelled_result()).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileResultStore::new(dir.path());
        let id = SessionId::new();
        assert!(matches!(store.load(&id).await, Err(StorageError::NotFound(found)) if found == id));
    }

    #[tokio::test]
    async fn output_is_pretty_json() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileResultStore::new(dir.path());
        let path = store.save(&cancelled_result()).await.unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("\n  \"session_id\""));
        assert!(text.contains("\"status\": \"cancelled\""));
    }
}
