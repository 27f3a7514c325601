//! Result store port - persistence of finished session documents.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::foundation::SessionId;
use crate::domain::interview::SessionResult;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("result not found for session {0}")]
    NotFound(SessionId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persists a result, returning where it was written.
    async fn save(&self, result: &SessionResult) -> Result<PathBuf, StorageError>;

    async fn load(&self, session_id: &SessionId) -> Result<SessionResult, StorageError>;
}
