//! Meeting gateway port - joining, leaving and inspecting an online meeting.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Details returned on a successful join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingInfo {
    /// Platform identifier of the call the bot is connected to.
    pub call_id: String,
    /// Meeting identifier extracted from the join URL.
    pub meeting_id: String,
    pub join_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub display_name: Option<String>,
}

/// Errors that prevent joining. Always fatal to the session start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("invalid meeting url: {0}")]
    InvalidUrl(String),

    #[error("could not authenticate with meeting service: {0}")]
    Auth(String),

    #[error("join rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("meeting service unavailable: {0}")]
    Unavailable(String),
}

/// Errors from an already-joined meeting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeetingError {
    #[error("not connected to a meeting")]
    NotJoined,

    #[error("meeting request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("meeting service unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait MeetingGateway: Send + Sync {
    async fn join(&self, meeting_url: &str) -> Result<MeetingInfo, JoinError>;

    /// Leaves the current meeting. Calling it when not joined is a no-op.
    async fn leave(&self) -> Result<(), MeetingError>;

    async fn list_participants(&self) -> Result<Vec<Participant>, MeetingError>;
}
