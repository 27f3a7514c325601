//! ConductInterviewHandler - runs one interview and stores its result.

use std::path::PathBuf;
use std::sync::Arc;

use super::turn_coordinator::{InterviewPorts, SessionHandle, SessionStartError, TurnCoordinator};
use crate::config::InterviewConfig;
use crate::domain::interview::{CandidateProfile, InterviewSession, RoleProfile, SessionResult};
use crate::ports::ResultStore;

/// Command to interview one candidate in one meeting.
#[derive(Debug, Clone)]
pub struct ConductInterviewCommand {
    pub candidate: CandidateProfile,
    pub role: RoleProfile,
    pub meeting_url: String,
}

/// Result of a conducted interview.
#[derive(Debug, Clone)]
pub struct ConductInterviewResult {
    pub result: SessionResult,
    /// Where the result was written. `None` if saving failed.
    pub saved_to: Option<PathBuf>,
}

/// Handler for conducting interviews.
pub struct ConductInterviewHandler {
    ports: InterviewPorts,
    store: Arc<dyn ResultStore>,
    config: InterviewConfig,
}

impl ConductInterviewHandler {
    pub fn new(ports: InterviewPorts, store: Arc<dyn ResultStore>, config: InterviewConfig) -> Self {
        Self {
            ports,
            store,
            config,
        }
    }

    /// Runs the interview until it ends or `handle` is cancelled.
    ///
    /// The result is saved whatever the outcome; a storage failure is logged
    /// and the result is still returned.
    pub async fn handle(
        &self,
        command: ConductInterviewCommand,
        handle: SessionHandle,
    ) -> Result<ConductInterviewResult, SessionStartError> {
        let session = InterviewSession::new(command.candidate, command.role);
        let session_id = session.id();
        tracing::info!(
            %session_id,
            candidate = session.candidate().name(),
            role = session.role().title(),
            max_questions = self.config.max_questions,
            "starting interview"
        );

        let coordinator = TurnCoordinator::new(session, self.config.clone(), self.ports.clone())
            .with_handle(handle);
        let result = coordinator.run(&command.meeting_url).await?;

        let saved_to = match self.store.save(&result).await {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::error!(%session_id, error = %err, "failed to save interview result");
                None
            }
        };

        Ok(ConductInterviewResult { result, saved_to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{LlmInterviewer, MockAIProvider};
    use crate::adapters::meeting::MockMeetingGateway;
    use crate::adapters::speech::MockSpeechGateway;
    use crate::adapters::storage::JsonFileResultStore;
    use crate::domain::interview::SessionOutcome;
    use crate::ports::JoinError;
    use tempfile::TempDir;

    fn ports(meeting: MockMeetingGateway, speech: MockSpeechGateway) -> InterviewPorts {
        InterviewPorts {
            meeting: Arc::new(meeting),
            speech: Arc::new(speech),
            ai: Arc::new(LlmInterviewer::new(Arc::new(MockAIProvider::new()))),
        }
    }

    fn command() -> ConductInterviewCommand {
        ConductInterviewCommand {
            candidate: CandidateProfile::new("Ada").unwrap(),
            role: RoleProfile::new("Backend Engineer"),
            meeting_url: "https://teams.microsoft.com/l/meetup-join/abc".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completed_interview_is_saved() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileResultStore::new(dir.path()));
        let handler = ConductInterviewHandler::new(
            ports(MockMeetingGateway::new(), MockSpeechGateway::new().with_answers(["hello"])),
            store.clone(),
            InterviewConfig::default().with_max_questions(1),
        );

        let conducted = handler.handle(command(), SessionHandle::new()).await.unwrap();
        assert!(conducted.result.outcome.is_completed());

        let path = conducted.saved_to.unwrap();
        assert_eq!(path, store.result_path(&conducted.result.session_id));
        let loaded = store.load(&conducted.result.session_id).await.unwrap();
        assert_eq!(loaded, conducted.result);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_interview_is_still_saved() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileResultStore::new(dir.path()));
        let handler = ConductInterviewHandler::new(
            ports(MockMeetingGateway::new(), MockSpeechGateway::new()),
            store.clone(),
            InterviewConfig::default(),
        );
        let handle = SessionHandle::new();
        handle.cancel();

        let conducted = handler.handle(command(), handle).await.unwrap();
        assert_eq!(conducted.result.outcome, SessionOutcome::Cancelled);
        assert!(conducted.saved_to.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn join_failure_saves_nothing() {
        let dir = TempDir::new().unwrap();
        let handler = ConductInterviewHandler::new(
            ports(
                MockMeetingGateway::new().rejecting_join(JoinError::Unavailable("down".into())),
                MockSpeechGateway::new(),
            ),
            Arc::new(JsonFileResultStore::new(dir.path())),
            InterviewConfig::default(),
        );

        let err = handler.handle(command(), SessionHandle::new()).await.unwrap_err();
        assert!(matches!(err, SessionStartError::Join(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
