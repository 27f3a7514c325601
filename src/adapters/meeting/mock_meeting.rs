//! In-memory meeting gateway for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ports::{JoinError, MeetingError, MeetingGateway, MeetingInfo, Participant};

/// Records joins and leaves and serves a fixed participant list.
#[derive(Debug)]
pub struct MockMeetingGateway {
    join_error: Option<JoinError>,
    leave_error: Option<MeetingError>,
    participants: Mutex<Vec<Participant>>,
    joined: AtomicBool,
    join_calls: AtomicUsize,
    leave_calls: AtomicUsize,
    participant_calls: AtomicUsize,
}

impl Default for MockMeetingGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMeetingGateway {
    /// A meeting with the bot and one candidate present.
    pub fn new() -> Self {
        Self {
            join_error: None,
            leave_error: None,
            participants: Mutex::new(vec![
                Participant {
                    id: "bot".into(),
                    display_name: Some("Interview Bot".into()),
                },
                Participant {
                    id: "candidate".into(),
                    display_name: Some("Candidate".into()),
                },
            ]),
            joined: AtomicBool::new(false),
            join_calls: AtomicUsize::new(0),
            leave_calls: AtomicUsize::new(0),
            participant_calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting_join(mut self, error: JoinError) -> Self {
        self.join_error = Some(error);
        self
    }

    pub fn failing_leave(mut self, error: MeetingError) -> Self {
        self.leave_error = Some(error);
        self
    }

    fn participants(&self) -> MutexGuard<'_, Vec<Participant>> {
        self.participants.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_participants(&self, participants: Vec<Participant>) {
        *self.participants() = participants;
    }

    pub fn is_joined(&self) -> bool {
        self.joined.load(Ordering::SeqCst)
    }

    pub fn join_calls(&self) -> usize {
        self.join_calls.load(Ordering::SeqCst)
    }

    pub fn leave_calls(&self) -> usize {
        self.leave_calls.load(Ordering::SeqCst)
    }

    pub fn participant_calls(&self) -> usize {
        self.participant_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MeetingGateway for MockMeetingGateway {
    async fn join(&self, meeting_url: &str) -> Result<MeetingInfo, JoinError> {
        self.join_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.join_error {
            return Err(err.clone());
        }
        self.joined.store(true, Ordering::SeqCst);
        Ok(MeetingInfo {
            call_id: "mock-call".into(),
            meeting_id: "mock-meeting".into(),
            join_url: meeting_url.to_string(),
        })
    }

    async fn leave(&self) -> Result<(), MeetingError> {
        self.leave_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.leave_error {
            return Err(err.clone());
        }
        self.joined.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn list_participants(&self) -> Result<Vec<Participant>, MeetingError> {
        self.participant_calls.fetch_add(1, Ordering::SeqCst);
        if !self.is_joined() {
            return Err(MeetingError::NotJoined);
        }
        Ok(self.participants().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_then_leave_is_tracked() {
        let meeting = MockMeetingGateway::new();
        meeting.join("https://teams.microsoft.com/l/meetup-join/x").await.unwrap();
        assert!(meeting.is_joined());
        assert_eq!(meeting.list_participants().await.unwrap().len(), 2);
        meeting.leave().await.unwrap();
        assert!(!meeting.is_joined());
        assert_eq!(meeting.leave_calls(), 1);
    }

    #[tokio::test]
    async fn configured_join_error_is_returned() {
        let meeting = MockMeetingGateway::new().rejecting_join(JoinError::Rejected {
            status: 403,
            message: "forbidden".into(),
        });
        assert!(matches!(
            meeting.join("u").await,
            Err(JoinError::Rejected { status: 403, .. })
        ));
        assert!(!meeting.is_joined());
    }
}
