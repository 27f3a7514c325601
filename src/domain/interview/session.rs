//! InterviewSession - identity and counters of one interview.

use serde::{Deserialize, Serialize};

use super::{CandidateProfile, RoleProfile};
use crate::domain::foundation::{SessionId, Timestamp};

/// State of a single interview, owned and mutated only by the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    id: SessionId,
    candidate: CandidateProfile,
    role: RoleProfile,
    started_at: Timestamp,
    current_stage_index: usize,
    questions_asked: u32,
    active: bool,
}

impl InterviewSession {
    /// Creates a new, not yet active, session.
    pub fn new(candidate: CandidateProfile, role: RoleProfile) -> Self {
        Self {
            id: SessionId::new(),
            candidate,
            role,
            started_at: Timestamp::now(),
            current_stage_index: 0,
            questions_asked: 0,
            active: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn candidate(&self) -> &CandidateProfile {
        &self.candidate
    }

    pub fn role(&self) -> &RoleProfile {
        &self.role
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn current_stage_index(&self) -> usize {
        self.current_stage_index
    }

    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Marks the session as running and resets the start time.
    pub fn activate(&mut self) {
        self.active = true;
        self.started_at = Timestamp::now();
    }

    /// Marks the session as finished. Irreversible.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Records one more question asked and returns the new count.
    pub fn record_question(&mut self) -> u32 {
        self.questions_asked += 1;
        self.questions_asked
    }

    /// Mirrors the stage cursor. The index only moves forward.
    pub fn sync_stage_index(&mut self, index: usize) {
        self.current_stage_index = self.current_stage_index.max(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> InterviewSession {
        InterviewSession::new(
            CandidateProfile::new("Ada").unwrap(),
            RoleProfile::new("Backend Engineer"),
        )
    }

    #[test]
    fn new_session_is_inactive_with_no_questions() {
        let s = session();
        assert!(!s.is_active());
        assert_eq!(s.questions_asked(), 0);
        assert_eq!(s.current_stage_index(), 0);
    }

    #[test]
    fn record_question_counts_up() {
        let mut s = session();
        assert_eq!(s.record_question(), 1);
        assert_eq!(s.record_question(), 2);
    }

    #[test]
    fn stage_index_never_moves_back() {
        let mut s = session();
        s.sync_stage_index(3);
        s.sync_stage_index(1);
        assert_eq!(s.current_stage_index(), 3);
    }

    #[test]
    fn activate_then_deactivate() {
        let mut s = session();
        s.activate();
        assert!(s.is_active());
        s.deactivate();
        assert!(!s.is_active());
    }
}
