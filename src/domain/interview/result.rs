//! The persisted document describing a finished session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ConversationEntry, FinalAssessment, Stage, TerminationReason};
use crate::domain::foundation::{SessionId, Timestamp};

/// How the session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionOutcome {
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<TerminationReason>,
    },
    Cancelled,
    Failed { reason: String },
}

impl SessionOutcome {
    pub fn completed(reason: TerminationReason) -> Self {
        SessionOutcome::Completed { reason: Some(reason) }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SessionOutcome::Completed { .. })
    }
}

/// Progress counters at the moment the summary was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub questions_asked: u32,
    pub current_stage: Stage,
    pub stages_covered: BTreeSet<Stage>,
    pub total_exchanges: usize,
    pub candidate_responses: usize,
    /// `asked/max`, e.g. `"3/15"`.
    pub interview_progress: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub total_exchanges: usize,
    /// Planned interview length, not the elapsed time.
    pub duration_minutes: u32,
}

impl SessionMetadata {
    pub fn new(
        start_time: Timestamp,
        end_time: Timestamp,
        total_exchanges: usize,
        duration_minutes: u32,
    ) -> Self {
        Self {
            start_time,
            end_time,
            total_exchanges,
            duration_minutes,
        }
    }

    /// Whole minutes between start and end.
    pub fn elapsed_minutes(&self) -> i64 {
        self.end_time.whole_minutes_since(&self.start_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session_id: SessionId,
    pub transcript: Vec<ConversationEntry>,
    pub assessment: Option<FinalAssessment>,
    pub summary: ConversationSummary,
    pub metadata: SessionMetadata,
    pub outcome: SessionOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interview::{
        AssessmentMetadata, ConversationLog, FinalAssessment, ResponseAnalysis,
    };

    fn sample_result() -> SessionResult {
        let mut log = ConversationLog::new();
        log.append_interviewer("Hello! Please introduce yourself.", Stage::Introduction);
        log.append_candidate("I'm Ada, a backend engineer.", Stage::Introduction, "Hello! Please introduce yourself.");
        log.attach_analysis(ResponseAnalysis::unparsed_fallback()).unwrap();

        let start = Timestamp::now();
        let end = start.plus_secs(300);
        let assessment = FinalAssessment::unparsed_fallback().with_metadata(AssessmentMetadata {
            total_questions: 1,
            duration_minutes: 45,
            stages_covered: log.stages_covered(),
            completion_time: end,
        });

        SessionResult {
            session_id: SessionId::new(),
            transcript: log.entries().to_vec(),
            assessment: Some(assessment),
            summary: ConversationSummary {
                questions_asked: 1,
                current_stage: Stage::Introduction,
                stages_covered: log.stages_covered(),
                total_exchanges: log.len(),
                candidate_responses: log.candidate_responses(),
                interview_progress: "1/15".into(),
            },
            metadata: SessionMetadata::new(start, end, log.len(), 45),
            outcome: SessionOutcome::completed(TerminationReason::QuestionLimitReached),
        }
    }

    #[test]
    fn round_trips_through_json() {
        let result = sample_result();
        let json = serde_json::to_string_pretty(&result).unwrap();
        let back: SessionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.transcript.len(), 2);
        assert!(back.transcript[1].analysis.is_some());
    }

    #[test]
    fn metadata_keeps_planned_duration_apart_from_elapsed() {
        let metadata = sample_result().metadata;
        assert_eq!(metadata.duration_minutes, 45);
        assert_eq!(metadata.elapsed_minutes(), 5);
    }

    #[test]
    fn outcome_is_tagged() {
        let json = serde_json::to_value(SessionOutcome::Failed { reason: "join rejected".into() }).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "join rejected");
        assert!(!SessionOutcome::Cancelled.is_completed());
    }
}
