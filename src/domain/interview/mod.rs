//! Interview domain: stages, transcript, answer hand-off and assessments.

mod assessment;
mod conversation_log;
mod generated;
mod pending_response;
mod phase;
mod profile;
mod result;
mod session;
mod stage;
mod termination;
pub mod templates;

pub use assessment::{
    AssessmentMetadata, CategoryScores, CriterionScore, FinalAssessment, RawCategoryScores,
    RawCriterion, RawFinalAssessment, RawResponseAnalysis, Recommendation, ResponseAnalysis,
    MAX_SCORE, MIN_SCORE,
};
pub use conversation_log::{
    ConversationEntry, ConversationLog, ConversationLogError, Speaker, CONTEXT_SNIPPET_CHARS,
    DEFAULT_CONTEXT_ENTRIES,
};
pub use generated::{FallbackReason, Generated};
pub use pending_response::{Answer, PendingResponseSlot, RecognitionSink};
pub use phase::CoordinatorPhase;
pub use profile::{
    CandidateProfile, ExperienceLevel, RoleProfile, DEFAULT_FOCUS_AREAS, DEFAULT_ROLE_TITLE,
};
pub use result::{ConversationSummary, SessionMetadata, SessionOutcome, SessionResult};
pub use session::InterviewSession;
pub use stage::{Stage, StageSequence, QUESTIONS_PER_STAGE};
pub use termination::{
    InterviewProgress, TerminationPolicy, TerminationReason, ESSENTIAL_COVERAGE_QUESTIONS,
    ESSENTIAL_STAGES,
};
