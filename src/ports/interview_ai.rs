//! Interview AI port - the four judgments an interviewer makes.
//!
//! Every operation returns a [`Generated`] value: implementations never fail,
//! they fall back to a scripted default and say why.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::interview::{
    CandidateProfile, ExperienceLevel, FinalAssessment, Generated, ResponseAnalysis, RoleProfile,
    Stage,
};

/// Inputs for choosing the next question.
#[derive(Debug, Clone)]
pub struct QuestionRequest {
    pub session_id: SessionId,
    pub stage: Stage,
    pub questions_asked: u32,
    pub max_questions: u32,
    pub experience_level: ExperienceLevel,
    /// Rendered recent conversation.
    pub context: String,
    pub previous_analysis: Option<ResponseAnalysis>,
}

/// Inputs for the closing assessment.
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub session_id: SessionId,
    pub candidate: CandidateProfile,
    pub role: RoleProfile,
    pub exchange_count: usize,
    pub context: String,
    pub analyses: Vec<ResponseAnalysis>,
}

#[async_trait]
pub trait InterviewAI: Send + Sync {
    /// Produces the greeting that also asks for a self-introduction.
    async fn open(
        &self,
        session_id: SessionId,
        candidate: &CandidateProfile,
        role: &RoleProfile,
    ) -> Generated<String>;

    async fn analyze(
        &self,
        session_id: SessionId,
        question: &str,
        answer: &str,
    ) -> Generated<ResponseAnalysis>;

    async fn next_question(&self, request: QuestionRequest) -> Generated<String>;

    async fn final_assessment(&self, request: AssessmentRequest) -> Generated<FinalAssessment>;
}
