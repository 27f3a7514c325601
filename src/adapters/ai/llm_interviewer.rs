//! AI-powered InterviewAI implementation

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::domain::foundation::{SessionId, ValidationError};
use crate::domain::interview::{
    templates, CandidateProfile, FallbackReason, FinalAssessment, Generated, RawFinalAssessment,
    RawResponseAnalysis, ResponseAnalysis, RoleProfile,
};
use crate::ports::{
    AIProvider, AssessmentRequest, CompletionRequest, InterviewAI, MessageRole, QuestionRequest,
    RequestMetadata,
};

/// Token budget and temperature for one kind of prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

pub const OPENING_SETTINGS: GenerationSettings = GenerationSettings { max_tokens: 200, temperature: 0.7 };
pub const ANALYSIS_SETTINGS: GenerationSettings = GenerationSettings { max_tokens: 500, temperature: 0.3 };
pub const NEXT_QUESTION_SETTINGS: GenerationSettings = GenerationSettings { max_tokens: 200, temperature: 0.8 };
pub const ASSESSMENT_SETTINGS: GenerationSettings = GenerationSettings { max_tokens: 800, temperature: 0.3 };

const SYSTEM_PROMPT: &str = "You are a professional AI interviewer conducting a spoken job interview. \
Your words are read aloud, so never use Markdown, lists or stage directions.";

/// Interviewer that asks an LLM for every judgment and falls back to
/// scripted output when the model is unreachable or unusable.
pub struct LlmInterviewer {
    ai_provider: Arc<dyn AIProvider>,
}

impl LlmInterviewer {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    async fn generate(
        &self,
        session_id: SessionId,
        operation: &str,
        prompt: String,
        settings: GenerationSettings,
    ) -> Result<String, FallbackReason> {
        let request = CompletionRequest::new(RequestMetadata::new(session_id, operation))
            .with_system_prompt(SYSTEM_PROMPT)
            .with_message(MessageRole::User, prompt)
            .with_max_tokens(settings.max_tokens)
            .with_temperature(settings.temperature);

        match self.ai_provider.complete(request).await {
            Ok(response) => Ok(response.content),
            Err(err) => {
                tracing::warn!(%session_id, operation, error = %err, "AI request failed");
                Err(FallbackReason::Unavailable(err.to_string()))
            }
        }
    }

    fn opening_prompt(candidate: &CandidateProfile, role: &RoleProfile) -> String {
        format!(
            r#"You are conducting a professional interview for a {title} position.

Candidate information:
- Name: {name}
- Experience: {level}
- Background: {background}

Focus areas for this role: {focus}

Write a warm, professional opening greeting that:
1. Introduces you as the AI interviewer
2. Sets expectations for the interview
3. Makes the candidate feel comfortable
4. Asks for a brief self-introduction

Keep it concise. Return only the words you will say."#,
            title = role.title(),
            name = candidate.name(),
            level = candidate.experience_level(),
            background = candidate.background().unwrap_or("Not provided"),
            focus = role.focus_areas().join(", "),
        )
    }

    fn analysis_prompt(question: &str, answer: &str) -> String {
        format!(
            r#"As an expert interviewer, analyze this candidate response.

Question: {question}
Answer: {answer}

Respond with JSON only, in exactly this shape:
{{
  "content_quality": {{"score": 1-10, "reasoning": "explanation"}},
  "communication_clarity": {{"score": 1-10, "reasoning": "explanation"}},
  "technical_depth": {{"score": 1-10, "reasoning": "explanation"}},
  "key_insights": ["insight1", "insight2"],
  "areas_to_explore": ["area1", "area2"],
  "overall_assessment": "brief summary",
  "follow_up_suggestions": ["suggestion1", "suggestion2"]
}}

Be objective and constructive."#
        )
    }

    fn next_question_prompt(request: &QuestionRequest) -> String {
        let analysis = request
            .previous_analysis
            .as_ref()
            .and_then(|a| serde_json::to_string_pretty(a).ok())
            .unwrap_or_else(|| "No previous analysis".to_string());

        format!(
            r#"Based on the conversation so far, choose the next interview question.

Current interview stage: {stage}
Questions asked so far: {asked}
Max questions: {max}
Candidate experience level: {level}

Conversation context:
{context}

Previous response analysis:
{analysis}

The question must fit the current stage, build on the previous answers, explore
the areas identified for further discussion, and suit the candidate's level.

Return only the question."#,
            stage = request.stage,
            asked = request.questions_asked,
            max = request.max_questions,
            level = request.experience_level,
            context = request.context,
        )
    }

    fn assessment_prompt(request: &AssessmentRequest) -> String {
        let analyses =
            serde_json::to_string_pretty(&request.analyses).unwrap_or_else(|_| "[]".to_string());

        format!(
            r#"Write a comprehensive assessment of this interview.

Candidate: {name}
Role: {role}
Interview length: {exchanges} exchanges

Conversation summary:
{context}

Individual response analyses:
{analyses}

Respond with JSON only, in exactly this shape:
{{
  "overall_score": 1-10,
  "category_scores": {{
    "technical_skills": 1-10,
    "communication": 1-10,
    "problem_solving": 1-10,
    "cultural_fit": 1-10
  }},
  "strengths": ["strength1", "strength2"],
  "areas_for_improvement": ["area1", "area2"],
  "key_highlights": ["highlight1", "highlight2"],
  "recommendation": "hire" | "consider" | "pass",
  "reasoning": "detailed explanation",
  "next_steps": ["step1", "step2"],
  "interview_quality": "assessment of the interview process"
}}"#,
            name = request.candidate.name(),
            role = request.role.title(),
            exchanges = request.exchange_count,
            context = request.context,
        )
    }
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses model output into a raw record and validates it.
fn parse_record<R, T>(
    text: &str,
    validate: impl FnOnce(R) -> Result<T, ValidationError>,
) -> Result<T, FallbackReason>
where
    R: DeserializeOwned,
{
    let raw: R = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| FallbackReason::Malformed(e.to_string()))?;
    validate(raw).map_err(|e| FallbackReason::Malformed(e.to_string()))
}

/// Trims spoken output, treating an empty reply as malformed.
fn spoken_text(text: &str) -> Result<String, FallbackReason> {
    let text = strip_code_fences(text).trim_matches('"').trim();
    if text.is_empty() {
        Err(FallbackReason::Malformed("empty response".to_string()))
    } else {
        Ok(text.to_string())
    }
}

#[async_trait]
impl InterviewAI for LlmInterviewer {
    async fn open(
        &self,
        session_id: SessionId,
        candidate: &CandidateProfile,
        role: &RoleProfile,
    ) -> Generated<String> {
        let prompt = Self::opening_prompt(candidate, role);
        match self
            .generate(session_id, "open", prompt, OPENING_SETTINGS)
            .await
            .and_then(|text| spoken_text(&text))
        {
            Ok(opening) => Generated::Produced(opening),
            Err(reason) => Generated::fallback(templates::OPENING_FALLBACK.to_string(), reason),
        }
    }

    async fn analyze(
        &self,
        session_id: SessionId,
        question: &str,
        answer: &str,
    ) -> Generated<ResponseAnalysis> {
        let prompt = Self::analysis_prompt(question, answer);
        let text = match self
            .generate(session_id, "analyze", prompt, ANALYSIS_SETTINGS)
            .await
        {
            Ok(text) => text,
            Err(reason) => {
                return Generated::fallback(ResponseAnalysis::unavailable_fallback(), reason)
            }
        };

        match parse_record(&text, RawResponseAnalysis::validate) {
            Ok(analysis) => Generated::Produced(analysis),
            Err(reason) => {
                tracing::warn!(%session_id, %reason, "unusable analysis from model");
                Generated::fallback(ResponseAnalysis::unparsed_fallback(), reason)
            }
        }
    }

    async fn next_question(&self, request: QuestionRequest) -> Generated<String> {
        let prompt = Self::next_question_prompt(&request);
        match self
            .generate(request.session_id, "next_question", prompt, NEXT_QUESTION_SETTINGS)
            .await
            .and_then(|text| spoken_text(&text))
        {
            Ok(question) => Generated::Produced(question),
            Err(reason) => Generated::fallback(
                templates::fallback_question(request.stage, request.questions_asked).to_string(),
                reason,
            ),
        }
    }

    async fn final_assessment(&self, request: AssessmentRequest) -> Generated<FinalAssessment> {
        let prompt = Self::assessment_prompt(&request);
        let text = match self
            .generate(request.session_id, "final_assessment", prompt, ASSESSMENT_SETTINGS)
            .await
        {
            Ok(text) => text,
            Err(reason) => return Generated::fallback(FinalAssessment::neutral_fallback(), reason),
        };

        match parse_record(&text, RawFinalAssessment::validate) {
            Ok(assessment) => Generated::Produced(assessment),
            Err(reason) => {
                tracing::warn!(session_id = %request.session_id, %reason, "unusable assessment from model");
                Generated::fallback(FinalAssessment::neutral_fallback(), reason)
            }
        }
    }
}
