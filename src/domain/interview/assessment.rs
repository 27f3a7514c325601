//! Per-answer analyses and the closing assessment.
//!
//! Model output arrives as loosely-typed JSON. It is first deserialized into
//! the `Raw*` records, where every field is optional, and then validated into
//! the strict types below. Anything that fails validation is reported as a
//! [`ValidationError`] and the caller substitutes a fallback.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::Stage;
use crate::domain::foundation::{Timestamp, ValidationError};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

fn check_score(field: &str, raw: f64) -> Result<u8, ValidationError> {
    let rounded = raw.round();
    if !(MIN_SCORE as f64..=MAX_SCORE as f64).contains(&rounded) {
        return Err(ValidationError::out_of_range(
            field,
            MIN_SCORE as i64,
            MAX_SCORE as i64,
            rounded as i64,
        ));
    }
    Ok(rounded as u8)
}

/// A 1..=10 score with the reasoning behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScore {
    score: u8,
    reasoning: String,
}

impl CriterionScore {
    pub fn new(score: u8, reasoning: impl Into<String>) -> Result<Self, ValidationError> {
        let score = check_score("score", score as f64)?;
        Ok(Self {
            score,
            reasoning: reasoning.into(),
        })
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }
}

/// Evaluation of one candidate answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseAnalysis {
    pub content_quality: CriterionScore,
    pub communication_clarity: CriterionScore,
    pub technical_depth: CriterionScore,
    pub key_insights: Vec<String>,
    pub areas_to_explore: Vec<String>,
    pub overall_assessment: String,
    pub follow_up_suggestions: Vec<String>,
}

impl ResponseAnalysis {
    /// Used when the model answered but its analysis could not be parsed.
    pub fn unparsed_fallback() -> Self {
        Self {
            content_quality: CriterionScore { score: 7, reasoning: "Response analyzed".into() },
            communication_clarity: CriterionScore { score: 7, reasoning: "Clear communication".into() },
            technical_depth: CriterionScore { score: 6, reasoning: "Adequate technical detail".into() },
            key_insights: vec!["Response provided".into()],
            areas_to_explore: vec!["Further technical details".into()],
            overall_assessment: "Satisfactory response".into(),
            follow_up_suggestions: vec!["Ask for more specific examples".into()],
        }
    }

    /// Used when the model could not be reached at all.
    pub fn unavailable_fallback() -> Self {
        let neutral = || CriterionScore { score: 5, reasoning: "Analysis error".into() };
        Self {
            content_quality: neutral(),
            communication_clarity: neutral(),
            technical_depth: neutral(),
            key_insights: vec!["Unable to analyze".into()],
            areas_to_explore: vec!["Technical skills".into()],
            overall_assessment: "Unable to analyze response".into(),
            follow_up_suggestions: vec!["Continue with next question".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCriterion {
    pub score: Option<f64>,
    pub reasoning: Option<String>,
}

impl RawCriterion {
    fn validate(self, field: &str) -> Result<CriterionScore, ValidationError> {
        let score = self
            .score
            .ok_or_else(|| ValidationError::missing_field(format!("{}.score", field)))?;
        Ok(CriterionScore {
            score: check_score(field, score)?,
            reasoning: self.reasoning.unwrap_or_default(),
        })
    }
}

/// Unvalidated analysis as the model returned it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResponseAnalysis {
    pub content_quality: Option<RawCriterion>,
    pub communication_clarity: Option<RawCriterion>,
    pub technical_depth: Option<RawCriterion>,
    #[serde(default)]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub areas_to_explore: Vec<String>,
    pub overall_assessment: Option<String>,
    #[serde(default)]
    pub follow_up_suggestions: Vec<String>,
}

impl RawResponseAnalysis {
    pub fn validate(self) -> Result<ResponseAnalysis, ValidationError> {
        fn criterion(
            raw: Option<RawCriterion>,
            field: &str,
        ) -> Result<CriterionScore, ValidationError> {
            raw.ok_or_else(|| ValidationError::missing_field(field))?
                .validate(field)
        }

        let overall_assessment = self
            .overall_assessment
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ValidationError::missing_field("overall_assessment"))?;

        Ok(ResponseAnalysis {
            content_quality: criterion(self.content_quality, "content_quality")?,
            communication_clarity: criterion(self.communication_clarity, "communication_clarity")?,
            technical_depth: criterion(self.technical_depth, "technical_depth")?,
            key_insights: self.key_insights,
            areas_to_explore: self.areas_to_explore,
            overall_assessment,
            follow_up_suggestions: self.follow_up_suggestions,
        })
    }
}

/// Hiring recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Hire,
    Consider,
    Pass,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Hire => "hire",
            Recommendation::Consider => "consider",
            Recommendation::Pass => "pass",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hire" => Ok(Recommendation::Hire),
            "consider" => Ok(Recommendation::Consider),
            "pass" => Ok(Recommendation::Pass),
            other => Err(ValidationError::invalid_format(
                "recommendation",
                format!("expected hire, consider or pass, got '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub technical_skills: u8,
    pub communication: u8,
    pub problem_solving: u8,
    pub cultural_fit: u8,
}

impl CategoryScores {
    pub fn uniform(score: u8) -> Self {
        Self {
            technical_skills: score,
            communication: score,
            problem_solving: score,
            cultural_fit: score,
        }
    }
}

/// Facts about the interview itself, attached by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentMetadata {
    pub total_questions: u32,
    pub duration_minutes: u32,
    pub stages_covered: BTreeSet<Stage>,
    pub completion_time: Timestamp,
}

/// Closing evaluation of the whole interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAssessment {
    pub overall_score: u8,
    pub category_scores: CategoryScores,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub key_highlights: Vec<String>,
    pub recommendation: Recommendation,
    pub reasoning: String,
    pub next_steps: Vec<String>,
    pub interview_quality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AssessmentMetadata>,
}

impl FinalAssessment {
    /// Neutral record used when generation failed outright.
    pub fn neutral_fallback() -> Self {
        Self {
            overall_score: 5,
            category_scores: CategoryScores::uniform(5),
            strengths: Vec::new(),
            areas_for_improvement: Vec::new(),
            key_highlights: Vec::new(),
            recommendation: Recommendation::Consider,
            reasoning: "Assessment generation error".into(),
            next_steps: Vec::new(),
            interview_quality: "Technical issues during assessment".into(),
            metadata: None,
        }
    }

    /// Used when the model answered but the assessment could not be parsed.
    pub fn unparsed_fallback() -> Self {
        Self {
            overall_score: 7,
            category_scores: CategoryScores::uniform(7),
            strengths: vec!["Participated in interview".into()],
            areas_for_improvement: vec!["Continue developing skills".into()],
            key_highlights: vec!["Engaged in conversation".into()],
            recommendation: Recommendation::Consider,
            reasoning: "Standard interview performance".into(),
            next_steps: vec!["Follow up with hiring team".into()],
            interview_quality: "Interview completed successfully".into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: AssessmentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCategoryScores {
    pub technical_skills: Option<f64>,
    pub communication: Option<f64>,
    pub problem_solving: Option<f64>,
    pub cultural_fit: Option<f64>,
}

impl RawCategoryScores {
    fn validate(self) -> Result<CategoryScores, ValidationError> {
        fn score(raw: Option<f64>, field: &str) -> Result<u8, ValidationError> {
            let value = raw.ok_or_else(|| {
                ValidationError::missing_field(format!("category_scores.{}", field))
            })?;
            check_score(field, value)
        }

        Ok(CategoryScores {
            technical_skills: score(self.technical_skills, "technical_skills")?,
            communication: score(self.communication, "communication")?,
            problem_solving: score(self.problem_solving, "problem_solving")?,
            cultural_fit: score(self.cultural_fit, "cultural_fit")?,
        })
    }
}

/// Unvalidated assessment as the model returned it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFinalAssessment {
    pub overall_score: Option<f64>,
    pub category_scores: Option<RawCategoryScores>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub key_highlights: Vec<String>,
    pub recommendation: Option<String>,
    pub reasoning: Option<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    pub interview_quality: Option<String>,
}

impl RawFinalAssessment {
    pub fn validate(self) -> Result<FinalAssessment, ValidationError> {
        let overall_score = self
            .overall_score
            .ok_or_else(|| ValidationError::missing_field("overall_score"))?;
        let category_scores = self
            .category_scores
            .ok_or_else(|| ValidationError::missing_field("category_scores"))?
            .validate()?;
        let recommendation: Recommendation = self
            .recommendation
            .ok_or_else(|| ValidationError::missing_field("recommendation"))?
            .parse()?;

        Ok(FinalAssessment {
            overall_score: check_score("overall_score", overall_score)?,
            category_scores,
            strengths: self.strengths,
            areas_for_improvement: self.areas_for_improvement,
            key_highlights: self.key_highlights,
            recommendation,
            reasoning: self.reasoning.unwrap_or_default(),
            next_steps: self.next_steps,
            interview_quality: self.interview_quality.unwrap_or_default(),
            metadata: None,
        })
    }
}
