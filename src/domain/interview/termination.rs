//! When an interview should stop asking questions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::Stage;

/// Stages that must have been touched before an early finish is allowed.
pub const ESSENTIAL_STAGES: [Stage; 3] =
    [Stage::Introduction, Stage::Background, Stage::TechnicalSkills];

/// Questions required, with the essential stages covered, for an early finish.
pub const ESSENTIAL_COVERAGE_QUESTIONS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    QuestionLimitReached,
    FinalStageReached,
    EssentialStagesCovered,
    RecognitionStopped,
    CandidateUnresponsive,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerminationReason::QuestionLimitReached => "question limit reached",
            TerminationReason::FinalStageReached => "final stage reached",
            TerminationReason::EssentialStagesCovered => "essential stages covered",
            TerminationReason::RecognitionStopped => "speech recognition stopped",
            TerminationReason::CandidateUnresponsive => "candidate unresponsive",
        };
        f.write_str(s)
    }
}

/// Snapshot of interview progress handed to the policy after each turn.
#[derive(Debug, Clone)]
pub struct InterviewProgress<'a> {
    pub questions_asked: u32,
    pub current_stage_index: usize,
    pub terminal_stage_index: usize,
    pub stages_covered: &'a BTreeSet<Stage>,
    pub recognition_running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationPolicy {
    max_questions: u32,
}

impl TerminationPolicy {
    pub fn new(max_questions: u32) -> Self {
        Self { max_questions }
    }

    pub fn max_questions(&self) -> u32 {
        self.max_questions
    }

    /// Returns the first reason that applies, or None to keep going.
    pub fn should_end(&self, progress: &InterviewProgress<'_>) -> Option<TerminationReason> {
        if progress.questions_asked >= self.max_questions {
            return Some(TerminationReason::QuestionLimitReached);
        }
        if progress.current_stage_index >= progress.terminal_stage_index {
            return Some(TerminationReason::FinalStageReached);
        }
        let essentials_covered = ESSENTIAL_STAGES
            .iter()
            .all(|stage| progress.stages_covered.contains(stage));
        if essentials_covered && progress.questions_asked >= ESSENTIAL_COVERAGE_QUESTIONS {
            return Some(TerminationReason::EssentialStagesCovered);
        }
        if !progress.recognition_running {
            return Some(TerminationReason::RecognitionStopped);
        }
        None
    }

    pub fn is_over(&self, progress: &InterviewProgress<'_>) -> bool {
        self.should_end(progress).is_some()
    }
}
