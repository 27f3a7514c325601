//! Interview stages and the rule for advancing through them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named phase of the interview.
///
/// Declaration order is interview order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Introduction,
    Background,
    TechnicalSkills,
    ProblemSolving,
    Behavioral,
    ScenarioBased,
    Closing,
}

impl Stage {
    /// All stages in interview order.
    pub const ALL: [Stage; 7] = [
        Stage::Introduction,
        Stage::Background,
        Stage::TechnicalSkills,
        Stage::ProblemSolving,
        Stage::Behavioral,
        Stage::ScenarioBased,
        Stage::Closing,
    ];

    /// Wire name, as used in prompts and the result document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Introduction => "introduction",
            Stage::Background => "background",
            Stage::TechnicalSkills => "technical_skills",
            Stage::ProblemSolving => "problem_solving",
            Stage::Behavioral => "behavioral",
            Stage::ScenarioBased => "scenario_based",
            Stage::Closing => "closing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of questions asked in a stage before moving on.
pub const QUESTIONS_PER_STAGE: u32 = 2;

/// Ordered catalog of stages with a forward-only cursor.
///
/// # Invariants
///
/// - `index` never decreases
/// - `index` never exceeds the terminal index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSequence {
    stages: Vec<Stage>,
    index: usize,
    /// Value of `questions_asked` when the current stage was entered.
    entered_at: u32,
}

impl StageSequence {
    /// The standard seven-stage interview.
    pub fn standard() -> Self {
        Self {
            stages: Stage::ALL.to_vec(),
            index: 0,
            entered_at: 0,
        }
    }

    pub fn current_stage(&self) -> Stage {
        self.stages[self.index]
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn terminal_index(&self) -> usize {
        self.stages.len() - 1
    }

    pub fn is_terminal(&self) -> bool {
        self.index == self.terminal_index()
    }

    /// Moves to the next stage once two questions have been asked in the
    /// current one. Returns true when the stage changed.
    ///
    /// The terminal stage never advances.
    pub fn advance_if_due(&mut self, questions_asked: u32) -> bool {
        if self.is_terminal() {
            return false;
        }
        if questions_asked.saturating_sub(self.entered_at) < QUESTIONS_PER_STAGE {
            return false;
        }

        self.index += 1;
        self.entered_at = questions_asked;
        true
    }
}

impl Default for StageSequence {
    fn default() -> Self {
        Self::standard()
    }
}
