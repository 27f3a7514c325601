//! Append-only record of everything said during an interview.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use super::{ResponseAnalysis, Stage};
use crate::domain::foundation::Timestamp;

/// Number of trailing entries rendered into prompt context by default.
pub const DEFAULT_CONTEXT_ENTRIES: usize = 5;

/// Maximum characters of an entry rendered into prompt context.
pub const CONTEXT_SNIPPET_CHARS: usize = 100;

const EMPTY_CONTEXT: &str = "No conversation history yet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Interviewer,
    Candidate,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Interviewer => "Interviewer",
            Speaker::Candidate => "Candidate",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One utterance in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub timestamp: Timestamp,
    pub speaker: Speaker,
    pub content: String,
    pub stage: Stage,
    /// The question a candidate entry answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ResponseAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationLogError {
    #[error("conversation log is empty")]
    Empty,

    #[error("last entry is not a candidate response")]
    NotACandidateEntry,

    #[error("last entry already has an analysis")]
    AlreadyAnalyzed,
}

/// Ordered transcript of the interview.
///
/// Entries are only ever appended. The sole mutation of an existing entry is
/// attaching an analysis to the most recent candidate response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_interviewer(&mut self, content: impl Into<String>, stage: Stage) {
        self.entries.push(ConversationEntry {
            timestamp: Timestamp::now(),
            speaker: Speaker::Interviewer,
            content: content.into(),
            stage,
            question: None,
            analysis: None,
        });
    }

    pub fn append_candidate(
        &mut self,
        content: impl Into<String>,
        stage: Stage,
        question: impl Into<String>,
    ) {
        self.entries.push(ConversationEntry {
            timestamp: Timestamp::now(),
            speaker: Speaker::Candidate,
            content: content.into(),
            stage,
            question: Some(question.into()),
            analysis: None,
        });
    }

    /// Attaches an analysis to the last entry.
    pub fn attach_analysis(
        &mut self,
        analysis: ResponseAnalysis,
    ) -> Result<(), ConversationLogError> {
        let last = self.entries.last_mut().ok_or(ConversationLogError::Empty)?;
        if last.speaker != Speaker::Candidate {
            return Err(ConversationLogError::NotACandidateEntry);
        }
        if last.analysis.is_some() {
            return Err(ConversationLogError::AlreadyAnalyzed);
        }
        last.analysis = Some(analysis);
        Ok(())
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stages_covered(&self) -> BTreeSet<Stage> {
        self.entries.iter().map(|e| e.stage).collect()
    }

    /// Analyses in transcript order, skipping unanalyzed entries.
    pub fn analyses(&self) -> Vec<&ResponseAnalysis> {
        self.entries
            .iter()
            .filter_map(|e| e.analysis.as_ref())
            .collect()
    }

    pub fn candidate_responses(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.speaker == Speaker::Candidate)
            .count()
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.entries.first().map(|e| e.timestamp)
    }

    /// Renders the last `n` entries as `Speaker: text` lines for prompts.
    pub fn recent_context(&self, n: usize) -> String {
        if self.entries.is_empty() {
            return EMPTY_CONTEXT.to_string();
        }
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..]
            .iter()
            .map(|e| format!("{}: {}", e.speaker, snippet(&e.content)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn snippet(content: &str) -> String {
    if content.chars().count() > CONTEXT_SNIPPET_CHARS {
        let head: String = content.chars().take(CONTEXT_SNIPPET_CHARS).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}
