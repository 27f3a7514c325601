//! Candidate and role descriptors supplied when a session starts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Seniority of the candidate or the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    #[default]
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "junior" => Ok(ExperienceLevel::Junior),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            other => Err(ValidationError::invalid_format(
                "experience_level",
                format!("expected junior, mid or senior, got '{}'", other),
            )),
        }
    }
}

/// Who is being interviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    name: String,
    email: Option<String>,
    experience_level: ExperienceLevel,
    background: Option<String>,
}

impl CandidateProfile {
    /// Creates a candidate profile, returning error if the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("candidate_name"));
        }
        Ok(Self {
            name,
            email: None,
            experience_level: ExperienceLevel::default(),
            background: None,
        })
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_experience_level(mut self, level: ExperienceLevel) -> Self {
        self.experience_level = level;
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn experience_level(&self) -> ExperienceLevel {
        self.experience_level
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }
}

/// Default role title when none is supplied.
pub const DEFAULT_ROLE_TITLE: &str = "Software Developer";

/// Default focus areas when none are supplied.
pub const DEFAULT_FOCUS_AREAS: [&str; 2] = ["general programming", "problem solving"];

/// The position being interviewed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProfile {
    title: String,
    level: ExperienceLevel,
    focus_areas: Vec<String>,
}

impl RoleProfile {
    /// Creates a role profile; a blank title falls back to the default title.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into().trim().to_string();
        Self {
            title: if title.is_empty() {
                DEFAULT_ROLE_TITLE.to_string()
            } else {
                title
            },
            level: ExperienceLevel::default(),
            focus_areas: DEFAULT_FOCUS_AREAS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_level(mut self, level: ExperienceLevel) -> Self {
        self.level = level;
        self
    }

    /// Replaces the focus areas. An empty list keeps the defaults.
    pub fn with_focus_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let areas: Vec<String> = areas
            .into_iter()
            .map(Into::into)
            .filter(|a: &String| !a.trim().is_empty())
            .collect();
        if !areas.is_empty() {
            self.focus_areas = areas;
        }
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn level(&self) -> ExperienceLevel {
        self.level
    }

    pub fn focus_areas(&self) -> &[String] {
        &self.focus_areas
    }
}

impl Default for RoleProfile {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_requires_a_name() {
        assert!(CandidateProfile::new("   ").is_err());
        let ada = CandidateProfile::new(" Ada ").unwrap();
        assert_eq!(ada.name(), "Ada");
        assert_eq!(ada.experience_level(), ExperienceLevel::Mid);
    }

    #[test]
    fn role_defaults_focus_areas() {
        let role = RoleProfile::new("Backend Engineer").with_focus_areas(Vec::<String>::new());
        assert_eq!(role.title(), "Backend Engineer");
        assert_eq!(role.focus_areas(), &["general programming", "problem solving"]);
    }

    #[test]
    fn blank_role_title_uses_default() {
        assert_eq!(RoleProfile::new("").title(), DEFAULT_ROLE_TITLE);
    }

    #[test]
    fn experience_level_parses_case_insensitively() {
        assert_eq!("Senior".parse::<ExperienceLevel>().unwrap(), ExperienceLevel::Senior);
        assert!("principal".parse::<ExperienceLevel>().is_err());
    }
}
