//! Validation failures raised while building domain records from input.

use thiserror::Error;

/// A value that cannot become part of an interview record.
///
/// `field` is a dotted path into the source document, for example
/// `category_scores.communication`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Empty { field: String },

    #[error("{field} = {actual} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("{field} is malformed: {reason}")]
    Malformed { field: String, reason: String },

    #[error("{field} is required")]
    Missing { field: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::Empty { field: field.into() }
    }

    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        Self::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::Missing { field: field.into() }
    }

    /// Path of the offending value.
    pub fn field(&self) -> &str {
        match self {
            Self::Empty { field }
            | Self::OutOfRange { field, .. }
            | Self::Malformed { field, .. }
            | Self::Missing { field } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_error_names_bounds_and_value() {
        let err = ValidationError::out_of_range("overall_score", 1, 10, 42);
        assert_eq!(err.to_string(), "overall_score = 42 is outside 1..=10");
    }

    #[test]
    fn field_path_is_available_for_every_kind() {
        let errors = [
            ValidationError::empty_field("candidate_name"),
            ValidationError::invalid_format("candidate_name", "digits only"),
            ValidationError::missing_field("candidate_name"),
        ];
        assert!(errors.iter().all(|e| e.field() == "candidate_name"));
    }

    #[test]
    fn missing_nested_field_reads_naturally() {
        let err = ValidationError::missing_field("content_quality.score");
        assert_eq!(err.to_string(), "content_quality.score is required");
    }
}
