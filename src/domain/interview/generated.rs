//! Generated<T> - output of an AI call that may have fallen back to a default.

use std::fmt;

/// Why a generated value is a fallback rather than model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The provider could not be reached or returned an error.
    Unavailable(String),
    /// The provider answered but the output could not be used.
    Malformed(String),
    /// The call exceeded its time budget.
    TimedOut,
    /// The session was cancelled while waiting for the call.
    Cancelled,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Unavailable(msg) => write!(f, "unavailable: {}", msg),
            FallbackReason::Malformed(msg) => write!(f, "malformed output: {}", msg),
            FallbackReason::TimedOut => f.write_str("timed out"),
            FallbackReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// A value produced by the AI or substituted with a fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated<T> {
    Produced(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Generated<T> {
    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        Generated::Fallback { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            Generated::Produced(value) => value,
            Generated::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Generated::Produced(value) => value,
            Generated::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generated::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Generated::Produced(_) => None,
            Generated::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Generated<U> {
        match self {
            Generated::Produced(value) => Generated::Produced(f(value)),
            Generated::Fallback { value, reason } => Generated::Fallback {
                value: f(value),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produced_has_no_reason() {
        let g = Generated::Produced("hi");
        assert!(!g.is_fallback());
        assert_eq!(g.fallback_reason(), None);
        assert_eq!(*g.value(), "hi");
    }

    #[test]
    fn fallback_keeps_reason_through_map() {
        let g = Generated::fallback(2, FallbackReason::TimedOut).map(|v| v * 10);
        assert_eq!(g.fallback_reason(), Some(&FallbackReason::TimedOut));
        assert_eq!(g.into_value(), 20);
    }
}
