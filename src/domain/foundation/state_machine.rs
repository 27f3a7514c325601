//! Guarded transitions for lifecycle enums.

use thiserror::Error;

/// Rejected move between two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no transition from {from:?} to {to:?}")]
pub struct IllegalTransition<S: std::fmt::Debug> {
    pub from: S,
    pub to: S,
}

/// A lifecycle enum whose legal moves are listed per state.
///
/// ```ignore
/// impl StateMachine for CoordinatorPhase {
///     fn successors(&self) -> &'static [Self] {
///         match self {
///             Idle => &[Opening, Ended],
///             // ...
///         }
///     }
/// }
///
/// phase = phase.transition_to(CoordinatorPhase::Opening)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    fn successors(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.successors().contains(target)
    }

    fn transition_to(&self, target: Self) -> Result<Self, IllegalTransition<Self>> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(IllegalTransition { from: *self, to: target })
        }
    }

    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}
