//! CoordinatorPhase - where the turn loop is in a session's lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle phase of one interview session.
///
/// ```text
/// Idle -> Opening -> AwaitingResponse <-> Analyzing
///                          |                  |
///                          +----> Closing <---+
///                                    |
///                                  Ended
/// ```
///
/// Any phase other than `Ended` may jump straight to `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorPhase {
    #[default]
    Idle,
    Opening,
    AwaitingResponse,
    Analyzing,
    Closing,
    Ended,
}

impl StateMachine for CoordinatorPhase {
    fn successors(&self) -> &'static [Self] {
        use CoordinatorPhase::*;
        match self {
            Idle => &[Opening, Ended],
            Opening => &[AwaitingResponse, Ended],
            AwaitingResponse => &[AwaitingResponse, Analyzing, Closing, Ended],
            Analyzing => &[AwaitingResponse, Closing, Ended],
            Closing => &[Ended],
            Ended => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CoordinatorPhase::*;

    #[test]
    fn happy_path_is_valid() {
        let path = [Idle, Opening, AwaitingResponse, Analyzing, AwaitingResponse, Analyzing, Closing, Ended];
        for pair in path.windows(2) {
            assert!(pair[0].transition_to(pair[1]).is_ok(), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn ended_is_terminal() {
        assert!(Ended.is_terminal());
        assert!(Ended.transition_to(Idle).is_err());
    }

    #[test]
    fn cannot_skip_opening() {
        assert!(Idle.transition_to(AwaitingResponse).is_err());
        assert!(Analyzing.transition_to(Opening).is_err());
    }

    #[test]
    fn every_live_phase_can_end() {
        for from in [Idle, Opening, AwaitingResponse, Analyzing, Closing] {
            assert!(from.can_transition_to(&Ended), "{:?}", from);
        }
    }
}
