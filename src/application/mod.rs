//! Application layer - the turn coordinator and the session handler.
//!
//! The coordinator runs a single interview against the ports; the handler
//! builds a session from a command, runs it and persists the result.

mod conduct_interview;
mod turn_coordinator;

pub use crate::domain::interview::CoordinatorPhase;
pub use conduct_interview::{
    ConductInterviewCommand, ConductInterviewHandler, ConductInterviewResult,
};
pub use turn_coordinator::{
    CleanupError, CoordinatorError, InterviewPorts, SessionHandle, SessionStartError,
    TurnCoordinator,
};
