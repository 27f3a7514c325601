//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait and
//! validation errors that form the vocabulary of the interview domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::SessionId;
pub use state_machine::{IllegalTransition, StateMachine};
pub use timestamp::Timestamp;
