//! Domain layer containing interview rules and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, state machine, errors)
//! - `interview` - Stages, conversation log, pending response slot, termination
//!   policy, assessments and the persisted session result

pub mod foundation;
pub mod interview;
