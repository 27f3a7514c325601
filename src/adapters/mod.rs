//! Adapters - implementations of the port traits.
//!
//! - `ai` - language model providers and the prompt-driven interviewer
//! - `auth` - access token acquisition
//! - `meeting` - conferencing transport and meeting link parsing
//! - `speech` - speech output and recognition
//! - `storage` - session result persistence

pub mod ai;
pub mod auth;
pub mod meeting;
pub mod speech;
pub mod storage;
