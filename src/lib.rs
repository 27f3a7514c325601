//! Interview Conductor - an automated voice interviewer.
//!
//! Joins an online meeting, asks stage-by-stage questions, waits for spoken
//! answers, scores them through a language model and writes a final
//! assessment when the interview ends.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
