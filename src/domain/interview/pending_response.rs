//! PendingResponseSlot - the single hand-off point between speech
//! recognition and the turn loop.
//!
//! Recognition runs on its own task and only ever sees a [`RecognitionSink`].
//! The coordinator arms the slot after asking a question, the sink fills it at
//! most once, and the coordinator consumes the answer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use tokio::time::Instant;

/// An answer taken out of the slot together with the question it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub question: String,
    pub text: String,
}

#[derive(Debug)]
enum SlotState {
    Idle,
    Armed { question: String, deadline: Instant },
    Filled { question: String, text: String, deadline: Instant },
}

#[derive(Debug)]
struct Inner {
    state: SlotState,
    closed: Option<String>,
}

/// Holds at most one outstanding question and at most one answer to it.
#[derive(Debug)]
pub struct PendingResponseSlot {
    inner: Mutex<Inner>,
    notify: Notify,
}

impl Default for PendingResponseSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingResponseSlot {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: SlotState::Idle,
                closed: None,
            }),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts waiting for an answer to `question`, replacing any previous state.
    pub fn arm(&self, question: impl Into<String>, deadline: Instant) {
        self.lock().state = SlotState::Armed {
            question: question.into(),
            deadline,
        };
    }

    /// Offers recognized text. Returns false when the text was not accepted.
    pub fn deliver(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let mut inner = self.lock();
        if inner.closed.is_some() {
            return false;
        }
        let state = std::mem::replace(&mut inner.state, SlotState::Idle);
        match state {
            SlotState::Armed { question, deadline } => {
                inner.state = SlotState::Filled {
                    question,
                    text: text.to_string(),
                    deadline,
                };
                drop(inner);
                self.notify.notify_one();
                true
            }
            other => {
                inner.state = other;
                false
            }
        }
    }

    /// Takes the answer if one has been delivered, returning the slot to idle.
    pub fn try_consume(&self) -> Option<Answer> {
        let mut inner = self.lock();
        match std::mem::replace(&mut inner.state, SlotState::Idle) {
            SlotState::Filled { question, text, .. } => Some(Answer { question, text }),
            other => {
                inner.state = other;
                None
            }
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.lock().state {
            SlotState::Idle => None,
            SlotState::Armed { deadline, .. } | SlotState::Filled { deadline, .. } => {
                Some(*deadline)
            }
        }
    }

    /// Moves the deadline of an armed slot. Returns false if nothing is awaited.
    pub fn reset_deadline(&self, new_deadline: Instant) -> bool {
        match &mut self.lock().state {
            SlotState::Armed { deadline, .. } => {
                *deadline = new_deadline;
                true
            }
            _ => false,
        }
    }

    /// True while a question is outstanding and no answer has arrived.
    pub fn is_awaiting(&self) -> bool {
        let inner = self.lock();
        inner.closed.is_none() && matches!(inner.state, SlotState::Armed { .. })
    }

    pub fn pending_question(&self) -> Option<String> {
        match &self.lock().state {
            SlotState::Idle => None,
            SlotState::Armed { question, .. } | SlotState::Filled { question, .. } => {
                Some(question.clone())
            }
        }
    }

    /// Drops any outstanding question or unconsumed answer.
    ///
    /// Returns true if there was something to drop.
    pub fn disarm(&self) -> bool {
        let mut inner = self.lock();
        !matches!(
            std::mem::replace(&mut inner.state, SlotState::Idle),
            SlotState::Idle
        )
    }

    /// Stops accepting deliveries for good. The first reason wins.
    pub fn close(&self, reason: impl Into<String>) {
        let mut inner = self.lock();
        if inner.closed.is_none() {
            inner.closed = Some(reason.into());
        }
        drop(inner);
        self.notify.notify_one();
    }

    pub fn closed_reason(&self) -> Option<String> {
        self.lock().closed.clone()
    }

    /// Resolves after the next delivery or close.
    pub fn notified(&self) -> Notified<'_> {
        self.notify.notified()
    }
}

/// Write-only handle on the slot given to the speech gateway.
#[derive(Debug, Clone)]
pub struct RecognitionSink {
    slot: Arc<PendingResponseSlot>,
}

impl RecognitionSink {
    pub fn new(slot: Arc<PendingResponseSlot>) -> Self {
        Self { slot }
    }

    /// Hands a final recognition result to the turn loop.
    pub fn deliver(&self, text: &str) -> bool {
        self.slot.deliver(text)
    }

    /// Reports that recognition has stopped and no more text will come.
    pub fn fault(&self, reason: impl Into<String>) {
        self.slot.close(reason);
    }
}
