//! Scripted speech gateway for tests.
//!
//! Every utterance spoken while listening consumes one script entry. `Some`
//! entries are delivered to the recognition sink after the answer delay,
//! `None` entries (and an exhausted script) stay silent.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::interview::RecognitionSink;
use crate::ports::{RecognitionError, SpeechError, SpeechGateway, VoiceStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub style: VoiceStyle,
}

#[derive(Debug, Default)]
struct MockState {
    utterances: Vec<Utterance>,
    script: VecDeque<Option<String>>,
    sink: Option<RecognitionSink>,
    listening: bool,
    start_calls: usize,
    stop_calls: usize,
    fail_speak: bool,
    start_error: Option<RecognitionError>,
}

#[derive(Debug)]
pub struct MockSpeechGateway {
    state: Mutex<MockState>,
    answer_delay: Duration,
}

impl Default for MockSpeechGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSpeechGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            answer_delay: Duration::from_millis(500),
        }
    }

    /// Queues one answer per utterance, in order.
    pub fn with_answers<I, S>(self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_script(answers.into_iter().map(|a| Some(a.into())))
    }

    /// Queues a script where `None` means the candidate stays silent.
    pub fn with_script<I>(self, script: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        self.lock().script.extend(script);
        self
    }

    pub fn with_answer_delay(mut self, delay: Duration) -> Self {
        self.answer_delay = delay;
        self
    }

    pub fn failing_speak(self) -> Self {
        self.lock().fail_speak = true;
        self
    }

    pub fn failing_start(self, error: RecognitionError) -> Self {
        self.lock().start_error = Some(error);
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.lock().utterances.clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.lock().utterances.iter().map(|u| u.text.clone()).collect()
    }

    /// Number of times exactly `text` was spoken.
    pub fn times_spoken(&self, text: &str) -> usize {
        self.lock().utterances.iter().filter(|u| u.text == text).count()
    }

    pub fn is_listening(&self) -> bool {
        self.lock().listening
    }

    pub fn start_calls(&self) -> usize {
        self.lock().start_calls
    }

    pub fn stop_calls(&self) -> usize {
        self.lock().stop_calls
    }

    /// Simulates the recognizer dropping out.
    pub fn fault(&self, reason: &str) {
        if let Some(sink) = self.lock().sink.as_ref() {
            sink.fault(reason);
        }
    }
}

#[async_trait]
impl SpeechGateway for MockSpeechGateway {
    async fn speak(&self, text: &str, style: VoiceStyle) -> Result<(), SpeechError> {
        let mut state = self.lock();
        state.utterances.push(Utterance {
            text: text.to_string(),
            style,
        });

        if state.listening {
            if let (Some(Some(answer)), Some(sink)) =
                (state.script.pop_front(), state.sink.clone())
            {
                let delay = self.answer_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    sink.deliver(&answer);
                });
            }
        }

        if state.fail_speak {
            return Err(SpeechError::SynthesisFailed("mock synthesis failure".to_string()));
        }
        Ok(())
    }

    async fn start_listening(&self, sink: RecognitionSink) -> Result<(), RecognitionError> {
        let mut state = self.lock();
        state.start_calls += 1;
        if let Some(err) = state.start_error.clone() {
            return Err(err);
        }
        if state.listening {
            return Err(RecognitionError::AlreadyListening);
        }
        state.listening = true;
        state.sink = Some(sink);
        Ok(())
    }

    async fn stop_listening(&self) -> Result<(), RecognitionError> {
        let mut state = self.lock();
        state.stop_calls += 1;
        state.listening = false;
        state.sink = None;
        Ok(())
    }
}
