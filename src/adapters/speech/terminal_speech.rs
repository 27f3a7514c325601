//! Console speech adapter for local runs.
//!
//! Utterances are written to stdout. Each line typed on stdin counts as one
//! final recognition result.
//!
//! Stdin is read on a detached OS thread, so a pending read never holds up
//! runtime shutdown.

use async_trait::async_trait;
use std::io::{self, BufRead};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::voice::VoiceProfile;
use crate::domain::interview::RecognitionSink;
use crate::ports::{RecognitionError, SpeechError, SpeechGateway, VoiceStyle};

#[derive(Debug, Default)]
pub struct TerminalSpeechGateway {
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl TerminalSpeechGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn listener(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.listener
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Starts the stdin reader thread. It exits after the line that follows the
/// receiver being dropped, or at end of input.
fn spawn_stdin_reader() -> io::Result<mpsc::UnboundedReceiver<io::Result<String>>> {
    let (lines_tx, lines_rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let failed = line.is_err();
                if lines_tx.send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(lines_rx)
}

async fn forward_lines(mut lines: mpsc::UnboundedReceiver<io::Result<String>>, sink: RecognitionSink) {
    while let Some(line) = lines.recv().await {
        match line {
            Ok(text) => {
                if !sink.deliver(&text) {
                    tracing::debug!("input ignored: no question pending");
                }
            }
            Err(e) => {
                sink.fault(format!("failed to read standard input: {}", e));
                return;
            }
        }
    }
    sink.fault("standard input closed");
}

#[async_trait]
impl SpeechGateway for TerminalSpeechGateway {
    async fn speak(&self, text: &str, style: VoiceStyle) -> Result<(), SpeechError> {
        let voice = VoiceProfile::for_style(style);
        tracing::debug!(voice = voice.voice_name, rate = voice.rate, pitch = voice.pitch, "speaking");

        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("\n[Interviewer] {}\n> ", text).as_bytes())
            .await
            .map_err(|e| SpeechError::OutputUnavailable(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| SpeechError::OutputUnavailable(e.to_string()))
    }

    async fn start_listening(&self, sink: RecognitionSink) -> Result<(), RecognitionError> {
        let mut listener = self.listener();
        if listener.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(RecognitionError::AlreadyListening);
        }
        let lines = spawn_stdin_reader().map_err(|e| RecognitionError::StartFailed(e.to_string()))?;
        *listener = Some(tokio::spawn(forward_lines(lines, sink)));
        tracing::info!("listening on standard input");
        Ok(())
    }

    async fn stop_listening(&self) -> Result<(), RecognitionError> {
        if let Some(handle) = self.listener().take() {
            handle.abort();
            tracing::info!("stopped listening");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interview::PendingResponseSlot;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    fn armed_slot() -> Arc<PendingResponseSlot> {
        let slot = Arc::new(PendingResponseSlot::new());
        slot.arm("Tell me about yourself".to_string(), Instant::now() + Duration::from_secs(30));
        slot
    }

    #[tokio::test]
    async fn typed_line_answers_pending_question() {
        let slot = armed_slot();
        let (lines_tx, lines_rx) = mpsc::unbounded_channel();
        let forwarder = tokio::spawn(forward_lines(lines_rx, RecognitionSink::new(Arc::clone(&slot))));

        lines_tx.send(Ok("I build storage engines".to_string())).unwrap();
        drop(lines_tx);
        forwarder.await.unwrap();

        let answer = slot.try_consume().expect("answer delivered");
        assert_eq!(answer.text, "I build storage engines");
        assert_eq!(slot.closed_reason().as_deref(), Some("standard input closed"));
    }

    #[tokio::test]
    async fn read_error_faults_recognition() {
        let slot = armed_slot();
        let (lines_tx, lines_rx) = mpsc::unbounded_channel();
        lines_tx
            .send(Err(io::Error::new(io::ErrorKind::InvalidData, "not utf-8")))
            .unwrap();

        forward_lines(lines_rx, RecognitionSink::new(Arc::clone(&slot))).await;

        let reason = slot.closed_reason().unwrap();
        assert!(reason.contains("not utf-8"), "{}", reason);
        assert!(slot.try_consume().is_none());
    }

    #[tokio::test]
    async fn stop_listening_does_not_wait_for_input() {
        let gateway = TerminalSpeechGateway::new();
        let slot = Arc::new(PendingResponseSlot::new());
        gateway.start_listening(RecognitionSink::new(slot)).await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), gateway.stop_listening())
            .await
            .expect("stop does not wait for input")
            .unwrap();
        assert!(gateway.listener().is_none());
    }
}
