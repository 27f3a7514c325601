//! TurnCoordinator - drives one interview from join to leave.
//!
//! The coordinator owns all conversation state. Speech recognition only ever
//! reaches it through the [`PendingResponseSlot`], which the coordinator arms
//! after each question and polls while waiting for the answer.
//!
//! ```text
//! Idle -> Opening -> AwaitingResponse <-> Analyzing -> Closing -> Ended
//! ```
//!
//! Whatever happens inside the session, teardown runs before `run` returns:
//! recognition is stopped, the slot is disarmed and the meeting is left.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use tracing::Instrument;

use crate::config::InterviewConfig;
use crate::domain::foundation::{SessionId, StateMachine, Timestamp};
use crate::domain::interview::templates;
use crate::domain::interview::{
    Answer, AssessmentMetadata, ConversationLog, ConversationSummary, CoordinatorPhase,
    FallbackReason, FinalAssessment, Generated, InterviewProgress, InterviewSession,
    PendingResponseSlot, RecognitionSink, ResponseAnalysis, SessionMetadata, SessionOutcome,
    SessionResult, StageSequence, TerminationPolicy, TerminationReason,
    DEFAULT_CONTEXT_ENTRIES,
};
use crate::ports::{
    AssessmentRequest, InterviewAI, JoinError, MeetingError, MeetingGateway, QuestionRequest,
    RecognitionError, SpeechGateway, VoiceStyle,
};

/// Bot plus candidate.
const MIN_PARTICIPANTS: usize = 2;

/// The collaborators a session talks to.
#[derive(Clone)]
pub struct InterviewPorts {
    pub meeting: Arc<dyn MeetingGateway>,
    pub speech: Arc<dyn SpeechGateway>,
    pub ai: Arc<dyn InterviewAI>,
}

/// Errors that stop a session before the conversation starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionStartError {
    #[error("could not authenticate with the meeting service: {0}")]
    Auth(String),

    #[error("could not join the meeting: {0}")]
    Join(JoinError),
}

impl From<JoinError> for SessionStartError {
    fn from(err: JoinError) -> Self {
        match err {
            JoinError::Auth(message) => SessionStartError::Auth(message),
            other => SessionStartError::Join(other),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("invalid phase transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: CoordinatorPhase,
        to: CoordinatorPhase,
    },
}

/// A teardown step that did not complete. Logged, never returned.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("failed to stop recognition: {0}")]
    StopListening(RecognitionError),

    #[error("failed to leave the meeting: {0}")]
    Leave(MeetingError),

    #[error("{0} timed out")]
    TimedOut(&'static str),
}

/// Cancels a running session from outside the coordinator.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    active: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Asks the session to stop. Nothing further is spoken once noticed.
    pub fn cancel(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            tracing::info!("interview cancellation requested");
            self.wake.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        !self.active.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.wake.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

enum WaitOutcome {
    Answered(Answer),
    Cancelled,
    RecognitionLost(String),
    Unresponsive,
}

pub struct TurnCoordinator {
    session: InterviewSession,
    config: InterviewConfig,
    ports: InterviewPorts,
    policy: TerminationPolicy,
    stages: StageSequence,
    log: ConversationLog,
    slot: Arc<PendingResponseSlot>,
    phase: CoordinatorPhase,
    handle: SessionHandle,
    reprompts: u32,
    joined: bool,
    left: bool,
    listening: bool,
    assessment: Option<FinalAssessment>,
}

impl TurnCoordinator {
    pub fn new(session: InterviewSession, config: InterviewConfig, ports: InterviewPorts) -> Self {
        let policy = TerminationPolicy::new(config.max_questions);
        Self {
            session,
            config,
            ports,
            policy,
            stages: StageSequence::standard(),
            log: ConversationLog::new(),
            slot: Arc::new(PendingResponseSlot::new()),
            phase: CoordinatorPhase::Idle,
            handle: SessionHandle::new(),
            reprompts: 0,
            joined: false,
            left: false,
            listening: false,
            assessment: None,
        }
    }

    /// Uses an externally created handle for cancellation.
    pub fn with_handle(mut self, handle: SessionHandle) -> Self {
        self.handle = handle;
        self
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn session_id(&self) -> SessionId {
        self.session.id()
    }

    pub fn phase(&self) -> CoordinatorPhase {
        self.phase
    }

    pub fn summary(&self) -> ConversationSummary {
        let asked = self.session.questions_asked();
        ConversationSummary {
            questions_asked: asked,
            current_stage: self.stages.current_stage(),
            stages_covered: self.log.stages_covered(),
            total_exchanges: self.log.len(),
            candidate_responses: self.log.candidate_responses(),
            interview_progress: format!("{}/{}", asked, self.policy.max_questions()),
        }
    }

    /// Runs the whole session and returns its result document.
    ///
    /// Only a failed start is an error. Cancellation, lost recognition and
    /// internal faults end the session with a non-completed outcome.
    pub async fn run(mut self, meeting_url: &str) -> Result<SessionResult, SessionStartError> {
        let span = tracing::info_span!("interview", session_id = %self.session.id());
        async move {
            let conducted = AssertUnwindSafe(self.conduct(meeting_url))
                .catch_unwind()
                .await;
            self.teardown().await;

            let outcome = match conducted {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(err)) => {
                    tracing::error!(error = %err, "interview could not start");
                    return Err(err);
                }
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    tracing::error!(%reason, "interview aborted by a panic");
                    SessionOutcome::Failed {
                        reason: format!("session panicked: {}", reason),
                    }
                }
            };

            tracing::info!(outcome = ?outcome, questions_asked = self.session.questions_asked(), "interview finished");
            Ok(self.into_result(outcome))
        }
        .instrument(span)
        .await
    }

    async fn conduct(&mut self, meeting_url: &str) -> Result<SessionOutcome, SessionStartError> {
        self.join(meeting_url).await?;
        self.session.activate();

        let monitor = ParticipantMonitor::spawn(
            Arc::clone(&self.ports.meeting),
            self.config.participant_check_interval(),
            self.config.gateway_call_timeout(),
        );
        let outcome = match self.converse().await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "interview stopped");
                self.force_end();
                SessionOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };
        monitor.stop().await;
        Ok(outcome)
    }

    async fn join(&mut self, meeting_url: &str) -> Result<(), SessionStartError> {
        let joined = timeout(
            self.config.gateway_call_timeout(),
            self.ports.meeting.join(meeting_url),
        )
        .await
        .unwrap_or_else(|_| Err(JoinError::Unavailable("join timed out".to_string())));

        let info = joined?;
        self.joined = true;
        tracing::info!(meeting_id = %info.meeting_id, call_id = %info.call_id, "joined meeting");
        Ok(())
    }

    async fn converse(&mut self) -> Result<SessionOutcome, CoordinatorError> {
        self.transition(CoordinatorPhase::Opening)?;
        if let Err(reason) = self.start_listening().await {
            tracing::error!(%reason, "interview cannot run without recognition");
            self.transition(CoordinatorPhase::Ended)?;
            self.session.deactivate();
            return Ok(SessionOutcome::Failed {
                reason: format!("speech recognition unavailable: {}", reason),
            });
        }
        if self.is_cancelled() {
            return self.end_cancelled();
        }

        let session_id = self.session.id();
        let opening = self
            .generate(
                "open",
                self.ports
                    .ai
                    .open(session_id, self.session.candidate(), self.session.role()),
                || templates::OPENING_FALLBACK.to_string(),
            )
            .await
            .into_value();
        if self.is_cancelled() {
            return self.end_cancelled();
        }
        self.ask(opening).await;
        self.transition(CoordinatorPhase::AwaitingResponse)?;

        let reason = loop {
            let answer = match self.await_answer().await? {
                WaitOutcome::Answered(answer) => answer,
                WaitOutcome::Cancelled => return self.end_cancelled(),
                WaitOutcome::RecognitionLost(reason) => {
                    tracing::warn!(%reason, "recognition stopped while waiting for an answer");
                    break TerminationReason::RecognitionStopped;
                }
                WaitOutcome::Unresponsive => {
                    tracing::warn!(reprompts = self.reprompts, "no answer after repeated reprompts");
                    break TerminationReason::CandidateUnresponsive;
                }
            };

            self.transition(CoordinatorPhase::Analyzing)?;
            let analysis = self.analyze(answer).await;

            if self.stages.advance_if_due(self.session.questions_asked()) {
                self.session.sync_stage_index(self.stages.current_index());
                tracing::info!(stage = self.stages.current_stage().as_str(), "moved to next stage");
            }
            if let Some(reason) = self.termination_check() {
                break reason;
            }
            if self.is_cancelled() {
                return self.end_cancelled();
            }

            let question = self.next_question(analysis).await;
            self.pause(self.config.inter_turn_delay()).await;
            if self.is_cancelled() {
                return self.end_cancelled();
            }
            self.ask(question).await;
            self.transition(CoordinatorPhase::AwaitingResponse)?;
        };

        tracing::info!(%reason, "interview is wrapping up");
        self.transition(CoordinatorPhase::Closing)?;
        let closed = self.close().await;
        self.transition(CoordinatorPhase::Ended)?;

        if closed {
            Ok(SessionOutcome::completed(reason))
        } else {
            Ok(SessionOutcome::Cancelled)
        }
    }

    fn transition(&mut self, target: CoordinatorPhase) -> Result<(), CoordinatorError> {
        let from = self.phase;
        self.phase = from
            .transition_to(target)
            .map_err(|_| CoordinatorError::InvalidTransition { from, to: target })?;
        tracing::debug!(?from, to = ?target, "phase transition");
        Ok(())
    }

    fn force_end(&mut self) {
        if self.phase != CoordinatorPhase::Ended {
            self.phase = CoordinatorPhase::Ended;
        }
        self.session.deactivate();
    }

    fn end_cancelled(&mut self) -> Result<SessionOutcome, CoordinatorError> {
        tracing::info!("interview cancelled");
        self.transition(CoordinatorPhase::Ended)?;
        self.session.deactivate();
        Ok(SessionOutcome::Cancelled)
    }

    fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    fn recognition_running(&self) -> bool {
        self.listening && self.slot.closed_reason().is_none()
    }

    fn termination_check(&self) -> Option<TerminationReason> {
        let covered = self.log.stages_covered();
        self.policy.should_end(&InterviewProgress {
            questions_asked: self.session.questions_asked(),
            current_stage_index: self.stages.current_index(),
            terminal_stage_index: self.stages.terminal_index(),
            stages_covered: &covered,
            recognition_running: self.recognition_running(),
        })
    }

    /// Starts recognition. The session cannot go on without it.
    async fn start_listening(&mut self) -> Result<(), String> {
        let sink = RecognitionSink::new(Arc::clone(&self.slot));
        let reason = match timeout(
            self.config.gateway_call_timeout(),
            self.ports.speech.start_listening(sink),
        )
        .await
        {
            Ok(Ok(())) => {
                self.listening = true;
                tracing::debug!("recognition started");
                return Ok(());
            }
            Ok(Err(err)) => err.to_string(),
            Err(_) => "recognition start timed out".to_string(),
        };
        self.slot.close(reason.clone());
        Err(reason)
    }

    async fn stop_listening(&mut self) {
        if !self.listening {
            return;
        }
        self.listening = false;
        let result = match timeout(
            self.config.gateway_call_timeout(),
            self.ports.speech.stop_listening(),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(CleanupError::StopListening(err)),
            Err(_) => Err(CleanupError::TimedOut("stopping recognition")),
        };
        match result {
            Ok(()) => tracing::debug!("recognition stopped"),
            Err(err) => tracing::error!(error = %err, "cleanup step failed"),
        }
    }

    /// Leaves the meeting at most once per session.
    async fn leave(&mut self) {
        if !self.joined || self.left {
            return;
        }
        self.left = true;
        let result = match timeout(self.config.gateway_call_timeout(), self.ports.meeting.leave())
            .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(CleanupError::Leave(err)),
            Err(_) => Err(CleanupError::TimedOut("leaving the meeting")),
        };
        match result {
            Ok(()) => tracing::info!("left meeting"),
            Err(err) => tracing::error!(error = %err, "cleanup step failed"),
        }
    }

    /// Speaks `text`. A failed utterance is logged and the turn carries on.
    async fn speak(&self, text: &str, style: VoiceStyle) {
        let spoken = timeout(
            self.config.gateway_call_timeout(),
            self.ports.speech.speak(text, style),
        );
        tokio::select! {
            result = spoken => match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::warn!(error = %err, "utterance was not spoken"),
                Err(_) => tracing::warn!("speaking timed out"),
            },
            _ = self.handle.cancelled() => tracing::debug!("utterance cut short by cancellation"),
        }
    }

    /// Speaks a question, logs it and arms the slot for the answer.
    async fn ask(&mut self, question: String) {
        self.speak(&question, VoiceStyle::Professional).await;

        let stage = self.stages.current_stage();
        self.log.append_interviewer(question.clone(), stage);
        let asked = self.session.record_question();
        self.reprompts = 0;
        self.slot
            .arm(question, Instant::now() + self.config.response_timeout());
        tracing::info!(stage = stage.as_str(), questions_asked = asked, "asked question");
    }

    async fn await_answer(&mut self) -> Result<WaitOutcome, CoordinatorError> {
        let slot = Arc::clone(&self.slot);
        loop {
            if self.is_cancelled() {
                return Ok(WaitOutcome::Cancelled);
            }
            if let Some(answer) = slot.try_consume() {
                return Ok(WaitOutcome::Answered(answer));
            }
            if let Some(reason) = slot.closed_reason() {
                return Ok(WaitOutcome::RecognitionLost(reason));
            }

            let now = Instant::now();
            let Some(deadline) = slot.deadline() else {
                return Ok(WaitOutcome::RecognitionLost("no question pending".to_string()));
            };

            if now >= deadline {
                self.reprompts += 1;
                if self
                    .config
                    .max_reprompts
                    .is_some_and(|max| self.reprompts > max)
                {
                    slot.disarm();
                    return Ok(WaitOutcome::Unresponsive);
                }
                self.transition(CoordinatorPhase::AwaitingResponse)?;
                tracing::warn!(reprompt = self.reprompts, "no answer before the deadline, reprompting");
                self.speak(templates::REPROMPT, VoiceStyle::Professional).await;
                slot.reset_deadline(Instant::now() + self.config.response_timeout());
                continue;
            }

            let tick = self.config.poll_interval().min(deadline - now);
            tokio::select! {
                _ = slot.notified() => {}
                _ = tokio::time::sleep(tick) => {}
                _ = self.handle.cancelled() => {}
            }
        }
    }

    async fn analyze(&mut self, answer: Answer) -> ResponseAnalysis {
        let stage = self.stages.current_stage();
        self.log
            .append_candidate(answer.text.clone(), stage, answer.question.clone());

        let analysis = self
            .generate(
                "analyze",
                self.ports
                    .ai
                    .analyze(self.session.id(), &answer.question, &answer.text),
                ResponseAnalysis::unavailable_fallback,
            )
            .await
            .into_value();

        if let Err(err) = self.log.attach_analysis(analysis.clone()) {
            tracing::warn!(error = %err, "analysis not attached to transcript");
        }
        analysis
    }

    async fn next_question(&self, analysis: ResponseAnalysis) -> String {
        let stage = self.stages.current_stage();
        let asked = self.session.questions_asked();
        let request = QuestionRequest {
            session_id: self.session.id(),
            stage,
            questions_asked: asked,
            max_questions: self.policy.max_questions(),
            experience_level: self.session.candidate().experience_level(),
            context: self.log.recent_context(DEFAULT_CONTEXT_ENTRIES),
            previous_analysis: Some(analysis),
        };
        self.generate("next_question", self.ports.ai.next_question(request), || {
            templates::fallback_question(stage, asked).to_string()
        })
        .await
        .into_value()
    }

    /// Runs the closing sequence. Returns false if it was cut short by a
    /// cancellation.
    async fn close(&mut self) -> bool {
        self.stop_listening().await;
        self.slot.disarm();

        if self.is_cancelled() {
            return false;
        }
        self.speak(templates::CLOSING_REMARKS, VoiceStyle::Friendly)
            .await;
        self.pause(self.config.closing_grace()).await;
        self.leave().await;
        if self.is_cancelled() {
            return false;
        }

        let request = AssessmentRequest {
            session_id: self.session.id(),
            candidate: self.session.candidate().clone(),
            role: self.session.role().clone(),
            exchange_count: self.log.len(),
            context: self.log.recent_context(self.log.len()),
            analyses: self.log.analyses().into_iter().cloned().collect(),
        };
        let assessment = self
            .generate(
                "final_assessment",
                self.ports.ai.final_assessment(request),
                FinalAssessment::neutral_fallback,
            )
            .await
            .into_value()
            .with_metadata(AssessmentMetadata {
                total_questions: self.session.questions_asked(),
                duration_minutes: self.config.duration_minutes,
                stages_covered: self.log.stages_covered(),
                completion_time: Timestamp::now(),
            });
        if self.is_cancelled() {
            return false;
        }

        tracing::info!(
            overall_score = assessment.overall_score,
            recommendation = assessment.recommendation.as_str(),
            "final assessment recorded"
        );
        self.assessment = Some(assessment);
        self.session.deactivate();
        true
    }

    /// Sleeps for `delay` unless the session is cancelled first.
    async fn pause(&self, delay: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = self.handle.cancelled() => {}
        }
    }

    /// Awaits an AI call within the configured budget. A cancellation
    /// abandons the call and yields the fallback.
    async fn generate<T, F>(
        &self,
        operation: &'static str,
        call: F,
        fallback: impl FnOnce() -> T,
    ) -> Generated<T>
    where
        F: Future<Output = Generated<T>>,
    {
        let bounded = timeout(self.config.ai_call_timeout(), call);
        tokio::select! {
            result = bounded => match result {
                Ok(generated) => {
                    if let Some(reason) = generated.fallback_reason() {
                        tracing::warn!(operation, %reason, "using fallback output");
                    }
                    generated
                }
                Err(_) => {
                    tracing::warn!(operation, "AI call timed out, using fallback output");
                    Generated::fallback(fallback(), FallbackReason::TimedOut)
                }
            },
            _ = self.handle.cancelled() => {
                tracing::debug!(operation, "AI call abandoned by cancellation");
                Generated::fallback(fallback(), FallbackReason::Cancelled)
            }
        }
    }

    async fn teardown(&mut self) {
        self.stop_listening().await;
        if self.slot.disarm() {
            tracing::debug!("dropped pending response");
        }
        self.leave().await;
        self.force_end();
    }

    fn into_result(self, outcome: SessionOutcome) -> SessionResult {
        let summary = self.summary();
        let total_exchanges = self.log.len();
        let start = self
            .log
            .first_timestamp()
            .unwrap_or_else(|| self.session.started_at());
        SessionResult {
            session_id: self.session.id(),
            transcript: self.log.entries().to_vec(),
            assessment: self.assessment,
            summary,
            metadata: SessionMetadata::new(
                start,
                Timestamp::now(),
                total_exchanges,
                self.config.duration_minutes,
            ),
            outcome,
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Background check that the candidate is still in the meeting.
struct ParticipantMonitor {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ParticipantMonitor {
    fn spawn(meeting: Arc<dyn MeetingGateway>, interval: Duration, call_timeout: Duration) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);
        let task = tokio::spawn(
            async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await;
                loop {
                    tokio::select! {
                        _ = stopped.changed() => break,
                        _ = ticker.tick() => {
                            match timeout(call_timeout, meeting.list_participants()).await {
                                Ok(Ok(participants)) if participants.len() < MIN_PARTICIPANTS => {
                                    tracing::warn!(count = participants.len(), "candidate may have left the meeting");
                                }
                                Ok(Ok(participants)) => {
                                    tracing::debug!(count = participants.len(), "participants present");
                                }
                                Ok(Err(err)) => tracing::warn!(error = %err, "participant check failed"),
                                Err(_) => tracing::warn!("participant check timed out"),
                            }
                        }
                    }
                }
            }
            .in_current_span(),
        );
        Self { shutdown, task }
    }

    async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "participant monitor ended abnormally");
        }
    }
}
