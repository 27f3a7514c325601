//! Integration tests for a full interview run.
//!
//! These tests drive the public API end to end:
//! 1. The coordinator joins a (mock) meeting and speaks the opening
//! 2. Scripted answers arrive through the recognition sink
//! 3. Answers are analyzed and the next question is generated
//! 4. The interview closes, leaves the meeting and records an assessment
//!
//! All timing runs on a paused tokio clock.

use std::sync::Arc;
use std::time::Duration;

use interview_conductor::adapters::ai::{LlmInterviewer, MockAIProvider};
use interview_conductor::adapters::meeting::MockMeetingGateway;
use interview_conductor::adapters::speech::MockSpeechGateway;
use interview_conductor::adapters::storage::JsonFileResultStore;
use interview_conductor::application::{
    ConductInterviewCommand, ConductInterviewHandler, InterviewPorts, SessionHandle,
    SessionStartError, TurnCoordinator,
};
use interview_conductor::config::InterviewConfig;
use interview_conductor::domain::interview::templates;
use interview_conductor::domain::interview::{
    CandidateProfile, InterviewSession, Recommendation, RoleProfile, SessionOutcome, Speaker,
    Stage, TerminationReason,
};
use interview_conductor::ports::{JoinError, ResultStore, VoiceStyle};

const MEETING_URL: &str = "https://teams.microsoft.com/l/meetup-join/19%3ameeting_abc%40thread.v2/0";

const ANALYSIS_JSON: &str = r#"```json
{
  "content_quality": {"score": 8, "reasoning": "Concrete examples"},
  "communication_clarity": {"score": 9, "reasoning": "Well structured"},
  "technical_depth": {"score": 7, "reasoning": "Solid fundamentals"},
  "key_insights": ["Has shipped distributed systems"],
  "areas_to_explore": ["Incident response"],
  "overall_assessment": "Strong answer",
  "follow_up_suggestions": ["Ask about on-call"]
}
```"#;

const ASSESSMENT_JSON: &str = r#"{
  "overall_score": 8,
  "category_scores": {"technical_skills": 8, "communication": 9, "problem_solving": 7, "cultural_fit": 8},
  "strengths": ["Clear communicator"],
  "areas_for_improvement": ["System design depth"],
  "key_highlights": ["Led a migration to Rust"],
  "recommendation": "hire",
  "reasoning": "Consistently strong answers",
  "next_steps": ["Team interview"],
  "interview_quality": "Good"
}"#;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestRig {
    meeting: Arc<MockMeetingGateway>,
    speech: Arc<MockSpeechGateway>,
    provider: MockAIProvider,
}

impl TestRig {
    fn new(speech: MockSpeechGateway) -> Self {
        Self {
            meeting: Arc::new(MockMeetingGateway::new()),
            speech: Arc::new(speech),
            provider: MockAIProvider::new(),
        }
    }

    fn ports(&self) -> InterviewPorts {
        InterviewPorts {
            meeting: self.meeting.clone(),
            speech: self.speech.clone(),
            ai: Arc::new(LlmInterviewer::new(Arc::new(self.provider.clone()))),
        }
    }

    fn coordinator(&self, config: InterviewConfig) -> TurnCoordinator {
        TurnCoordinator::new(ada_session(), config, self.ports())
    }
}

fn ada_session() -> InterviewSession {
    InterviewSession::new(
        CandidateProfile::new("Ada").unwrap(),
        RoleProfile::new("Backend Engineer"),
    )
}

fn silent_config() -> InterviewConfig {
    InterviewConfig {
        response_timeout_secs: 60,
        max_reprompts: None,
        ..InterviewConfig::default()
    }
}

// =============================================================================
// End-to-end runs
// =============================================================================

#[tokio::test(start_paused = true)]
async fn two_question_interview_runs_to_completion() {
    let mut rig = TestRig::new(
        MockSpeechGateway::new().with_answers(["I'm Ada, a backend engineer", "Mostly Rust and Go"]),
    );
    rig.provider = MockAIProvider::new()
        .with_response_for("open", "Hello Ada! Please introduce yourself.")
        .with_response_for("analyze", ANALYSIS_JSON)
        .with_response_for("analyze", ANALYSIS_JSON)
        .with_response_for("next_question", "Which languages do you use most?")
        .with_response_for("final_assessment", ASSESSMENT_JSON);

    let result = rig
        .coordinator(InterviewConfig::default().with_max_questions(2))
        .run(MEETING_URL)
        .await
        .unwrap();

    assert_eq!(
        result.outcome,
        SessionOutcome::completed(TerminationReason::QuestionLimitReached)
    );

    // Two question/answer cycles
    let speakers: Vec<Speaker> = result.transcript.iter().map(|e| e.speaker).collect();
    assert_eq!(
        speakers,
        vec![Speaker::Interviewer, Speaker::Candidate, Speaker::Interviewer, Speaker::Candidate]
    );
    assert_eq!(result.transcript[0].content, "Hello Ada! Please introduce yourself.");
    assert_eq!(result.transcript[2].content, "Which languages do you use most?");
    assert_eq!(
        result.transcript[3].question.as_deref(),
        Some("Which languages do you use most?")
    );
    let analysis = result.transcript[1].analysis.as_ref().unwrap();
    assert_eq!(analysis.content_quality.score(), 8);
    assert_eq!(analysis.overall_assessment, "Strong answer");

    // One closing utterance in the friendly voice, one leave
    let closing: Vec<_> = rig
        .speech
        .utterances()
        .into_iter()
        .filter(|u| u.text == templates::CLOSING_REMARKS)
        .collect();
    assert_eq!(closing.len(), 1);
    assert_eq!(closing[0].style, VoiceStyle::Friendly);
    assert_eq!(rig.speech.spoken_texts().last().map(String::as_str), Some(templates::CLOSING_REMARKS));
    assert_eq!(rig.meeting.leave_calls(), 1);
    assert!(!rig.speech.is_listening());

    // Final assessment with coordinator metadata
    let assessment = result.assessment.unwrap();
    assert_eq!(assessment.overall_score, 8);
    assert_eq!(assessment.recommendation, Recommendation::Hire);
    let metadata = assessment.metadata.unwrap();
    assert_eq!(metadata.total_questions, 2);
    assert_eq!(metadata.duration_minutes, 45);
    assert!(metadata.stages_covered.contains(&Stage::Introduction));

    assert_eq!(rig.provider.calls_for("analyze"), 2);
    assert_eq!(rig.provider.calls_for("next_question"), 1);
    assert_eq!(rig.provider.calls_for("final_assessment"), 1);
}

#[tokio::test(start_paused = true)]
async fn essential_stages_end_interview_early() {
    let answers: Vec<String> = (1..=8).map(|i| format!("answer {}", i)).collect();
    let rig = TestRig::new(MockSpeechGateway::new().with_answers(answers));

    let result = rig
        .coordinator(InterviewConfig::default())
        .run(MEETING_URL)
        .await
        .unwrap();

    assert_eq!(
        result.outcome,
        SessionOutcome::completed(TerminationReason::EssentialStagesCovered)
    );
    assert_eq!(result.summary.questions_asked, 8);
    assert_eq!(result.transcript[4].stage, Stage::Background);
    assert_eq!(result.transcript[8].stage, Stage::TechnicalSkills);
    assert_eq!(result.transcript[12].stage, Stage::ProblemSolving);
    assert_eq!(result.summary.current_stage, Stage::Behavioral);

    let mut previous = 0;
    for entry in &result.transcript {
        let index = Stage::ALL.iter().position(|s| *s == entry.stage).unwrap();
        assert!(index >= previous, "stage moved backwards");
        previous = index;
    }
}

// =============================================================================
// Reprompts
// =============================================================================

#[tokio::test(start_paused = true)]
async fn one_reprompt_per_silent_window() {
    let rig = TestRig::new(MockSpeechGateway::new());
    let coordinator = rig.coordinator(silent_config());
    let handle = coordinator.handle();
    let run = tokio::spawn(async move { coordinator.run(MEETING_URL).await });

    tokio::time::sleep(Duration::from_secs(185)).await;
    handle.cancel();
    let result = run.await.unwrap().unwrap();

    assert_eq!(rig.speech.times_spoken(templates::REPROMPT), 3);
    assert_eq!(result.outcome, SessionOutcome::Cancelled);
    // Reprompts are neither logged nor counted
    assert_eq!(result.transcript.len(), 1);
    assert_eq!(result.summary.questions_asked, 1);
}

#[tokio::test(start_paused = true)]
async fn no_reprompt_before_timeout() {
    let rig = TestRig::new(MockSpeechGateway::new());
    let coordinator = rig.coordinator(silent_config());
    let handle = coordinator.handle();
    let run = tokio::spawn(async move { coordinator.run(MEETING_URL).await });

    tokio::time::sleep(Duration::from_secs(59)).await;
    handle.cancel();
    run.await.unwrap().unwrap();

    assert_eq!(rig.speech.times_spoken(templates::REPROMPT), 0);
}

#[tokio::test(start_paused = true)]
async fn answer_after_reprompt_continues_interview() {
    let rig = TestRig::new(
        MockSpeechGateway::new()
            .with_script([None, Some("Sorry, I'm Ada".to_string())]),
    );
    let result = rig
        .coordinator(InterviewConfig {
            max_reprompts: Some(3),
            ..InterviewConfig::default().with_max_questions(1)
        })
        .run(MEETING_URL)
        .await
        .unwrap();

    assert!(result.outcome.is_completed());
    assert_eq!(rig.speech.times_spoken(templates::REPROMPT), 1);
    assert_eq!(result.transcript[1].content, "Sorry, I'm Ada");
    // The answer is linked to the original question, not the reprompt
    assert_eq!(result.transcript[1].question.as_deref(), Some(result.transcript[0].content.as_str()));
}

// =============================================================================
// Failures and cancellation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn join_failure_is_fatal() {
    let mut rig = TestRig::new(MockSpeechGateway::new());
    rig.meeting = Arc::new(MockMeetingGateway::new().rejecting_join(JoinError::Rejected {
        status: 404,
        message: "meeting not found".into(),
    }));

    let err = rig.coordinator(InterviewConfig::default()).run(MEETING_URL).await.unwrap_err();
    assert!(matches!(err, SessionStartError::Join(JoinError::Rejected { status: 404, .. })));
    assert!(rig.speech.spoken_texts().is_empty());
    assert_eq!(rig.meeting.leave_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancelled_session_keeps_transcript_and_is_saved() {
    let dir = tempfile::TempDir::new().unwrap();
    let rig = TestRig::new(MockSpeechGateway::new().with_answers(["I'm Ada"]));
    let store = Arc::new(JsonFileResultStore::new(dir.path()));
    let handler = ConductInterviewHandler::new(rig.ports(), store.clone(), InterviewConfig::default());

    let handle = SessionHandle::new();
    let canceller = handle.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(20)).await;
        canceller.cancel();
    });

    let command = ConductInterviewCommand {
        candidate: CandidateProfile::new("Ada").unwrap(),
        role: RoleProfile::new("Backend Engineer"),
        meeting_url: MEETING_URL.to_string(),
    };
    let conducted = handler.handle(command, handle).await.unwrap();

    assert_eq!(conducted.result.outcome, SessionOutcome::Cancelled);
    assert!(conducted.result.assessment.is_none());
    assert!(conducted.result.transcript.len() >= 2);
    assert_eq!(rig.meeting.leave_calls(), 1);
    assert_eq!(rig.speech.times_spoken(templates::CLOSING_REMARKS), 0);

    let saved = store.load(&conducted.result.session_id).await.unwrap();
    assert_eq!(saved.transcript, conducted.result.transcript);
}
