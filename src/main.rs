//! Interview Conductor - command line entry point
//!
//! Joins the given meeting, runs one interview and writes the result
//! document. Exits 0 only when the interview completed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interview_conductor::adapters::ai::{
    FailoverAIProvider, GeminiConfig, GeminiProvider, LlmInterviewer, OpenAIConfig, OpenAIProvider,
};
use interview_conductor::adapters::auth::{ClientCredentialsAuth, ClientCredentialsConfig};
use interview_conductor::adapters::meeting::{
    validate_meeting_url, GraphMeetingConfig, GraphMeetingGateway,
};
use interview_conductor::adapters::speech::TerminalSpeechGateway;
use interview_conductor::adapters::storage::JsonFileResultStore;
use interview_conductor::application::{
    ConductInterviewCommand, ConductInterviewHandler, ConductInterviewResult, InterviewPorts,
    SessionHandle,
};
use interview_conductor::config::{AiConfig, AiProvider, AppConfig};
use interview_conductor::domain::interview::{CandidateProfile, ExperienceLevel, RoleProfile};
use interview_conductor::ports::AIProvider as CompletionProvider;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    Junior,
    Mid,
    Senior,
}

impl From<LevelArg> for ExperienceLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Junior => ExperienceLevel::Junior,
            LevelArg::Mid => ExperienceLevel::Mid,
            LevelArg::Senior => ExperienceLevel::Senior,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Command-line arguments for interview-conductor
#[derive(Parser, Debug)]
#[command(name = "interview-conductor")]
#[command(about = "Runs an automated voice interview inside an online meeting")]
#[command(version)]
struct Args {
    /// Meeting join link
    #[arg(long)]
    meeting_url: String,

    #[arg(long)]
    candidate_name: String,

    #[arg(long)]
    candidate_email: Option<String>,

    /// Free-text summary of the candidate's background
    #[arg(long)]
    candidate_background: Option<String>,

    /// Role being interviewed for
    #[arg(long, default_value = "Software Developer")]
    role: String,

    #[arg(long, value_enum, default_value_t = LevelArg::Mid)]
    experience_level: LevelArg,

    /// Focus areas for the role, e.g. `--focus-areas rust databases`
    #[arg(long, num_args = 1..)]
    focus_areas: Vec<String>,

    /// Planned interview length in minutes
    #[arg(long)]
    duration: Option<u32>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Directory for the result document
    #[arg(long, env = "INTERVIEW_BOT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("interview_conductor={}", args.log_level.as_str()).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = validate_meeting_url(&args.meeting_url) {
        eprintln!("Invalid meeting URL: {}", err);
        return Ok(ExitCode::FAILURE);
    }

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(minutes) = args.duration {
        config.interview = config.interview.with_duration_minutes(minutes);
    }
    if let Some(dir) = &args.output_dir {
        config.storage.results_dir = dir.clone();
    }
    config.validate().context("Invalid configuration")?;

    let command = build_command(&args)?;
    let handler = build_handler(&config)?;

    let handle = SessionHandle::new();
    let cancel = handle.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, ending interview");
            cancel.cancel();
        }
    });

    info!(
        candidate = %command.candidate.name(),
        role = %command.role.title(),
        "Starting interview"
    );

    match handler.handle(command, handle).await {
        Ok(conducted) => {
            print_summary(&conducted);
            Ok(if conducted.result.outcome.is_completed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(err) => {
            tracing::error!(error = %err, "Interview could not start");
            eprintln!("Interview could not start: {}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn build_command(args: &Args) -> Result<ConductInterviewCommand> {
    let mut candidate = CandidateProfile::new(args.candidate_name.clone())
        .context("Invalid candidate name")?
        .with_experience_level(args.experience_level.into());
    if let Some(email) = &args.candidate_email {
        candidate = candidate.with_email(email.clone());
    }
    if let Some(background) = &args.candidate_background {
        candidate = candidate.with_background(background.clone());
    }

    let role = RoleProfile::new(args.role.clone())
        .with_level(args.experience_level.into())
        .with_focus_areas(args.focus_areas.clone());

    Ok(ConductInterviewCommand {
        candidate,
        role,
        meeting_url: args.meeting_url.clone(),
    })
}

fn build_handler(config: &AppConfig) -> Result<ConductInterviewHandler> {
    let client_secret = config.auth.client_secret().unwrap_or_default();
    let auth = ClientCredentialsAuth::new(
        ClientCredentialsConfig::new(&config.auth.tenant_id, &config.auth.client_id, client_secret)
            .with_authority(&config.auth.authority)
            .with_timeout(config.auth.timeout()),
    )
    .context("Failed to initialize token client")?;

    let mut meeting_config =
        GraphMeetingConfig::new(&config.meeting.callback_url, &config.meeting.bot_app_id);
    meeting_config.graph_base_url = config.meeting.graph_base_url.clone();
    meeting_config.bot_display_name = config.meeting.bot_display_name.clone();
    meeting_config.timeout = config.meeting.timeout();
    meeting_config.scopes = config.auth.scopes.clone();
    let meeting = GraphMeetingGateway::new(meeting_config, Arc::new(auth))
        .context("Failed to initialize meeting client")?;

    let provider = build_ai_provider(&config.ai)?;
    let ports = InterviewPorts {
        meeting: Arc::new(meeting),
        speech: Arc::new(TerminalSpeechGateway::new()),
        ai: Arc::new(LlmInterviewer::new(provider)),
    };

    let store = JsonFileResultStore::new(&config.storage.results_dir);
    Ok(ConductInterviewHandler::new(
        ports,
        Arc::new(store),
        config.interview.clone(),
    ))
}

fn build_ai_provider(config: &AiConfig) -> Result<Arc<dyn CompletionProvider>> {
    let primary = provider_for(config, config.primary_provider)?
        .context("Primary AI provider has no API key")?;

    let fallback = match config.fallback_provider {
        Some(kind) if kind != config.primary_provider => provider_for(config, kind)?,
        _ => None,
    };

    Ok(match fallback {
        Some(fallback) => Arc::new(FailoverAIProvider::new(primary).with_fallback(fallback)),
        None => primary,
    })
}

fn provider_for(
    config: &AiConfig,
    kind: AiProvider,
) -> Result<Option<Arc<dyn CompletionProvider>>> {
    let Some(key) = config.api_key(kind) else {
        return Ok(None);
    };

    let provider: Arc<dyn CompletionProvider> = match kind {
        AiProvider::Gemini => Arc::new(
            GeminiProvider::new(
                GeminiConfig::new(key)
                    .with_model(&config.gemini_model)
                    .with_timeout(config.timeout()),
            )
            .context("Failed to initialize Gemini provider")?,
        ),
        AiProvider::OpenAI => Arc::new(
            OpenAIProvider::new(
                OpenAIConfig::new(key)
                    .with_model(&config.openai_model)
                    .with_timeout(config.timeout())
                    .with_max_retries(config.max_retries),
            )
            .context("Failed to initialize OpenAI provider")?,
        ),
    };
    Ok(Some(provider))
}

fn print_summary(conducted: &ConductInterviewResult) {
    let result = &conducted.result;
    println!();
    println!("Interview {} finished", result.session_id);
    println!("  Outcome:   {:?}", result.outcome);
    println!("  Progress:  {}", result.summary.interview_progress);
    println!("  Stage:     {}", result.summary.current_stage);
    println!("  Responses: {}", result.summary.candidate_responses);
    println!(
        "  Duration:  {} of {} planned minutes",
        result.metadata.elapsed_minutes(),
        result.metadata.duration_minutes
    );
    if let Some(assessment) = &result.assessment {
        println!(
            "  Score:     {}/10 ({})",
            assessment.overall_score,
            assessment.recommendation.as_str()
        );
    }
    match &conducted.saved_to {
        Some(path) => println!("  Saved to:  {}", path.display()),
        None => println!("  Result could not be saved"),
    }
}
