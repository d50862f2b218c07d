//! Feedback API - customer comment sentiment service.
//!
//! Runs the HTTP API server with the OpenAI-backed sentiment model and the
//! keyword fallback.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use feedback_core::remote::{
    API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_INSTRUCTIONS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
use feedback_core::{ClassifierConfig, Mode, OpenAiConfig, OpenAiModel, Rubric, SentimentModel};
use feedback_server::{AppState, Server, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Customer feedback sentiment API
#[derive(Parser, Debug)]
#[command(name = "feedback-api", version, about)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port to bind to
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Failure handling: lenient (fallback, always 200) or strict (errors surface)
    #[arg(long, default_value_t = Mode::Lenient)]
    mode: Mode,

    /// Keyword fallback rubric: two-tier or four-tier
    #[arg(long, default_value_t = Rubric::TwoTier)]
    rubric: Rubric,

    /// Remote model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Remote API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Remote API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Remote request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    timeout_secs: u64,

    /// Do not send the rating rubric instruction to the remote model
    #[arg(long)]
    no_instructions: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write daily-rotated log files to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn classifier_config(&self) -> ClassifierConfig {
        let instructions = if self.no_instructions {
            None
        } else {
            Some(DEFAULT_INSTRUCTIONS.to_string())
        };

        ClassifierConfig::default()
            .with_mode(self.mode)
            .with_rubric(self.rubric)
            .with_instructions(instructions)
    }

    fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig::default()
            .with_api_key(self.api_key.clone())
            .with_model(&self.model)
            .with_api_base(&self.api_base)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig::default()
            .with_host(&self.host)
            .with_port(self.port)
    }
}

/// Initialize logging, optionally with file rotation.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("feedback={},warn", log_level)));

    if let Some(log_dir) = &args.log_dir {
        if std::fs::create_dir_all(log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("feedback-api")
                .filename_suffix("log")
                .build(log_dir)
                .ok();

            if let Some(appender) = file_appender {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_writer(std::io::stdout))
                    .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                    .init();

                tracing::info!("Logging to {:?}", log_dir);
                return Some(guard);
            }
        }

        tracing_subscriber::fmt().with_env_filter(env_filter).init();
        tracing::warn!("File logging unavailable, using console only");
        return None;
    }

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let _log_guard = init_logging(&args);

    let openai = OpenAiModel::new(args.openai_config()).context("failed to build HTTP client")?;
    if !openai.is_configured() {
        tracing::warn!(
            "{} is not set; remote classification is disabled ({} mode)",
            API_KEY_ENV,
            args.mode
        );
    }

    tracing::info!(
        mode = %args.mode,
        rubric = %args.rubric,
        model = %args.model,
        timeout_secs = args.timeout_secs,
        "Sentiment classifier configured"
    );

    let state = AppState::with_model(Arc::new(openai), args.classifier_config());
    let server = Server::with_state(args.server_config(), state)?;
    server.run().await?;

    Ok(())
}
