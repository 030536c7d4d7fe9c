//! Faithgate - faith-alignment moderation service.
//!
//! This binary runs the moderation HTTP API, or checks a single text from the
//! command line.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use directories::ProjectDirs;
use faithgate_core::moderation::{AiClassifierConfig, ModerationConfig, DEFAULT_TIMEOUT_MS};
use faithgate_core::{GateConfig, ModerationGate};
use faithgate_server::{Server, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Faithgate - faith-alignment moderation for community content
#[derive(Parser, Debug)]
#[command(name = "faithgate", version, about)]
struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the moderation HTTP API
    Serve {
        /// Host to bind to
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Maximum text size accepted per request, in bytes
        #[arg(long)]
        max_text_bytes: Option<usize>,

        #[command(flatten)]
        gate: GateArgs,
    },

    /// Moderate a single text and print the result as JSON
    Check {
        /// Text to moderate
        text: String,

        #[command(flatten)]
        gate: GateArgs,
    },
}

/// Options shared by every command that builds a moderation gate.
#[derive(ClapArgs, Debug)]
struct GateArgs {
    /// JSON file replacing the built-in term tables
    #[arg(long)]
    terms: Option<PathBuf>,

    /// URL of an AI text-validation endpoint (rules only when omitted)
    #[arg(long)]
    ai_endpoint: Option<String>,

    /// AI request timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    ai_timeout_ms: u64,

    /// Fall back to rules when the AI response has no verdict
    #[arg(long)]
    ai_fail_closed: bool,
}

impl GateArgs {
    fn to_config(&self) -> anyhow::Result<GateConfig> {
        let moderation = match self.terms {
            Some(ref path) => {
                let config = ModerationConfig::from_path(path)
                    .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))?;
                tracing::info!(
                    "Loaded term tables from {:?} ({} blocked, {} christian, {} contextual)",
                    path,
                    config.blocked_terms.len(),
                    config.christian_terms.len(),
                    config.contextual_allowed_phrases.len()
                );
                config
            }
            None => ModerationConfig::default(),
        };

        let ai = self.ai_endpoint.as_ref().map(|endpoint| {
            let config = AiClassifierConfig::new(endpoint.clone())
                .with_timeout(Duration::from_millis(self.ai_timeout_ms));
            if self.ai_fail_closed {
                config.fail_closed()
            } else {
                config
            }
        });

        Ok(GateConfig { moderation, ai })
    }
}

/// Get the logs directory path.
fn logs_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "faithgate", "Faithgate").map(|dirs| dirs.data_dir().join("logs"))
}

/// Initialize logging, with a rotating log file when serving.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("faithgate={},warn", log_level)));

    // `check` prints JSON on stdout, so its logs go to stderr only
    if matches!(args.command, Command::Check { .. }) {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    if let Some(log_dir) = logs_dir() {
        if std::fs::create_dir_all(&log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("faithgate")
                .filename_suffix("log")
                .build(&log_dir)
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
    }

    // Fallback: console logging only
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::warn!("File logging unavailable, using console only");
    None
}

async fn serve(
    host: String,
    port: u16,
    max_text_bytes: Option<usize>,
    gate: &GateArgs,
) -> anyhow::Result<()> {
    let mut config = ServerConfig::default()
        .with_host(host)
        .with_port(port)
        .with_gate(gate.to_config()?);
    if let Some(max) = max_text_bytes {
        config.max_text_bytes = max;
    }

    let server = Server::new(config).map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
    server.run().await?;
    Ok(())
}

async fn check(text: &str, gate: &GateArgs) -> anyhow::Result<()> {
    let gate = ModerationGate::new(gate.to_config()?)?;
    let result = gate.validate_content(text).await;

    tracing::debug!(
        tier = result.tier.name(),
        requires_review = result.requires_review(),
        "Check complete"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging (keep guard alive for the duration of the program)
    let _log_guard = init_logging(&args);

    tracing::debug!("Args: {:?}", args);

    match args.command {
        Command::Serve {
            host,
            port,
            max_text_bytes,
            ref gate,
        } => serve(host, port, max_text_bytes, gate).await?,
        Command::Check { ref text, ref gate } => check(text, gate).await?,
    }

    tracing::info!("Faithgate shutting down");
    Ok(())
}
