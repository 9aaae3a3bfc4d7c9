//! Lazarus CLI entry point.
//!
//! Provides `start` and `check` subcommands for running the supervised host
//! or validating configuration and notification wiring.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use lazarus::clock::SystemClock;
use lazarus::config::{lazarus_paths, load_or_default, LazarusConfig};
use lazarus::reporter::TelegramReporter;
use lazarus::respawn::SystemProcess;
use lazarus::supervisor::{run_supervised, Supervisor};

/// Lazarus — crash-restart supervisor for chat-bot processes.
#[derive(Parser)]
#[command(name = "lazarus", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the supervised host process.
    Start {
        /// Inject a host failure after this many seconds (restart drill).
        #[arg(long, value_name = "SECS")]
        fail_after: Option<u64>,
    },
    /// Validate configuration and report the effective restart policy.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Start { fail_after } => handle_start(fail_after).await,
        Command::Check => handle_check(),
    }
}

/// Run the supervised host process.
async fn handle_start(fail_after: Option<u64>) -> anyhow::Result<()> {
    let paths = lazarus_paths()?;
    std::fs::create_dir_all(&paths.root)
        .with_context(|| format!("failed to create {}", paths.root.display()))?;

    let _logging_guard = lazarus::logging::init_daemon(&paths.logs_dir)?;

    let config = load_or_default(&paths.config_toml)
        .with_context(|| format!("failed to load {}", paths.config_toml.display()))?;

    let supervisor = Supervisor::new(
        config.restart,
        Arc::new(SystemClock),
        Arc::new(SystemProcess),
    );

    if let Some(reporter) = build_reporter(&config) {
        supervisor.bind_notifier(Arc::new(reporter));
    }

    info!(
        config = %paths.config_toml.display(),
        max_restarts = config.restart.max_restarts,
        restart_delay_ms = config.restart.restart_delay_ms,
        reset_window_ms = config.restart.reset_window_ms,
        "lazarus supervisor started"
    );

    run_supervised(&supervisor, host(fail_after)).await
}

/// Build the Telegram reporter, or `None` when notification config is
/// incomplete. Missing token or chats is a non-fatal condition: restarts
/// still happen, alerts are just skipped.
fn build_reporter(config: &LazarusConfig) -> Option<TelegramReporter> {
    let token = match std::env::var(&config.telegram.bot_token_env) {
        Ok(token) if !token.is_empty() => token,
        _ => {
            warn!(
                var = %config.telegram.bot_token_env,
                "bot token not set, operator alerts disabled"
            );
            return None;
        }
    };

    let chats = config.telegram.resolved_chats();
    if chats.is_empty() {
        warn!(
            var = %config.telegram.chat_id_env,
            "no operator chats configured, operator alerts disabled"
        );
        return None;
    }

    Some(TelegramReporter::new(
        &token,
        chats,
        config.reports.prefix.clone(),
    ))
}

/// Host stand-in: the chat-bot runtime plugs in here. Waits for a shutdown
/// signal (graceful), or fails after the `--fail-after` drill deadline to
/// exercise the full restart pipeline.
async fn host(fail_after: Option<u64>) -> anyhow::Result<()> {
    match fail_after {
        Some(secs) => {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    result.context("failed to listen for shutdown signal")?;
                    info!("shutdown signal received");
                    Ok(())
                }
                () = tokio::time::sleep(Duration::from_secs(secs)) => {
                    anyhow::bail!("induced failure after {secs}s (--fail-after)")
                }
            }
        }
        None => {
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for shutdown signal")?;
            info!("shutdown signal received");
            Ok(())
        }
    }
}

/// Validate configuration and report the effective restart policy.
fn handle_check() -> anyhow::Result<()> {
    lazarus::logging::init_cli();

    let paths = lazarus_paths()?;
    let config = load_or_default(&paths.config_toml)
        .with_context(|| format!("failed to load {}", paths.config_toml.display()))?;

    info!(
        max_restarts = config.restart.max_restarts,
        restart_delay_ms = config.restart.restart_delay_ms,
        reset_window_ms = config.restart.reset_window_ms,
        "effective restart policy"
    );

    let token_set = std::env::var(&config.telegram.bot_token_env).is_ok_and(|t| !t.is_empty());
    let chats = config.telegram.resolved_chats();

    if token_set && !chats.is_empty() {
        info!(chats = chats.len(), "operator alerts wired");
    } else {
        warn!(
            token_set,
            chats = chats.len(),
            "operator alerts not wired (token or chats missing)"
        );
    }

    Ok(())
}
