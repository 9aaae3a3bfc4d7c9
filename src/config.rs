//! Configuration loading for the Lazarus supervisor.
//!
//! Loads `lazarus.toml` with per-section defaults. All sections use
//! `#[serde(default)]` so a minimal or empty config file is valid, and a
//! missing file falls back to defaults entirely.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::state::RestartPolicy;

/// Top-level Lazarus configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LazarusConfig {
    /// Restart policy: ceiling, backoff delay, and reset window.
    #[serde(default)]
    pub restart: RestartPolicy,

    /// Telegram notification targets.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Reporting presentation settings.
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Telegram notification targets.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Environment variable name holding the bot token.
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,

    /// Environment variable name holding an additional operator chat id.
    #[serde(default = "default_chat_id_env")]
    pub chat_id_env: String,

    /// Chat ids to receive restart alerts (merged with `chat_id_env`).
    #[serde(default)]
    pub notify_chats: Vec<i64>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token_env: default_bot_token_env(),
            chat_id_env: default_chat_id_env(),
            notify_chats: Vec::new(),
        }
    }
}

impl TelegramConfig {
    /// Operator chats from the config file plus the env-sourced chat id,
    /// if set and parseable. Duplicates are dropped.
    pub fn resolved_chats(&self) -> Vec<i64> {
        let mut chats = self.notify_chats.clone();
        if let Ok(raw) = std::env::var(&self.chat_id_env) {
            match raw.trim().parse::<i64>() {
                Ok(id) => {
                    if !chats.contains(&id) {
                        chats.push(id);
                    }
                }
                Err(_) => {
                    tracing::warn!(var = %self.chat_id_env, "ignoring non-numeric chat id from environment");
                }
            }
        }
        chats
    }
}

/// Reporting presentation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    /// Prefix prepended to all Telegram messages from Lazarus.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

/// Resolved filesystem paths for Lazarus state.
#[derive(Debug, Clone)]
pub struct LazarusPaths {
    /// Root directory (`~/.lazarus/`).
    pub root: PathBuf,

    /// Path to `lazarus.toml`.
    pub config_toml: PathBuf,

    /// Directory for JSON log files.
    pub logs_dir: PathBuf,
}

impl LazarusConfig {
    /// Validate that configuration values are within sane bounds.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-bounds value.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (1..=50).contains(&self.restart.max_restarts),
            "restart.max_restarts must be in 1..=50"
        );
        anyhow::ensure!(
            (100..=300_000).contains(&self.restart.restart_delay_ms),
            "restart.restart_delay_ms must be in 100..=300000"
        );
        anyhow::ensure!(
            self.restart.reset_window_ms >= self.restart.restart_delay_ms,
            "restart.reset_window_ms must be >= restart.restart_delay_ms"
        );
        anyhow::ensure!(
            !self.telegram.bot_token_env.is_empty(),
            "telegram.bot_token_env must not be empty"
        );
        anyhow::ensure!(
            !self.reports.prefix.is_empty(),
            "reports.prefix must not be empty"
        );
        Ok(())
    }
}

/// Load Lazarus configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub fn load_config(path: &Path) -> anyhow::Result<LazarusConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read lazarus config at {}", path.display()))?;
    let config: LazarusConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse lazarus config at {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from the given path, or defaults if the file is absent.
///
/// A missing config file is an expected first-run condition, not an error.
///
/// # Errors
///
/// Returns an error if a present file cannot be read, parsed, or validated.
pub fn load_or_default(path: &Path) -> anyhow::Result<LazarusConfig> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "no config file found, using defaults");
        return Ok(LazarusConfig::default());
    }
    load_config(path)
}

/// Resolve Lazarus filesystem paths under `~/.lazarus/`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn lazarus_paths() -> anyhow::Result<LazarusPaths> {
    let base = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    let root = base.home_dir().join(".lazarus");
    let config_toml = root.join("lazarus.toml");
    let logs_dir = root.join("logs");

    Ok(LazarusPaths {
        root,
        config_toml,
        logs_dir,
    })
}

// Default value functions for serde.

fn default_bot_token_env() -> String {
    "LAZARUS_TELEGRAM_TOKEN".to_owned()
}

fn default_chat_id_env() -> String {
    "LAZARUS_CHAT_ID".to_owned()
}

fn default_prefix() -> String {
    "Lazarus".to_owned()
}
