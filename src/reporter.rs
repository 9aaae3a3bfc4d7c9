//! Telegram notification reporter.
//!
//! Uses teloxide Bot directly (send-only, no dispatcher). The supervisor
//! treats alert delivery as fire-and-forget-with-logging: a failed send
//! never alters the restart decision, so [`Notifier`] errors are only ever
//! logged by the caller.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::warn;

use crate::alert::{AlertSeverity, RestartAlert};

/// Delivery seam for operator alerts.
///
/// Implementations are best-effort and must not retry internally; the
/// supervisor makes exactly one attempt per alert.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a restart alert to the configured operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert could not be delivered to anyone.
    async fn send_alert(&self, alert: &RestartAlert) -> anyhow::Result<()>;
}

/// Telegram reporter for restart alerts.
pub struct TelegramReporter {
    bot: Bot,
    notify_chats: Vec<i64>,
    prefix: String,
}

impl TelegramReporter {
    /// Create a new reporter for the given bot token and operator chats.
    pub fn new(bot_token: &str, notify_chats: Vec<i64>, prefix: String) -> Self {
        Self {
            bot: Bot::new(bot_token),
            notify_chats,
            prefix,
        }
    }

    /// Render an alert as Telegram HTML.
    pub fn render(&self, alert: &RestartAlert) -> String {
        let title = match alert.severity {
            AlertSeverity::Warning => "Restarting",
            AlertSeverity::Critical => "Giving Up",
        };

        let mut text = format!(
            "<b>{prefix} \u{2014} {title}</b>\n\n\
             <pre>{reason}</pre>\n\n\
             Attempt: {attempt}/{max}\n\
             Memory: {memory}\n\
             Uptime: {uptime}",
            prefix = html_escape(&self.prefix),
            reason = html_escape(&alert.reason),
            attempt = alert.attempt,
            max = alert.max_restarts,
            memory = html_escape(&alert.memory_display()),
            uptime = html_escape(&alert.uptime_display()),
        );

        if alert.severity == AlertSeverity::Critical {
            text.push_str("\n\nMaximum restart attempts reached. Manual intervention required.");
        }

        text
    }

    /// Send a message to all configured chats.
    ///
    /// Per-chat failures are logged; the call only errors if no chat could
    /// be reached. An empty chat list is a silent no-op.
    async fn send_to_all(&self, text: &str) -> anyhow::Result<()> {
        if self.notify_chats.is_empty() {
            return Ok(());
        }
        let mut any_sent = false;
        for &chat_id in &self.notify_chats {
            match self
                .bot
                .send_message(ChatId(chat_id), text)
                .parse_mode(ParseMode::Html)
                .await
            {
                Ok(_) => any_sent = true,
                Err(e) => warn!(chat_id, error = %e, "failed to send Telegram message"),
            }
        }
        if !any_sent {
            anyhow::bail!("failed to send Telegram message to any configured chat");
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramReporter {
    async fn send_alert(&self, alert: &RestartAlert) -> anyhow::Result<()> {
        let text = self.render(alert);
        self.send_to_all(&text).await
    }
}

/// Escape HTML special characters for Telegram.
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
