//! Structured restart alerts and human-readable formatters.
//!
//! The supervisor hands a [`RestartAlert`] to whatever notifier is bound;
//! rendering (Telegram HTML, log lines) happens downstream. The formatters
//! live here because the alert contract fixes their output shape.

use serde::{Deserialize, Serialize};

/// How urgent an alert is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// A restart is being attempted; the ceiling has not been hit.
    Warning,
    /// The restart ceiling was reached; the process is going down for good.
    Critical,
}

/// Operator-facing description of one restart attempt (or the final
/// giving-up notice).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartAlert {
    /// The triggering error, verbatim.
    pub reason: String,

    /// One-based attempt index within the current reset window.
    pub attempt: u32,

    /// Attempt ceiling before the supervisor gives up.
    pub max_restarts: u32,

    /// Resident set size of the process, if it could be sampled.
    pub memory_bytes: Option<u64>,

    /// Seconds this process image has been alive.
    pub uptime_secs: u64,

    /// Warning while retrying, critical once terminal.
    pub severity: AlertSeverity,
}

impl RestartAlert {
    /// Memory usage as a human-readable byte count, or "unknown".
    pub fn memory_display(&self) -> String {
        self.memory_bytes
            .map_or_else(|| "unknown".to_owned(), format_bytes)
    }

    /// Uptime as `Dd Hh Mm Ss`.
    pub fn uptime_display(&self) -> String {
        format_uptime(self.uptime_secs)
    }
}

/// Format a byte count with binary prefixes (base 1024).
///
/// Plain byte counts render without decimals (`"0 B"`, `"512 B"`); scaled
/// values always carry two decimals (`"1.00 KB"`, `"1.50 KB"`).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < UNITS.len().saturating_sub(1) {
        value /= 1024.0;
        unit = unit.saturating_add(1);
    }

    format!("{value:.2} {}", UNITS[unit])
}

/// Format an uptime in seconds as `Dd Hh Mm Ss`.
///
/// Example: `90061` becomes `"1d 1h 1m 1s"`.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{days}d {hours}h {minutes}m {seconds}s")
}

/// Sample the resident set size of the current process.
///
/// Linux only (reads `/proc/self/statm`); returns `None` elsewhere or when
/// the file cannot be read or parsed.
#[cfg(target_os = "linux")]
pub fn memory_rss_bytes() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    // Page size is 4 KiB on every Linux target we ship to.
    Some(resident_pages.saturating_mul(4096))
}

/// Sample the resident set size of the current process.
///
/// Not supported on this platform; always `None`.
#[cfg(not(target_os = "linux"))]
pub fn memory_rss_bytes() -> Option<u64> {
    None
}
