//! Lazarus — crash-restart supervisor for chat-bot processes.
//!
//! Tracks a rolling restart count with a time-based reset window, caps
//! retries, alerts operators via Telegram, and replaces the process image
//! after a fixed backoff. The host bot itself is out of scope: it plugs in
//! through [`supervisor::run_supervised`], and the outside world is reached
//! through the [`reporter::Notifier`], [`respawn::ProcessControl`], and
//! [`clock::Clock`] seams so every decision is testable with injected time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Structured restart alerts and human-readable formatters.
pub mod alert;
/// Injectable wall-clock abstraction.
pub mod clock;
/// Configuration loading and validation.
pub mod config;
/// Structured logging setup.
pub mod logging;
/// Telegram notification reporter.
pub mod reporter;
/// Detached replacement of the current process image.
pub mod respawn;
/// Restart bookkeeping: policy constants, counters, and the retry decision.
pub mod state;
/// Restart orchestration and host supervision.
pub mod supervisor;
