//! Restart bookkeeping: policy constants, counters, and the retry decision.
//!
//! Pure module: no I/O, no clock reads. The caller passes `now` in, so the
//! reset-window and ceiling behavior can be exercised with explicit
//! timestamps.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Restart policy constants. Sourced from the `[restart]` config section.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RestartPolicy {
    /// Attempts allowed within one reset window before giving up.
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,

    /// Fixed backoff between a crash and the re-exec, in milliseconds.
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    /// Elapsed time after which prior attempts are forgiven, in milliseconds.
    #[serde(default = "default_reset_window_ms")]
    pub reset_window_ms: u64,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_restarts: default_max_restarts(),
            restart_delay_ms: default_restart_delay_ms(),
            reset_window_ms: default_reset_window_ms(),
        }
    }
}

/// Outcome of asking the state whether another restart attempt is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    /// Attempt the restart; this is attempt `attempt` of `policy.max_restarts`.
    Retry {
        /// One-based attempt index within the current window.
        attempt: u32,
    },
    /// The ceiling was reached within the window. Terminal.
    GiveUp,
}

/// Mutable restart counters. One instance per process image; the counters
/// deliberately die with the process, so every replacement image starts
/// fresh.
#[derive(Debug, Clone, Copy)]
pub struct RestartState {
    /// Attempts made since the current reset window opened.
    pub restart_count: u32,

    /// Time of the most recent attempt; initialized to process start.
    pub last_restart_time: DateTime<Utc>,
}

impl RestartState {
    /// Create a fresh state with the count at zero and the window anchored
    /// at `started_at`.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            restart_count: 0,
            last_restart_time: started_at,
        }
    }

    /// Record a crash at `now` and decide whether to retry.
    ///
    /// If more than `reset_window_ms` has passed since the last attempt the
    /// count resets to zero before it is checked against the ceiling. On a
    /// retry the count is incremented and `last_restart_time` stamped, so
    /// the next crash measures its elapsed time from this attempt. On
    /// [`RestartDecision::GiveUp`] nothing is mutated; the state is
    /// terminal anyway.
    ///
    /// Negative elapsed time (clock skew) never resets the count.
    pub fn note_crash(&mut self, now: DateTime<Utc>, policy: &RestartPolicy) -> RestartDecision {
        let elapsed = now.signed_duration_since(self.last_restart_time);
        let window = Duration::milliseconds(i64::try_from(policy.reset_window_ms).unwrap_or(i64::MAX));

        if elapsed > window {
            self.restart_count = 0;
        }

        if self.restart_count >= policy.max_restarts {
            return RestartDecision::GiveUp;
        }

        self.restart_count = self.restart_count.saturating_add(1);
        self.last_restart_time = now;

        RestartDecision::Retry {
            attempt: self.restart_count,
        }
    }
}

// Default value functions for serde.

fn default_max_restarts() -> u32 {
    5
}

fn default_restart_delay_ms() -> u64 {
    5000
}

fn default_reset_window_ms() -> u64 {
    60_000
}
