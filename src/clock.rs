//! Injectable wall-clock abstraction.
//!
//! The restart decision compares timestamps against the reset window, so
//! reading `Utc::now()` inline would make every test need real sleeps.
//! Production uses [`SystemClock`]; tests inject a manually advanced clock.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Return the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall clock backed by `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
