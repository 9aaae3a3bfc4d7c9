//! Restart orchestration and host supervision.
//!
//! [`Supervisor::restart`] is the sole mutating entry point: it evaluates
//! the restart counters, notifies operators (best-effort), waits out the
//! backoff, spawns a detached replacement image, and terminates the current
//! process. [`run_supervised`] routes host errors and panics into it.

use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::alert::{self, AlertSeverity, RestartAlert};
use crate::clock::Clock;
use crate::reporter::Notifier;
use crate::respawn::ProcessControl;
use crate::state::{RestartDecision, RestartPolicy, RestartState};

/// What a [`Supervisor::restart`] call ended up doing.
///
/// Production callers never observe this: the process exits or is replaced
/// first. The enum exists so the full sequence is checkable with injected
/// [`ProcessControl`] and [`Clock`] doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// A replacement image was spawned and `exit(0)` was requested.
    Relaunched,
    /// Spawning failed twice and `exit(1)` was requested.
    RelaunchFailed,
    /// The ceiling was hit within the reset window; `exit(1)` was requested
    /// without spawning anything.
    CeilingReached,
    /// Another restart was already in flight; this report was dropped.
    Skipped,
}

/// Crash-restart supervisor.
///
/// One instance per process image, created at process start and shared with
/// the fatal-error paths. All counters live behind `&self` so those paths
/// never need a mutable handle.
pub struct Supervisor {
    policy: RestartPolicy,
    state: Mutex<RestartState>,
    clock: Arc<dyn Clock>,
    process: Arc<dyn ProcessControl>,
    notifier: OnceLock<Arc<dyn Notifier>>,
    in_flight: AtomicBool,
    started_at: DateTime<Utc>,
}

impl Supervisor {
    /// Create a supervisor with the window anchored at the current time.
    pub fn new(policy: RestartPolicy, clock: Arc<dyn Clock>, process: Arc<dyn ProcessControl>) -> Self {
        let started_at = clock.now();
        Self {
            policy,
            state: Mutex::new(RestartState::new(started_at)),
            clock,
            process,
            notifier: OnceLock::new(),
            in_flight: AtomicBool::new(false),
            started_at,
        }
    }

    /// Bind the operator notifier. At most once; a second bind is ignored
    /// with a warning. If never called, alerts are skipped (with a logged
    /// warning) and restart logic proceeds regardless.
    pub fn bind_notifier(&self, notifier: Arc<dyn Notifier>) {
        if self.notifier.set(notifier).is_err() {
            warn!("notifier already bound, ignoring second bind");
        }
    }

    /// Attempts made since the current reset window opened.
    pub fn restart_count(&self) -> u32 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .restart_count
    }

    /// Handle a fatal condition: retry with backoff or give up for good.
    ///
    /// Exactly one invocation makes progress at a time. A second call
    /// arriving while one is in flight is dropped
    /// ([`RestartOutcome::Skipped`]); the first will replace or kill the
    /// process anyway.
    pub async fn restart(&self, reason: &str) -> RestartOutcome {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!(reason, "restart already in flight, dropping report");
            return RestartOutcome::Skipped;
        }

        let outcome = self.run_restart(reason).await;

        // exit() does not return in production. When it does (process
        // control is a double), release the gate so sequential calls can
        // proceed.
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run_restart(&self, reason: &str) -> RestartOutcome {
        let now = self.clock.now();
        let decision = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .note_crash(now, &self.policy);

        match decision {
            RestartDecision::GiveUp => {
                error!(
                    reason,
                    max_restarts = self.policy.max_restarts,
                    "crashed repeatedly in quick succession, stopping automatic restarts"
                );
                let alert = self.build_alert(reason, self.policy.max_restarts, AlertSeverity::Critical);
                self.notify(&alert).await;
                self.process.exit(1);
                RestartOutcome::CeilingReached
            }
            RestartDecision::Retry { attempt } => {
                warn!(
                    reason,
                    attempt,
                    max_restarts = self.policy.max_restarts,
                    delay_ms = self.policy.restart_delay_ms,
                    "host crashed, restarting after backoff"
                );

                let alert = self.build_alert(reason, attempt, AlertSeverity::Warning);
                self.notify(&alert).await;

                tokio::time::sleep(Duration::from_millis(self.policy.restart_delay_ms)).await;

                // A failed spawn would leave no process at all; retry once,
                // then die with a non-zero status rather than hang around.
                if let Err(e) = self.process.relaunch() {
                    warn!(error = %e, "failed to spawn replacement image, retrying once");
                    if let Err(e) = self.process.relaunch() {
                        error!(error = %e, "failed to spawn replacement image twice, exiting");
                        self.process.exit(1);
                        return RestartOutcome::RelaunchFailed;
                    }
                }

                info!("hand-off complete, exiting current image");
                self.process.exit(0);
                RestartOutcome::Relaunched
            }
        }
    }

    /// Assemble the alert payload with current diagnostics.
    fn build_alert(&self, reason: &str, attempt: u32, severity: AlertSeverity) -> RestartAlert {
        let uptime = self.clock.now().signed_duration_since(self.started_at);
        RestartAlert {
            reason: reason.to_owned(),
            attempt,
            max_restarts: self.policy.max_restarts,
            memory_bytes: alert::memory_rss_bytes(),
            uptime_secs: u64::try_from(uptime.num_seconds()).unwrap_or(0),
            severity,
        }
    }

    /// Best-effort alert delivery; failure is logged and swallowed.
    async fn notify(&self, alert: &RestartAlert) {
        match self.notifier.get() {
            Some(notifier) => {
                if let Err(e) = notifier.send_alert(alert).await {
                    warn!(error = %e, "failed to send restart alert");
                }
            }
            None => {
                // Undeliverable, but the content still belongs in the log.
                let payload = serde_json::to_string(alert).unwrap_or_default();
                warn!(alert = %payload, "no notifier bound, logging restart alert instead");
            }
        }
    }
}

/// Run a host future under the supervisor.
///
/// The host is spawned as a task so panics surface as join errors rather
/// than unwinding through the caller. A clean `Ok(())` is graceful shutdown
/// and returns untouched; an `Err` or a panic is routed into
/// [`Supervisor::restart`], which in production never returns.
pub async fn run_supervised<F>(supervisor: &Supervisor, host: F) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    match tokio::spawn(host).await {
        Ok(Ok(())) => {
            info!("host exited cleanly");
            Ok(())
        }
        Ok(Err(e)) => {
            supervisor.restart(&format!("{e:#}")).await;
            Ok(())
        }
        Err(join_error) if join_error.is_panic() => {
            let reason = panic_reason(join_error.into_panic());
            supervisor.restart(&reason).await;
            Ok(())
        }
        Err(join_error) => {
            warn!(error = %join_error, "host task cancelled");
            Ok(())
        }
    }
}

/// Extract a printable reason from a panic payload.
fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("host panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("host panicked: {message}")
    } else {
        "host panicked".to_owned()
    }
}
