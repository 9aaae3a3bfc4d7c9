//! Detached replacement of the current process image.
//!
//! The only `std::process::Command` usage in the crate lives here. The
//! replacement image is the current executable with the current argument
//! vector, placed in its own process group so it survives the parent's
//! exit, with standard I/O streams inherited.

use std::ffi::OsString;

use anyhow::Context;
use tracing::info;

/// Process-level capabilities the supervisor needs: spawning a replacement
/// image and terminating the current one.
///
/// Injected so tests can observe that a replacement was (or was not)
/// requested, and with which exit code the supervisor intended to die.
pub trait ProcessControl: Send + Sync {
    /// Launch a detached replacement of the current process image.
    ///
    /// Returns once the spawn call has produced a handle; readiness of the
    /// child is not awaited.
    ///
    /// # Errors
    ///
    /// Returns an error if the executable path cannot be resolved or the
    /// spawn fails.
    fn relaunch(&self) -> anyhow::Result<()>;

    /// Terminate the current process with the given exit code.
    ///
    /// The production implementation diverges; it only returns under test
    /// doubles.
    fn exit(&self, code: i32);
}

/// Real process control backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcess;

impl ProcessControl for SystemProcess {
    fn relaunch(&self) -> anyhow::Result<()> {
        let exe = std::env::current_exe().context("failed to resolve current executable path")?;
        let args: Vec<OsString> = std::env::args_os().skip(1).collect();

        let mut command = std::process::Command::new(&exe);
        command.args(&args);

        // New process group so the child is not taken down by signals
        // delivered to the parent's group. Stdio is inherited by default.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command
            .spawn()
            .with_context(|| format!("failed to spawn replacement image {}", exe.display()))?;

        info!(pid = child.id(), exe = %exe.display(), "replacement image spawned");

        // Deliberately not waited on: the parent exits and the child is
        // reparented to init.
        drop(child);
        Ok(())
    }

    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}
