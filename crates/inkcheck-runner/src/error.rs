//! Error types for runner module

use thiserror::Error;

/// Failures to execute an external command.
///
/// A command that runs and exits non-zero is NOT an error here; it comes back
/// as a [`ProcessOutput`](crate::ProcessOutput) with its exit code.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to launch '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("Failed to wait for '{program}': {reason}")]
    Wait { program: String, reason: String },

    #[error("Execution timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },
}

impl RunnerError {
    /// Whether the error means the toolchain is missing or not executable,
    /// as opposed to a command that started and misbehaved.
    #[must_use]
    pub const fn is_launch_failure(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }
}
