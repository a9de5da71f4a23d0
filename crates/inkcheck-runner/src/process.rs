use crate::error::RunnerError;
use std::time::Duration;

use super::CommandSpec;

// ============================================================================
// ProcessRunner Trait - Process Execution Interface
// ============================================================================

/// Output from a process execution.
///
/// Both streams are kept as raw bytes so that diagnostics can be persisted
/// verbatim. Exactly one of success and failure holds, see [`success`](Self::success).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output from the process
    pub stdout: Vec<u8>,
    /// Standard error from the process
    pub stderr: Vec<u8>,
    /// Exit code from the process (None if terminated by signal or timed out)
    pub exit_code: Option<i32>,
    /// Whether the execution was cut off by the runner's timeout
    pub timed_out: bool,
}

impl ProcessOutput {
    /// Create a new `ProcessOutput` with the given values.
    #[must_use]
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: Option<i32>, timed_out: bool) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            timed_out,
        }
    }

    /// A process that exited normally with the given code.
    #[must_use]
    pub fn exited(exit_code: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self::new(stdout.into(), stderr.into(), Some(exit_code), false)
    }

    /// A process the runner killed after its deadline passed.
    ///
    /// Stderr carries a one-line note naming the timeout so the record is
    /// self-describing when persisted.
    #[must_use]
    pub fn timed_out(timeout: Duration) -> Self {
        let note = format!(
            "process exceeded timeout of {} seconds and was killed\n",
            timeout.as_secs()
        );
        Self::new(Vec::new(), note.into_bytes(), None, true)
    }

    /// Get stdout as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Stdout immediately followed by stderr, with no separator added.
    #[must_use]
    pub fn combined_output(&self) -> String {
        let mut combined = self.stdout_string();
        combined.push_str(&self.stderr_string());
        combined
    }

    /// Check if the process exited successfully (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }
}

/// Trait for process execution.
///
/// Implementations MUST use argv-style APIs only and MUST honour
/// [`CommandSpec::cwd`] without touching the process-wide working directory.
///
/// # Returns
///
/// * `Ok(ProcessOutput)` - the process ran to completion, whatever its exit code
/// * `Err(RunnerError::Timeout)` - the process exceeded `timeout` and was killed
/// * `Err(RunnerError::Spawn)` - the program could not be launched at all
pub trait ProcessRunner {
    /// Execute a command with the given timeout.
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        (**self).run(cmd, timeout)
    }
}
