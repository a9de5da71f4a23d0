use crate::error::RunnerError;
use std::io::Read;
use std::process::{ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

use super::{CommandSpec, ProcessOutput, ProcessRunner};

/// Time between SIGTERM and SIGKILL for a timed-out process group
const KILL_GRACE_PERIOD: Duration = Duration::from_secs(2);

// ============================================================================
// NativeRunner - direct process execution
// ============================================================================

/// Native process runner using `std::process::Command`.
///
/// The child is waited for on a helper thread so the caller can enforce a
/// deadline with `recv_timeout`; the public API stays synchronous. Each child
/// leads its own process group on unix, so a timeout terminates everything
/// it spawned (cargo's rustc processes included) and [`RunnerError::Timeout`]
/// is returned without waiting on stray grandchildren.
///
/// # Example
///
/// ```rust,no_run
/// use inkcheck_runner::{CommandSpec, NativeRunner, ProcessRunner};
/// use std::time::Duration;
///
/// let runner = NativeRunner::new();
/// let cmd = CommandSpec::new("cargo")
///     .args(["contract", "build"])
///     .cwd("Test-Cargo");
///
/// let output = runner.run(&cmd, Duration::from_secs(600)).unwrap();
/// println!("exit code: {:?}", output.exit_code);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRunner;

impl NativeRunner {
    /// Create a new `NativeRunner`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessRunner for NativeRunner {
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        let program = cmd.program.to_string_lossy().to_string();

        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // New process group so killpg reaches grandchildren
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        debug!(command = %cmd.display(), cwd = ?cmd.cwd, "Spawning process");

        let mut child = command.spawn().map_err(|e| RunnerError::Spawn {
            program: program.clone(),
            reason: e.to_string(),
        })?;

        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());
        let child_id = child.id();

        let (tx, rx) = mpsc::channel::<std::io::Result<ExitStatus>>();
        let waiter = thread::spawn(move || {
            let _ = tx.send(child.wait());
        });

        match rx.recv_timeout(timeout) {
            Ok(status) => {
                let _ = waiter.join();
                let status = status.map_err(|e| RunnerError::Wait {
                    program: program.clone(),
                    reason: e.to_string(),
                })?;

                Ok(ProcessOutput::new(
                    join_reader(stdout_reader),
                    join_reader(stderr_reader),
                    status.code(),
                    false,
                ))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    command = %cmd.display(),
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "Process exceeded timeout, terminating process group"
                );
                Self::terminate_process_group(child_id, &rx);

                // Pipes close once the whole group is gone
                let _ = waiter.join();
                let _ = join_reader(stdout_reader);
                let _ = join_reader(stderr_reader);

                Err(RunnerError::Timeout {
                    timeout_seconds: timeout.as_secs(),
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(RunnerError::Wait {
                program,
                reason: "process monitoring thread terminated unexpectedly".to_string(),
            }),
        }
    }
}

impl NativeRunner {
    /// SIGTERM the child's process group, give it [`KILL_GRACE_PERIOD`] to
    /// exit, then SIGKILL whatever is left of the group.
    #[cfg(unix)]
    fn terminate_process_group(pid: u32, exited: &mpsc::Receiver<std::io::Result<ExitStatus>>) {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(pid) else {
            return;
        };
        let pgid = Pid::from_raw(raw);

        let _ = killpg(pgid, Signal::SIGTERM);
        if exited.recv_timeout(KILL_GRACE_PERIOD).is_ok() {
            debug!(pid, "Process group leader exited after SIGTERM");
        }
        // Grandchildren may ignore SIGTERM or outlive the leader
        let _ = killpg(pgid, Signal::SIGKILL);
    }

    #[cfg(not(unix))]
    fn terminate_process_group(pid: u32, _exited: &mpsc::Receiver<std::io::Result<ExitStatus>>) {
        // TODO: terminate via a job object on Windows; the waiter thread
        // currently blocks until the child exits on its own.
        let _ = pid;
    }
}

/// Read a pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        buffer
    })
}

fn join_reader(reader: JoinHandle<Vec<u8>>) -> Vec<u8> {
    reader.join().unwrap_or_default()
}
