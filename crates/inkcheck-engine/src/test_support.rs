//! Scripted process runner for pipeline tests
//!
//! [`FakeRunner`] answers each command with the next queued [`FakeStep`] and
//! records every invocation. A step can also write files relative to the
//! command's working directory, which is how tests stand in for the auditor
//! writing its report or the scaffold creating a manifest.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use inkcheck_runner::{CommandSpec, ProcessOutput, ProcessRunner, RunnerError};

/// Rendered default build command
pub const BUILD_COMMAND: &str = "cargo contract build";
/// Rendered default audit command
pub const AUDIT_COMMAND: &str = "cargo scout-audit --output-format json";
/// Rendered default scaffold command, before the directory name
pub const SCAFFOLD_COMMAND: &str = "cargo contract new";
/// Default report file name, relative to the workspace root
pub const REPORT_FILE: &str = "report.json";

#[derive(Debug, Clone)]
enum Response {
    Output(ProcessOutput),
    Timeout,
    SpawnFailure,
}

/// One scripted answer.
#[derive(Debug, Clone)]
pub struct FakeStep {
    response: Response,
    writes: Vec<(PathBuf, String)>,
}

impl FakeStep {
    #[must_use]
    pub fn exit(code: i32, stdout: &str, stderr: &str) -> Self {
        Self::respond(Response::Output(ProcessOutput::exited(code, stdout, stderr)))
    }

    #[must_use]
    pub fn success() -> Self {
        Self::exit(0, "", "")
    }

    /// Terminated by a signal: no exit code.
    #[must_use]
    pub fn killed() -> Self {
        Self::respond(Response::Output(ProcessOutput::new(
            Vec::new(),
            Vec::new(),
            None,
            false,
        )))
    }

    #[must_use]
    pub fn timeout() -> Self {
        Self::respond(Response::Timeout)
    }

    #[must_use]
    pub fn spawn_failure() -> Self {
        Self::respond(Response::SpawnFailure)
    }

    /// Write `content` to `path` (relative to the command's cwd) before answering.
    #[must_use]
    pub fn writes(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.writes.push((path.into(), content.into()));
        self
    }

    /// Write the audit report before answering.
    #[must_use]
    pub fn writes_report(self, content: impl Into<String>) -> Self {
        self.writes(REPORT_FILE, content)
    }

    const fn respond(response: Response) -> Self {
        Self {
            response,
            writes: Vec::new(),
        }
    }
}

/// A recorded command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub cwd: Option<PathBuf>,
}

/// Process runner that never spawns anything.
///
/// Scripts are keyed by the rendered command. A key also matches commands
/// that extend it with further arguments, so `cargo contract new` matches
/// `cargo contract new Test-Cargo`. Unscripted commands succeed with no output.
#[derive(Debug, Default)]
pub struct FakeRunner {
    scripts: Mutex<HashMap<String, VecDeque<FakeStep>>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `step` as the next answer for `command`.
    #[must_use]
    pub fn script(self, command: &str, step: FakeStep) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(command.to_string())
            .or_default()
            .push_back(step);
        self
    }

    #[must_use]
    pub fn on_build(self, step: FakeStep) -> Self {
        self.script(BUILD_COMMAND, step)
    }

    #[must_use]
    pub fn on_audit(self, step: FakeStep) -> Self {
        self.script(AUDIT_COMMAND, step)
    }

    #[must_use]
    pub fn on_scaffold(self, step: FakeStep) -> Self {
        self.script(SCAFFOLD_COMMAND, step)
    }

    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded invocations matching `command`.
    #[must_use]
    pub fn calls(&self, command: &str) -> usize {
        self.invocations()
            .iter()
            .filter(|inv| matches_key(&inv.command, command))
            .count()
    }

    #[must_use]
    pub fn build_calls(&self) -> usize {
        self.calls(BUILD_COMMAND)
    }

    #[must_use]
    pub fn audit_calls(&self) -> usize {
        self.calls(AUDIT_COMMAND)
    }

    fn next_step(&self, rendered: &str) -> Option<FakeStep> {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let key = if scripts.contains_key(rendered) {
            rendered.to_string()
        } else {
            scripts
                .keys()
                .filter(|key| matches_key(rendered, key))
                .max_by_key(|key| key.len())?
                .clone()
        };
        scripts.get_mut(&key)?.pop_front()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        let rendered = cmd.display();
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Invocation {
                command: rendered.clone(),
                cwd: cmd.cwd.clone(),
            });

        let Some(step) = self.next_step(&rendered) else {
            return Ok(ProcessOutput::exited(0, "", ""));
        };

        let base = cmd.cwd.clone().unwrap_or_else(|| PathBuf::from("."));
        for (relative, content) in &step.writes {
            let path = base.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent of scripted file");
            }
            fs::write(&path, content).expect("write scripted file");
        }

        match step.response {
            Response::Output(output) => Ok(output),
            Response::Timeout => Err(RunnerError::Timeout {
                timeout_seconds: timeout.as_secs(),
            }),
            Response::SpawnFailure => Err(RunnerError::Spawn {
                program: cmd.program.to_string_lossy().into_owned(),
                reason: "No such file or directory (os error 2)".to_string(),
            }),
        }
    }
}

fn matches_key(rendered: &str, key: &str) -> bool {
    rendered == key
        || rendered
            .strip_prefix(key)
            .is_some_and(|rest| rest.starts_with(' '))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_consumed_in_order() {
        let runner = FakeRunner::new()
            .on_build(FakeStep::exit(1, "", "first"))
            .on_build(FakeStep::exit(0, "second", ""));
        let cmd = CommandSpec::new("cargo").args(["contract", "build"]);

        let first = runner.run(&cmd, Duration::from_secs(1)).unwrap();
        let second = runner.run(&cmd, Duration::from_secs(1)).unwrap();
        let third = runner.run(&cmd, Duration::from_secs(1)).unwrap();

        assert_eq!(first.exit_code, Some(1));
        assert_eq!(second.stdout_string(), "second");
        assert!(third.success());
        assert_eq!(runner.build_calls(), 3);
        assert_eq!(runner.audit_calls(), 0);
    }

    #[test]
    fn test_prefix_key_matches_extended_command() {
        assert!(matches_key("cargo contract new Test-Cargo", SCAFFOLD_COMMAND));
        assert!(!matches_key("cargo contract newer", SCAFFOLD_COMMAND));
        assert!(!matches_key(BUILD_COMMAND, SCAFFOLD_COMMAND));
    }
}
