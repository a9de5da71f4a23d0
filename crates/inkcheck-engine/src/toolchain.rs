//! Build and audit steps against the shared workspace
//!
//! Both steps run with the workspace root as an explicit working directory.
//! A step that outlives the configured timeout comes back as a timed-out
//! [`ProcessOutput`] so the classifier can record it; only a toolchain that
//! cannot be launched at all surfaces as an error.

use std::path::Path;
use std::time::{Duration, Instant};

use inkcheck_config::ToolchainConfig;
use inkcheck_runner::{CommandSpec, ProcessOutput, ProcessRunner, RunnerError};
use inkcheck_utils::error::{ConfigError, InkcheckError};
use inkcheck_utils::logging::{log_step_complete, log_step_start};
use tracing::warn;

use crate::classifier::Step;
use crate::workspace::Workspace;

/// The configured build, audit and scaffold commands plus the step timeout.
#[derive(Debug, Clone)]
pub struct Toolchain {
    build: CommandSpec,
    audit: CommandSpec,
    scaffold: CommandSpec,
    timeout: Duration,
}

impl Toolchain {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a command array is empty.
    pub fn from_config(config: &ToolchainConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            build: command_from_argv("toolchain.build", &config.build)?,
            audit: command_from_argv("toolchain.audit", &config.audit)?,
            scaffold: command_from_argv("toolchain.scaffold", &config.scaffold)?,
            timeout: config.timeout(),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn build_command(&self) -> &CommandSpec {
        &self.build
    }

    #[must_use]
    pub const fn audit_command(&self) -> &CommandSpec {
        &self.audit
    }

    /// Scaffold command without the directory name argument.
    #[must_use]
    pub const fn scaffold_command(&self) -> &CommandSpec {
        &self.scaffold
    }

    /// Compile whatever is currently staged in the workspace.
    ///
    /// # Errors
    ///
    /// Returns `InkcheckError::Runner` when the build tool cannot be launched.
    pub fn build<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        workspace: &Workspace,
        artifact: &str,
    ) -> Result<ProcessOutput, InkcheckError> {
        self.run_step(runner, &self.build, workspace.root(), artifact, Step::Build)
    }

    /// Audit the workspace. The report file is deleted first so that only a
    /// report written by this run can be read afterwards.
    ///
    /// # Errors
    ///
    /// Returns `InkcheckError::Workspace` if the stale report cannot be
    /// removed and `InkcheckError::Runner` when the auditor cannot be launched.
    pub fn audit<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        workspace: &Workspace,
        artifact: &str,
    ) -> Result<ProcessOutput, InkcheckError> {
        workspace.clear_report()?;
        self.run_step(runner, &self.audit, workspace.root(), artifact, Step::Audit)
    }

    /// Check that every configured program resolves on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::Spawn` naming the first program that is missing.
    pub fn preflight(&self) -> Result<(), RunnerError> {
        for command in [&self.build, &self.audit, &self.scaffold] {
            which::which(&command.program).map_err(|e| RunnerError::Spawn {
                program: command.program.to_string_lossy().into_owned(),
                reason: format!("not found on PATH ({e})"),
            })?;
        }
        Ok(())
    }

    fn run_step<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        spec: &CommandSpec,
        cwd: &Path,
        artifact: &str,
        step: Step,
    ) -> Result<ProcessOutput, InkcheckError> {
        let command = spec.clone().cwd(cwd);
        log_step_start(artifact, step.as_str());
        let started = Instant::now();

        let output = match runner.run(&command, self.timeout) {
            Ok(output) => output,
            Err(RunnerError::Timeout { timeout_seconds }) => {
                warn!(
                    artifact = %artifact,
                    step = step.as_str(),
                    timeout_secs = timeout_seconds,
                    "Step timed out"
                );
                ProcessOutput::timed_out(self.timeout)
            }
            Err(e) => return Err(e.into()),
        };

        log_step_complete(
            artifact,
            step.as_str(),
            output.exit_code,
            started.elapsed().as_millis(),
        );
        Ok(output)
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            build: CommandSpec::new("cargo").args(["contract", "build"]),
            audit: CommandSpec::new("cargo").args(["scout-audit", "--output-format", "json"]),
            scaffold: CommandSpec::new("cargo").args(["contract", "new"]),
            timeout: ToolchainConfig::default().timeout(),
        }
    }
}

fn command_from_argv(key: &str, argv: &[String]) -> Result<CommandSpec, ConfigError> {
    CommandSpec::from_argv(argv).ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        value: "[]".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeRunner, FakeStep};
    use crate::workspace::WorkspaceLayout;
    use tempfile::TempDir;

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::open(dir.path(), WorkspaceLayout::default()).unwrap()
    }

    #[test]
    fn test_default_matches_config_defaults() {
        let from_config = Toolchain::from_config(&ToolchainConfig::default()).unwrap();
        let default = Toolchain::default();
        assert_eq!(from_config.build_command().display(), default.build_command().display());
        assert_eq!(from_config.audit_command().display(), default.audit_command().display());
        assert_eq!(
            from_config.scaffold_command().display(),
            default.scaffold_command().display()
        );
        assert_eq!(from_config.timeout(), default.timeout());
    }

    #[test]
    fn test_empty_argv_rejected() {
        let config = ToolchainConfig {
            audit: vec![],
            ..ToolchainConfig::default()
        };
        let err = Toolchain::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "toolchain.audit"));
    }

    #[test]
    fn test_build_runs_in_workspace_root() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        let runner = FakeRunner::new().on_build(FakeStep::exit(0, "", ""));

        let output = Toolchain::default().build(&runner, &ws, "Token_0").unwrap();
        assert!(output.success());

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].cwd.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_timeout_becomes_timed_out_output() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        let runner = FakeRunner::new().on_build(FakeStep::timeout());
        let toolchain = Toolchain::default().with_timeout(Duration::from_secs(3));

        let output = toolchain.build(&runner, &ws, "Token_0").unwrap();
        assert!(output.timed_out);
        assert!(output.stderr_string().contains("3 seconds"));
    }

    #[test]
    fn test_spawn_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        let runner = FakeRunner::new().on_build(FakeStep::spawn_failure());

        let result = Toolchain::default().build(&runner, &ws, "Token_0");
        assert!(matches!(
            result,
            Err(InkcheckError::Runner(RunnerError::Spawn { .. }))
        ));
    }

    #[test]
    fn test_audit_deletes_stale_report_first() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        std::fs::write(ws.report_path(), r#"{"stale": []}"#).unwrap();
        let runner = FakeRunner::new().on_audit(FakeStep::exit(0, "", ""));

        Toolchain::default().audit(&runner, &ws, "Token_0").unwrap();
        assert!(!ws.report_path().exists());
    }

    #[test]
    fn test_preflight_reports_missing_program() {
        let config = ToolchainConfig {
            build: vec!["inkcheck-definitely-not-installed".to_string()],
            ..ToolchainConfig::default()
        };
        let toolchain = Toolchain::from_config(&config).unwrap();
        let err = toolchain.preflight().unwrap_err();
        assert!(err.is_launch_failure());
        assert!(err.to_string().contains("inkcheck-definitely-not-installed"));
    }
}
