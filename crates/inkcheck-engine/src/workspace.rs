//! The shared contract project every artifact is staged into
//!
//! The workspace is a single `cargo contract` project. Each artifact replaces
//! its source file in turn; the manifest and lockfile are reused so that
//! dependency resolution is paid once per run.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use inkcheck_config::WorkspaceConfig;
use inkcheck_runner::{ProcessRunner, RunnerError};
use inkcheck_utils::error::{InkcheckError, WorkspaceError};
use tracing::{debug, info};

use crate::toolchain::Toolchain;

/// File names inside the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub source_file: String,
    pub report_file: String,
    pub manifest_file: String,
}

impl WorkspaceLayout {
    #[must_use]
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self {
            source_file: config.source_file.clone(),
            report_file: config.report_file.clone(),
            manifest_file: config.manifest_file.clone(),
        }
    }
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self::from_config(&WorkspaceConfig::default())
    }
}

/// How long to wait for the scaffolded manifest to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaffoldPoll {
    pub interval: Duration,
    pub deadline: Duration,
}

impl ScaffoldPoll {
    #[must_use]
    pub const fn from_config(config: &WorkspaceConfig) -> Self {
        Self {
            interval: config.scaffold_poll_interval(),
            deadline: config.scaffold_deadline(),
        }
    }
}

impl Default for ScaffoldPoll {
    fn default() -> Self {
        Self::from_config(&WorkspaceConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    layout: WorkspaceLayout,
}

impl Workspace {
    /// Open an existing workspace directory.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Missing` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>, layout: WorkspaceLayout) -> Result<Self, WorkspaceError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(WorkspaceError::Missing {
                path: root.display().to_string(),
            });
        }
        Ok(Self { root, layout })
    }

    /// Create the project with the scaffold command unless its manifest
    /// already exists, then wait for the manifest to appear.
    ///
    /// The scaffold command runs in the parent of `root` with the directory
    /// name appended as its last argument.
    ///
    /// # Errors
    ///
    /// - `InkcheckError::Runner` when the scaffold tool cannot be launched
    /// - `WorkspaceError::ScaffoldFailed` when it exits non-zero or times out
    /// - `WorkspaceError::ScaffoldTimeout` when the manifest never appears
    pub fn scaffold<R: ProcessRunner + ?Sized>(
        root: impl Into<PathBuf>,
        layout: WorkspaceLayout,
        runner: &R,
        toolchain: &Toolchain,
        poll: ScaffoldPoll,
    ) -> Result<Self, InkcheckError> {
        let root = root.into();
        let manifest = root.join(&layout.manifest_file);
        if manifest.is_file() {
            info!(workspace = %root.display(), "Workspace already scaffolded");
            return Ok(Self::open(root, layout)?);
        }

        let dir_name = root.file_name().ok_or_else(|| WorkspaceError::Io {
            path: root.display().to_string(),
            reason: "workspace path has no directory name".to_string(),
        })?;
        let parent = match root.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| io_error(&parent, &e))?;

        let command = toolchain
            .scaffold_command()
            .clone()
            .arg(dir_name)
            .cwd(&parent);
        info!(command = %command.display(), cwd = %parent.display(), "Scaffolding workspace");

        let output = match runner.run(&command, toolchain.timeout()) {
            Ok(output) => output,
            Err(e @ RunnerError::Timeout { .. }) => {
                return Err(WorkspaceError::ScaffoldFailed {
                    command: command.display(),
                    exit_code: None,
                    output: e.to_string(),
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };
        if !output.success() {
            return Err(WorkspaceError::ScaffoldFailed {
                command: command.display(),
                exit_code: output.exit_code,
                output: output.combined_output(),
            }
            .into());
        }

        wait_for_file(&manifest, poll)?;
        Ok(Self::open(root, layout)?)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.root.join(&self.layout.source_file)
    }

    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.root.join(&self.layout.report_file)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.layout.manifest_file)
    }

    /// Clear everything the previous artifact left behind.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Io` if the report or source cannot be touched.
    pub fn reset(&self) -> Result<(), WorkspaceError> {
        self.clear_report()?;
        self.write_source("")
    }

    /// Overwrite the source file with `clean_text`.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Io` on write failure.
    pub fn stage(&self, clean_text: &str) -> Result<(), WorkspaceError> {
        self.write_source(clean_text)
    }

    /// Remove the audit report if one exists.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Io` if an existing report cannot be removed.
    pub fn clear_report(&self) -> Result<(), WorkspaceError> {
        let path = self.report_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Removed previous audit report");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, &e)),
        }
    }

    fn write_source(&self, text: &str) -> Result<(), WorkspaceError> {
        let path = self.source_path();
        fs::write(&path, text).map_err(|e| io_error(&path, &e))
    }
}

fn wait_for_file(path: &Path, poll: ScaffoldPoll) -> Result<(), WorkspaceError> {
    let started = Instant::now();
    loop {
        if path.is_file() {
            debug!(path = %path.display(), waited_ms = started.elapsed().as_millis(), "Manifest present");
            return Ok(());
        }
        let waited = started.elapsed();
        if waited >= poll.deadline {
            return Err(WorkspaceError::ScaffoldTimeout {
                path: path.display().to_string(),
                waited_ms: waited.as_millis(),
            });
        }
        thread::sleep(poll.interval.min(poll.deadline - waited));
    }
}

fn io_error(path: &Path, e: &std::io::Error) -> WorkspaceError {
    WorkspaceError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeRunner, FakeStep};
    use tempfile::TempDir;

    fn quick_poll() -> ScaffoldPoll {
        ScaffoldPoll {
            interval: Duration::from_millis(5),
            deadline: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_open_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = Workspace::open(dir.path().join("absent"), WorkspaceLayout::default()).unwrap_err();
        assert!(matches!(err, WorkspaceError::Missing { .. }));
    }

    #[test]
    fn test_layout_paths() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::open(dir.path(), WorkspaceLayout::default()).unwrap();
        assert_eq!(ws.source_path(), dir.path().join("lib.rs"));
        assert_eq!(ws.report_path(), dir.path().join("report.json"));
        assert_eq!(ws.manifest_path(), dir.path().join("Cargo.toml"));
    }

    #[test]
    fn test_stage_overwrites_source() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::open(dir.path(), WorkspaceLayout::default()).unwrap();
        ws.stage("mod first {}\nmod extra {}\n").unwrap();
        ws.stage("mod second {}").unwrap();
        assert_eq!(fs::read_to_string(ws.source_path()).unwrap(), "mod second {}");
    }

    #[test]
    fn test_reset_clears_report_and_source() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::open(dir.path(), WorkspaceLayout::default()).unwrap();
        ws.stage("mod previous {}").unwrap();
        fs::write(ws.report_path(), "{}").unwrap();

        ws.reset().unwrap();
        assert!(!ws.report_path().exists());
        assert_eq!(fs::read_to_string(ws.source_path()).unwrap(), "");
    }

    #[test]
    fn test_clear_report_when_absent() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::open(dir.path(), WorkspaceLayout::default()).unwrap();
        assert!(ws.clear_report().is_ok());
    }

    #[test]
    fn test_scaffold_skipped_when_manifest_exists() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Test-Cargo");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("Cargo.toml"), "[package]").unwrap();
        let runner = FakeRunner::new();

        let ws = Workspace::scaffold(
            &root,
            WorkspaceLayout::default(),
            &runner,
            &Toolchain::default(),
            quick_poll(),
        )
        .unwrap();
        assert_eq!(ws.root(), root.as_path());
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn test_scaffold_runs_in_parent_with_dir_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Test-Cargo");
        let runner = FakeRunner::new().on_scaffold(
            FakeStep::exit(0, "Created contract Test-Cargo", "")
                .writes("Test-Cargo/Cargo.toml", "[package]\nname = \"test-cargo\"\n"),
        );

        let ws = Workspace::scaffold(
            &root,
            WorkspaceLayout::default(),
            &runner,
            &Toolchain::default(),
            quick_poll(),
        )
        .unwrap();
        assert!(ws.manifest_path().is_file());

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].command, "cargo contract new Test-Cargo");
        assert_eq!(invocations[0].cwd.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_scaffold_failure_carries_output() {
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::new().on_scaffold(FakeStep::exit(1, "", "error: no such command: `contract`"));

        let err = Workspace::scaffold(
            dir.path().join("Test-Cargo"),
            WorkspaceLayout::default(),
            &runner,
            &Toolchain::default(),
            quick_poll(),
        )
        .unwrap_err();
        match err {
            InkcheckError::Workspace(WorkspaceError::ScaffoldFailed { exit_code, output, .. }) => {
                assert_eq!(exit_code, Some(1));
                assert!(output.contains("no such command"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_scaffold_poll_deadline() {
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::new().on_scaffold(FakeStep::exit(0, "", ""));

        let err = Workspace::scaffold(
            dir.path().join("Test-Cargo"),
            WorkspaceLayout::default(),
            &runner,
            &Toolchain::default(),
            quick_poll(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            InkcheckError::Workspace(WorkspaceError::ScaffoldTimeout { .. })
        ));
    }

    #[test]
    fn test_scaffold_spawn_failure_is_runner_error() {
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::new().on_scaffold(FakeStep::spawn_failure());

        let err = Workspace::scaffold(
            dir.path().join("Test-Cargo"),
            WorkspaceLayout::default(),
            &runner,
            &Toolchain::default(),
            quick_poll(),
        )
        .unwrap_err();
        assert!(matches!(err, InkcheckError::Runner(RunnerError::Spawn { .. })));
    }
}
