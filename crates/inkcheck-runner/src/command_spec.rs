use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

// ============================================================================
// CommandSpec - argv-style command description
// ============================================================================

/// Specification for a command to execute.
///
/// Arguments are stored as `Vec<OsString>` and never joined into a shell
/// string, so a contract name containing `;` or `$(...)` cannot change what
/// gets executed.
///
/// # Example
///
/// ```rust
/// use inkcheck_runner::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("cargo")
///     .args(["contract", "build"])
///     .cwd("/tmp/Test-Cargo");
///
/// assert_eq!(cmd.program, OsString::from("cargo"));
/// assert_eq!(cmd.args.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements (NOT shell strings)
    pub args: Vec<OsString>,
    /// Working directory; `None` inherits the caller's
    pub cwd: Option<PathBuf>,
    /// Optional environment overrides
    pub env: Option<HashMap<OsString, OsString>>,
}

impl CommandSpec {
    /// Create a new `CommandSpec` with the given program.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: None,
        }
    }

    /// Build a spec from a configured argv array (`["cargo", "contract", "build"]`).
    ///
    /// Returns `None` for an empty array.
    #[must_use]
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Option<Self> {
        let (program, rest) = argv.split_first()?;
        Some(Self::new(program.as_ref()).args(rest.iter().map(AsRef::as_ref)))
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments to the command.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the command.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an environment variable for the command.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Human-readable rendering for logs and error messages.
    ///
    /// This is never executed; it only exists so log lines show what ran.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Convert this `CommandSpec` into a `std::process::Command`.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if let Some(ref env) = self.env {
            for (key, value) in env {
                cmd.env(key, value);
            }
        }

        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_command_spec_new() {
        let cmd = CommandSpec::new("cargo");
        assert_eq!(cmd.program, OsString::from("cargo"));
        assert!(cmd.args.is_empty());
        assert!(cmd.cwd.is_none());
        assert!(cmd.env.is_none());
    }

    #[test]
    fn test_command_spec_from_argv() {
        let cmd = CommandSpec::from_argv(&["cargo", "scout-audit", "--output-format", "json"])
            .unwrap();
        assert_eq!(cmd.program, OsString::from("cargo"));
        assert_eq!(
            cmd.args,
            vec![
                OsString::from("scout-audit"),
                OsString::from("--output-format"),
                OsString::from("json"),
            ]
        );
    }

    #[test]
    fn test_command_spec_from_empty_argv() {
        let empty: [&str; 0] = [];
        assert!(CommandSpec::from_argv(&empty).is_none());
    }

    #[test]
    fn test_command_spec_builder_chain() {
        let cmd = CommandSpec::new("cargo")
            .arg("contract")
            .args(["build", "--release"])
            .cwd("/workspace")
            .env("CARGO_TERM_COLOR", "never");

        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/workspace")));
        assert_eq!(
            cmd.env.as_ref().unwrap().get(&OsString::from("CARGO_TERM_COLOR")),
            Some(&OsString::from("never"))
        );
    }

    #[test]
    fn test_command_spec_display() {
        let cmd = CommandSpec::new("cargo").args(["contract", "build"]);
        assert_eq!(cmd.display(), "cargo contract build");
    }

    #[test]
    fn test_command_spec_shell_metacharacters_preserved() {
        let cmd = CommandSpec::new("cargo")
            .arg("$(whoami)")
            .arg("a;b")
            .arg("x|y");

        assert_eq!(cmd.args[0], OsString::from("$(whoami)"));
        assert_eq!(cmd.args[1], OsString::from("a;b"));
        assert_eq!(cmd.args[2], OsString::from("x|y"));
    }
}
