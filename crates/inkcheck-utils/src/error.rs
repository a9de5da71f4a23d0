use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use crate::artifact_name::ArtifactNameError;
pub use inkcheck_runner::RunnerError;

/// Library-level error type with user-facing reporting.
///
/// Only conditions that stop a whole command end up here. An artifact that
/// fails to build or audit is a classified outcome, not an error.
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration, CLI arguments, bad artifact names |
/// | 69 | Toolchain binary missing or scaffold failure |
/// | 70 | LLM provider failure |
/// | 74 | Filesystem failures (workspace, persisted outputs) |
/// | 1 | Other errors |
///
/// Library code returns `InkcheckError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum InkcheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Toolchain error: {0}")]
    Runner(#[from] RunnerError),

    #[error("LLM backend error: {0}")]
    Llm(#[from] LlmError),

    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("Failed to persist {path}: {reason}")]
    Persist { path: String, reason: String },

    #[error("Artifact name error: {0}")]
    ArtifactName(#[from] ArtifactNameError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Toolchain,
    LlmProvider,
    FileSystem,
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Toolchain => write!(f, "Toolchain"),
            Self::LlmProvider => write!(f, "LLM Provider"),
            Self::FileSystem => write!(f, "File System"),
            Self::Validation => write!(f, "Validation"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => format!("The configuration file is invalid: {reason}"),
            Self::MissingRequired(key) => format!("Required setting '{key}' is missing"),
            Self::InvalidValue { key, value } => {
                format!("Setting '{key}' has an invalid value: {value}")
            }
            Self::NotFound { path } => format!("No configuration file at {path}"),
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Configuration is read from CLI flags, then .inkcheck/config.toml, then built-in defaults."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of .inkcheck/config.toml".to_string(),
                "Remove the file to fall back to built-in defaults".to_string(),
            ],
            Self::MissingRequired(key) => vec![format!("Set '{key}' in .inkcheck/config.toml")],
            Self::InvalidValue { key, .. } => {
                vec![format!("Correct '{key}' in the config file or on the command line")]
            }
            Self::NotFound { .. } => vec![
                "Check the path passed to --config".to_string(),
                "Omit --config to use discovery".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl UserFriendlyError for RunnerError {
    fn user_message(&self) -> String {
        match self {
            Self::Spawn { program, reason } => {
                format!("Could not launch '{program}': {reason}")
            }
            Self::Wait { program, reason } => {
                format!("Lost track of '{program}' while it was running: {reason}")
            }
            Self::Timeout { timeout_seconds } => {
                format!("Toolchain command timed out after {timeout_seconds} seconds")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Spawn { .. } => Some(
                "A toolchain binary that cannot be launched is an environment problem, so the batch stops instead of recording every contract as a failed build."
                    .to_string(),
            ),
            Self::Wait { .. } | Self::Timeout { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Spawn { program, .. } => vec![
                format!("Check that '{program}' is installed and on PATH"),
                "Install the ink! toolchain: cargo install cargo-contract".to_string(),
                "Install the auditor: cargo install cargo-scout-audit".to_string(),
            ],
            Self::Wait { .. } => vec!["Re-run the command; the process may have been killed externally".to_string()],
            Self::Timeout { .. } => vec![
                "Increase [toolchain] timeout_secs or pass --timeout".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Toolchain
    }
}

/// Failures preparing the shared build workspace
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Workspace directory {path} does not exist")]
    Missing { path: String },

    #[error("Scaffold command '{command}' failed with exit code {exit_code:?}")]
    ScaffoldFailed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    #[error("Timed out after {waited_ms} ms waiting for {path} to appear")]
    ScaffoldTimeout { path: String, waited_ms: u128 },

    #[error("Workspace file operation failed on {path}: {reason}")]
    Io { path: String, reason: String },
}

impl UserFriendlyError for WorkspaceError {
    fn user_message(&self) -> String {
        match self {
            Self::Missing { path } => format!("The build workspace {path} does not exist"),
            Self::ScaffoldFailed {
                command, output, ..
            } => format!("Creating the workspace with '{command}' failed:\n{output}"),
            Self::ScaffoldTimeout { path, waited_ms } => {
                format!("{path} did not appear within {waited_ms} ms of scaffolding")
            }
            Self::Io { path, reason } => format!("Could not update {path}: {reason}"),
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Every contract is staged into one reusable project directory before it is built and audited."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Missing { .. } => vec!["Run 'inkcheck init' to scaffold the workspace".to_string()],
            Self::ScaffoldFailed { .. } => vec![
                "Check that 'cargo contract --version' works".to_string(),
                "Remove a half-created workspace directory and retry".to_string(),
            ],
            Self::ScaffoldTimeout { .. } => vec![
                "Increase [workspace] scaffold_deadline_secs".to_string(),
            ],
            Self::Io { .. } => vec!["Check permissions on the workspace directory".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Missing { .. } | Self::Io { .. } => ErrorCategory::FileSystem,
            Self::ScaffoldFailed { .. } | Self::ScaffoldTimeout { .. } => ErrorCategory::Toolchain,
        }
    }
}

/// Errors that can occur during LLM backend operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Transport-level failure (HTTP connectivity, malformed response)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403, missing API key)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// Invocation timed out
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Configuration error
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unsupported feature or provider
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl LlmError {
    /// Transient errors are worth skipping past; the next request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::ProviderQuota(_) | Self::ProviderOutage(_) | Self::Timeout { .. }
        )
    }
}

impl UserFriendlyError for LlmError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("LLM transport error: {msg}"),
            Self::ProviderAuth(msg) => format!("LLM provider authentication failed: {msg}"),
            Self::ProviderQuota(msg) => format!("LLM provider quota exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("LLM provider service outage: {msg}"),
            Self::Timeout { duration } => format!("LLM invocation timed out after {duration:?}"),
            Self::Misconfiguration(msg) => format!("LLM configuration error: {msg}"),
            Self::Unsupported(msg) => format!("LLM feature not supported: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::ProviderAuth(_) => Some(
                "Authentication errors indicate missing or invalid API keys.".to_string(),
            ),
            Self::ProviderQuota(_) => Some(
                "Quota errors occur when rate limits or usage limits are exceeded.".to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Transport(_) | Self::ProviderOutage(_) => vec![
                "Check network connectivity to the provider".to_string(),
                "Retry later".to_string(),
            ],
            Self::ProviderAuth(_) => vec![
                "Set the API key variable named by [llm] api_key_env (default OPENAI_API_KEY)"
                    .to_string(),
                "A .env file in the working directory is loaded automatically".to_string(),
            ],
            Self::ProviderQuota(_) => vec!["Wait before retrying or lower the batch size".to_string()],
            Self::Timeout { .. } => vec!["Increase [llm] timeout_secs".to_string()],
            Self::Misconfiguration(_) => vec!["Check the [llm] section of the config file".to_string()],
            Self::Unsupported(_) => vec!["Use provider = \"openai\"".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Misconfiguration(_) | Self::Unsupported(_) => ErrorCategory::Configuration,
            _ => ErrorCategory::LlmProvider,
        }
    }
}

impl UserFriendlyError for InkcheckError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message(),
            Self::Runner(e) => e.user_message(),
            Self::Llm(e) => e.user_message(),
            Self::Workspace(e) => e.user_message(),
            Self::ArtifactName(e) => e.user_message(),
            Self::Persist { path, reason } => format!("Could not write {path}: {reason}"),
            Self::Io(e) => format!("File system error: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(e) => e.context(),
            Self::Runner(e) => e.context(),
            Self::Llm(e) => e.context(),
            Self::Workspace(e) => e.context(),
            Self::ArtifactName(e) => e.context(),
            Self::Persist { .. } => Some(
                "Outcomes that cannot be recorded durably abort the batch.".to_string(),
            ),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(e) => e.suggestions(),
            Self::Runner(e) => e.suggestions(),
            Self::Llm(e) => e.suggestions(),
            Self::Workspace(e) => e.suggestions(),
            Self::ArtifactName(e) => e.suggestions(),
            Self::Persist { .. } | Self::Io(_) => vec![
                "Check free disk space and permissions on the output directory".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(e) => e.category(),
            Self::Runner(e) => e.category(),
            Self::Llm(e) => e.category(),
            Self::Workspace(e) => e.category(),
            Self::ArtifactName(e) => e.category(),
            Self::Persist { .. } | Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl InkcheckError {
    /// Get a user-friendly error message with context and actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) | Self::ArtifactName(_) => ExitCode::CLI_ARGS,
            Self::Runner(RunnerError::Spawn { .. }) => ExitCode::TOOLCHAIN_UNAVAILABLE,
            Self::Runner(_) => ExitCode::INTERNAL,
            Self::Llm(LlmError::Misconfiguration(_) | LlmError::Unsupported(_)) => {
                ExitCode::CLI_ARGS
            }
            Self::Llm(_) => ExitCode::LLM_FAILURE,
            Self::Workspace(WorkspaceError::Missing { .. }) => ExitCode::CLI_ARGS,
            Self::Workspace(WorkspaceError::Io { .. }) => ExitCode::IO_FAILURE,
            Self::Workspace(_) => ExitCode::TOOLCHAIN_UNAVAILABLE,
            Self::Persist { .. } | Self::Io(_) => ExitCode::IO_FAILURE,
        }
    }
}
