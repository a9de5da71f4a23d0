use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use inkcheck_utils::types::ConfigSource;

/// Fully resolved configuration.
///
/// Every field holds a concrete value after discovery; `source_attribution`
/// records which layer supplied it (keys are `section.field`).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub toolchain: ToolchainConfig,
    pub output: OutputConfig,
    pub generation: GenerationConfig,
    pub llm: LlmConfig,
    /// Config file that was loaded, if any
    pub config_path: Option<PathBuf>,
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[workspace]`: the reusable contract project every artifact is staged into.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    pub dir: PathBuf,
    /// Contract source file, relative to `dir`
    pub source_file: String,
    /// Audit report file, relative to `dir`
    pub report_file: String,
    /// File whose appearance marks a finished scaffold, relative to `dir`
    pub manifest_file: String,
    pub scaffold_poll_ms: u64,
    pub scaffold_deadline_secs: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("Test-Cargo"),
            source_file: "lib.rs".to_string(),
            report_file: "report.json".to_string(),
            manifest_file: "Cargo.toml".to_string(),
            scaffold_poll_ms: 100,
            scaffold_deadline_secs: 10,
        }
    }
}

impl WorkspaceConfig {
    #[must_use]
    pub const fn scaffold_poll_interval(&self) -> Duration {
        Duration::from_millis(self.scaffold_poll_ms)
    }

    #[must_use]
    pub const fn scaffold_deadline(&self) -> Duration {
        Duration::from_secs(self.scaffold_deadline_secs)
    }
}

/// `[toolchain]`: argv arrays for the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolchainConfig {
    pub build: Vec<String>,
    pub audit: Vec<String>,
    /// Scaffold command; the workspace directory name is appended as the last argument
    pub scaffold: Vec<String>,
    /// Per-invocation timeout for build and audit
    pub timeout_secs: u64,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            build: vec!["cargo".into(), "contract".into(), "build".into()],
            audit: vec![
                "cargo".into(),
                "scout-audit".into(),
                "--output-format".into(),
                "json".into(),
            ],
            scaffold: vec!["cargo".into(), "contract".into(), "new".into()],
            timeout_secs: 600,
        }
    }
}

impl ToolchainConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[output]`: where outcome buckets and generated sources live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputConfig {
    pub root: PathBuf,
    /// Defaults to `<root>/generated` when unset
    pub generated_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("contracts"),
            generated_dir: None,
        }
    }
}

impl OutputConfig {
    #[must_use]
    pub fn generated_dir(&self) -> PathBuf {
        self.generated_dir
            .clone()
            .unwrap_or_else(|| self.root.join("generated"))
    }
}

/// `[generation]`: category list and prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenerationConfig {
    pub categories_file: PathBuf,
    pub prompt_file: PathBuf,
    pub max_categories: usize,
    pub contracts_per_category: usize,
    pub category_placeholder: String,
    /// Language tag expected on the opening code fence of model responses
    pub language_tag: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            categories_file: PathBuf::from("config/categories.txt"),
            prompt_file: PathBuf::from("config/prompt.txt"),
            max_categories: 50,
            contracts_per_category: 1,
            category_placeholder: "{type}".to_string(),
            language_tag: "rust".to_string(),
        }
    }
}

/// `[llm]`: OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4-1106-preview".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.6,
            max_tokens: 4000,
            timeout_secs: 300,
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Partial sections as they appear in `config.toml`; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub workspace: Option<TomlWorkspace>,
    pub toolchain: Option<TomlToolchain>,
    pub output: Option<TomlOutput>,
    pub generation: Option<TomlGeneration>,
    pub llm: Option<TomlLlm>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlWorkspace {
    pub dir: Option<PathBuf>,
    pub source_file: Option<String>,
    pub report_file: Option<String>,
    pub manifest_file: Option<String>,
    pub scaffold_poll_ms: Option<u64>,
    pub scaffold_deadline_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlToolchain {
    pub build: Option<Vec<String>>,
    pub audit: Option<Vec<String>>,
    pub scaffold: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlOutput {
    pub root: Option<PathBuf>,
    pub generated_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlGeneration {
    pub categories_file: Option<PathBuf>,
    pub prompt_file: Option<PathBuf>,
    pub max_categories: Option<usize>,
    pub contracts_per_category: Option<usize>,
    pub category_placeholder: Option<String>,
    pub language_tag: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlLlm {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

/// Overrides collected from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub workspace_dir: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub model: Option<String>,
}
