use std::collections::HashMap;
use std::path::{Path, PathBuf};

use inkcheck_utils::error::ConfigError;
use inkcheck_utils::types::ConfigSource;

use crate::model::{
    CliArgs, Config, GenerationConfig, LlmConfig, OutputConfig, TomlConfig, ToolchainConfig,
    WorkspaceConfig,
};

/// Directory that holds `config.toml`.
pub const CONFIG_DIR: &str = ".inkcheck";
pub const CONFIG_FILE: &str = "config.toml";

/// Overwrite `target` with `value` when present and record where it came from.
fn apply<T>(
    target: &mut T,
    value: Option<T>,
    key: &str,
    source: ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    if let Some(value) = value {
        *target = value;
        attribution.insert(key.to_string(), source);
    }
}

const ALL_KEYS: &[&str] = &[
    "workspace.dir",
    "workspace.source_file",
    "workspace.report_file",
    "workspace.manifest_file",
    "workspace.scaffold_poll_ms",
    "workspace.scaffold_deadline_secs",
    "toolchain.build",
    "toolchain.audit",
    "toolchain.scaffold",
    "toolchain.timeout_secs",
    "output.root",
    "output.generated_dir",
    "generation.categories_file",
    "generation.prompt_file",
    "generation.max_categories",
    "generation.contracts_per_category",
    "generation.category_placeholder",
    "generation.language_tag",
    "llm.provider",
    "llm.model",
    "llm.base_url",
    "llm.api_key_env",
    "llm.temperature",
    "llm.max_tokens",
    "llm.timeout_secs",
];

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Searches upward from the current directory when no explicit path is
    /// given in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let start_dir = std::env::current_dir().map_err(|e| {
            ConfigError::InvalidFile(format!("cannot determine current directory: {e}"))
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Path-driven variant of [`discover`](Self::discover), used by tests to
    /// avoid process-global state.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let mut attribution: HashMap<String, ConfigSource> = ALL_KEYS
            .iter()
            .map(|key| ((*key).to_string(), ConfigSource::Default))
            .collect();

        let mut workspace = WorkspaceConfig::default();
        let mut toolchain = ToolchainConfig::default();
        let mut output = OutputConfig::default();
        let mut generation = GenerationConfig::default();
        let mut llm = LlmConfig::default();

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    });
                }
                Some(explicit.clone())
            }
            None => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            tracing::debug!(path = %path.display(), "Loading config file");
            let file = Self::load_config_file(path)?;
            let src = ConfigSource::Config;
            let attr = &mut attribution;

            if let Some(w) = file.workspace {
                apply(&mut workspace.dir, w.dir, "workspace.dir", src, attr);
                apply(&mut workspace.source_file, w.source_file, "workspace.source_file", src, attr);
                apply(&mut workspace.report_file, w.report_file, "workspace.report_file", src, attr);
                apply(&mut workspace.manifest_file, w.manifest_file, "workspace.manifest_file", src, attr);
                apply(&mut workspace.scaffold_poll_ms, w.scaffold_poll_ms, "workspace.scaffold_poll_ms", src, attr);
                apply(
                    &mut workspace.scaffold_deadline_secs,
                    w.scaffold_deadline_secs,
                    "workspace.scaffold_deadline_secs",
                    src,
                    attr,
                );
            }

            if let Some(t) = file.toolchain {
                apply(&mut toolchain.build, t.build, "toolchain.build", src, attr);
                apply(&mut toolchain.audit, t.audit, "toolchain.audit", src, attr);
                apply(&mut toolchain.scaffold, t.scaffold, "toolchain.scaffold", src, attr);
                apply(&mut toolchain.timeout_secs, t.timeout_secs, "toolchain.timeout_secs", src, attr);
            }

            if let Some(o) = file.output {
                apply(&mut output.root, o.root, "output.root", src, attr);
                apply(
                    &mut output.generated_dir,
                    o.generated_dir.map(Some),
                    "output.generated_dir",
                    src,
                    attr,
                );
            }

            if let Some(g) = file.generation {
                apply(&mut generation.categories_file, g.categories_file, "generation.categories_file", src, attr);
                apply(&mut generation.prompt_file, g.prompt_file, "generation.prompt_file", src, attr);
                apply(&mut generation.max_categories, g.max_categories, "generation.max_categories", src, attr);
                apply(
                    &mut generation.contracts_per_category,
                    g.contracts_per_category,
                    "generation.contracts_per_category",
                    src,
                    attr,
                );
                apply(
                    &mut generation.category_placeholder,
                    g.category_placeholder,
                    "generation.category_placeholder",
                    src,
                    attr,
                );
                apply(&mut generation.language_tag, g.language_tag, "generation.language_tag", src, attr);
            }

            if let Some(l) = file.llm {
                apply(&mut llm.provider, l.provider, "llm.provider", src, attr);
                apply(&mut llm.model, l.model, "llm.model", src, attr);
                apply(&mut llm.base_url, l.base_url, "llm.base_url", src, attr);
                apply(&mut llm.api_key_env, l.api_key_env, "llm.api_key_env", src, attr);
                apply(&mut llm.temperature, l.temperature, "llm.temperature", src, attr);
                apply(&mut llm.max_tokens, l.max_tokens, "llm.max_tokens", src, attr);
                apply(&mut llm.timeout_secs, l.timeout_secs, "llm.timeout_secs", src, attr);
            }
        }

        // CLI overrides (highest priority)
        let cli = ConfigSource::Cli;
        let attr = &mut attribution;
        apply(&mut workspace.dir, cli_args.workspace_dir.clone(), "workspace.dir", cli, attr);
        apply(&mut output.root, cli_args.output_root.clone(), "output.root", cli, attr);
        apply(&mut toolchain.timeout_secs, cli_args.timeout_secs, "toolchain.timeout_secs", cli, attr);
        apply(&mut llm.model, cli_args.model.clone(), "llm.model", cli, attr);

        let config = Self {
            workspace,
            toolchain,
            output,
            generation,
            llm,
            config_path,
            source_attribution: attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Walk up from `start_dir` looking for `.inkcheck/config.toml`.
    ///
    /// Stops at repository root markers (`.git`, `.hg`, `.svn`) or the
    /// filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current = Some(start_dir);

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists()
            {
                break;
            }

            current = dir.parent();
        }

        None
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidFile(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::InvalidFile(format!("{}: {e}", path.display())))
    }
}
