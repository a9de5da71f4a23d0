use std::path::{Component, Path};

use inkcheck_utils::error::ConfigError;

use crate::model::Config;

const MAX_TIMEOUT_SECS: u64 = 7200;

fn invalid(key: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    }
}

fn check_argv(key: &str, argv: &[String]) -> Result<(), ConfigError> {
    match argv.first() {
        None => Err(invalid(key, "command must not be empty")),
        Some(program) if program.trim().is_empty() => {
            Err(invalid(key, "program name must not be blank"))
        }
        Some(_) => Ok(()),
    }
}

fn check_timeout(key: &str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(invalid(key, "must be at least 1 second"));
    }
    if secs > MAX_TIMEOUT_SECS {
        return Err(invalid(
            key,
            format!("exceeds maximum limit of {MAX_TIMEOUT_SECS} seconds (2 hours)"),
        ));
    }
    Ok(())
}

/// Workspace-relative file names: non-empty, relative, no `..`.
fn check_relative_file(key: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(invalid(key, "must not be empty"));
    }
    let path = Path::new(name);
    if path.is_absolute() || path.has_root() {
        return Err(invalid(key, format!("'{name}' must be relative to the workspace")));
    }
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(invalid(key, format!("'{name}' must not contain '..'")));
    }
    Ok(())
}

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_argv("toolchain.build", &self.toolchain.build)?;
        check_argv("toolchain.audit", &self.toolchain.audit)?;
        check_argv("toolchain.scaffold", &self.toolchain.scaffold)?;
        check_timeout("toolchain.timeout_secs", self.toolchain.timeout_secs)?;
        check_timeout("llm.timeout_secs", self.llm.timeout_secs)?;

        check_relative_file("workspace.source_file", &self.workspace.source_file)?;
        check_relative_file("workspace.report_file", &self.workspace.report_file)?;
        check_relative_file("workspace.manifest_file", &self.workspace.manifest_file)?;

        if self.workspace.dir.as_os_str().is_empty() {
            return Err(invalid("workspace.dir", "must not be empty"));
        }
        if self.workspace.scaffold_poll_ms == 0 {
            return Err(invalid("workspace.scaffold_poll_ms", "must be greater than 0"));
        }
        check_timeout(
            "workspace.scaffold_deadline_secs",
            self.workspace.scaffold_deadline_secs,
        )?;

        if self.generation.max_categories == 0 {
            return Err(invalid("generation.max_categories", "must be at least 1"));
        }
        if self.generation.contracts_per_category == 0 {
            return Err(invalid("generation.contracts_per_category", "must be at least 1"));
        }
        if self.generation.category_placeholder.is_empty() {
            return Err(invalid("generation.category_placeholder", "must not be empty"));
        }
        if self.generation.language_tag.contains(char::is_whitespace) {
            return Err(invalid("generation.language_tag", "must not contain whitespace"));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid(
                "llm.temperature",
                format!("{} is outside 0.0..=2.0", self.llm.temperature),
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens", "must be greater than 0"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(invalid("llm.model", "must not be empty"));
        }
        if self.llm.api_key_env.trim().is_empty() {
            return Err(invalid("llm.api_key_env", "must not be empty"));
        }
        if !self.llm.base_url.starts_with("http://") && !self.llm.base_url.starts_with("https://")
        {
            return Err(invalid("llm.base_url", "must start with http:// or https://"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CliArgs, GenerationConfig, LlmConfig, OutputConfig, ToolchainConfig, WorkspaceConfig};
    use std::collections::HashMap;

    fn base() -> Config {
        Config {
            workspace: WorkspaceConfig::default(),
            toolchain: ToolchainConfig::default(),
            output: OutputConfig::default(),
            generation: GenerationConfig::default(),
            llm: LlmConfig::default(),
            config_path: None,
            source_attribution: HashMap::new(),
        }
    }

    fn key_of(err: ConfigError) -> String {
        match err {
            ConfigError::InvalidValue { key, .. } => key,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_empty_argv_rejected() {
        let mut config = base();
        config.toolchain.audit.clear();
        assert_eq!(key_of(config.validate().unwrap_err()), "toolchain.audit");
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = base();
        config.toolchain.timeout_secs = 0;
        assert_eq!(key_of(config.validate().unwrap_err()), "toolchain.timeout_secs");

        config.toolchain.timeout_secs = 7201;
        assert_eq!(key_of(config.validate().unwrap_err()), "toolchain.timeout_secs");

        config.toolchain.timeout_secs = 7200;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_report_file_must_stay_inside_workspace() {
        let mut config = base();
        config.workspace.report_file = "../report.json".to_string();
        assert_eq!(key_of(config.validate().unwrap_err()), "workspace.report_file");

        config.workspace.report_file = "/tmp/report.json".to_string();
        assert_eq!(key_of(config.validate().unwrap_err()), "workspace.report_file");

        config.workspace.report_file = "target/report.json".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_counts_must_be_positive() {
        let mut config = base();
        config.generation.contracts_per_category = 0;
        assert_eq!(
            key_of(config.validate().unwrap_err()),
            "generation.contracts_per_category"
        );

        let mut config = base();
        config.generation.max_categories = 0;
        assert_eq!(key_of(config.validate().unwrap_err()), "generation.max_categories");
    }

    #[test]
    fn test_temperature_range() {
        let mut config = base();
        config.llm.temperature = 2.5;
        assert_eq!(key_of(config.validate().unwrap_err()), "llm.temperature");

        config.llm.temperature = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_timeout_is_validated() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let cli = CliArgs {
            timeout_secs: Some(0),
            ..CliArgs::default()
        };
        let err = Config::discover_from(temp.path(), &cli).unwrap_err();
        assert_eq!(key_of(err), "toolchain.timeout_secs");
    }
}
