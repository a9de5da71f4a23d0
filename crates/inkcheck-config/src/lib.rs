//! Configuration management for inkcheck
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. The file is `.inkcheck/config.toml`, found by
//! walking upward from the working directory, with `[workspace]`,
//! `[toolchain]`, `[output]`, `[generation]` and `[llm]` sections.

mod discovery;
mod model;
mod sources;
mod validation;

pub use discovery::{CONFIG_DIR, CONFIG_FILE};
pub use inkcheck_utils::types::ConfigSource;
pub use model::{
    CliArgs, Config, GenerationConfig, LlmConfig, OutputConfig, ToolchainConfig, WorkspaceConfig,
};
