//! inkcheck: generate, build, audit and classify ink! smart contracts
//!
//! The binary is a thin wrapper over [`cli::run`]. The pipeline itself lives
//! in [`engine`]; configuration, the LLM client and process execution each
//! have their own crate, re-exported here.

pub mod cli;

pub use inkcheck_config as config;
pub use inkcheck_engine as engine;
pub use inkcheck_llm as llm;
pub use inkcheck_runner as runner;

pub use inkcheck_config::{CliArgs, Config};
pub use inkcheck_utils::error::{InkcheckError, UserFriendlyError};
pub use inkcheck_utils::exit_codes::ExitCode;
