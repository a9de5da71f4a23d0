//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::CliArgs;

/// inkcheck - generate, build, audit and classify ink! smart contracts
#[derive(Parser, Debug)]
#[command(name = "inkcheck")]
#[command(about = "Generate ink! smart contracts with an LLM, then build, audit and classify them")]
#[command(long_about = r#"
inkcheck asks a language model for ink! smart contracts, one or more per
category, then compiles each one with `cargo contract build`, audits the
successful builds with `cargo scout-audit`, and sorts every contract into an
outcome bucket under the output directory.

EXAMPLES:
  # Create the shared contract project once
  inkcheck init

  # Generate contracts from config/categories.txt and config/prompt.txt
  inkcheck generate

  # Build, audit and classify everything in contracts/generated
  inkcheck test

  # Both, with a different model and a longer build timeout
  inkcheck run --model gpt-4o --timeout 1200

OUTCOME BUCKETS (under the output root):
  failed_build            the contract did not compile
  failed_audit            the auditor exited with an error
  unreadable_report       the auditor left no usable report
  found_vulnerabilities   the report lists findings
  passed                  the report is empty
  timed_out               a step exceeded the timeout

CONFIGURATION:
  Precedence: CLI flags > .inkcheck/config.toml > defaults.
  The config file is found by searching upward from the current directory.
  The API key is read from the variable named by [llm] api_key_env
  (OPENAI_API_KEY by default); a .env file is loaded first if present.
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Contract project directory every artifact is staged into
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Output root for outcome buckets and run receipts
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// Timeout in seconds for each build and audit step
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Model used for generation
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Scaffold the shared contract project
    Init,

    /// Generate contracts for every category
    Generate,

    /// Build, audit and classify generated contracts
    Test {
        /// Directory of `.rs` contracts (default: the generated directory)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Print the run summary as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate, then test
    Run {
        /// Print the run summary as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration and where each value came from
    Config,
}

impl Commands {
    /// Short name used in log lines.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Generate => "generate",
            Self::Test { .. } => "test",
            Self::Run { .. } => "run",
            Self::Config => "config",
        }
    }
}

impl Cli {
    /// Overrides handed to configuration discovery.
    #[must_use]
    pub fn cli_args(&self) -> CliArgs {
        CliArgs {
            config_path: self.config.clone(),
            workspace_dir: self.workspace.clone(),
            output_root: self.output.clone(),
            timeout_secs: self.timeout,
            model: self.model.clone(),
        }
    }
}
