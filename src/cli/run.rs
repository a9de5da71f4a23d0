//! CLI entry point and dispatch
//!
//! `run()` parses arguments, loads `.env`, initialises logging, discovers
//! configuration and dispatches. It prints every error itself and hands
//! main.rs only the exit code.

use clap::Parser;
use tracing::{debug, warn};

use inkcheck_llm::redact;
use inkcheck_utils::logging::init_tracing;

use super::args::Cli;
use super::commands;
use crate::{Config, ExitCode, InkcheckError};

/// Main CLI execution function.
///
/// Returns `Err(ExitCode)` after printing the error; main.rs only exits.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    // Loaded before logging so that RUST_LOG may come from .env
    let dotenv = dotenvy::dotenv();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("warning: logging already initialised: {e}");
    }
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let config = match Config::discover(&cli.cli_args()) {
        Ok(config) => config,
        Err(e) => return Err(report_error(&InkcheckError::from(e))),
    };
    if let Some(path) = &config.config_path {
        debug!(path = %path.display(), "Using configuration file");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    debug!(command = cli.command.name(), "Dispatching");
    rt.block_on(commands::execute(cli.command, &config))
        .map_err(|e| report_error(&e))
}

fn report_error(error: &InkcheckError) -> ExitCode {
    eprintln!("{}", redact(&error.display_for_user()));
    error.to_exit_code()
}
