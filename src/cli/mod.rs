//! Command-line interface
//!
//! - `args`: clap definitions
//! - `run`: entry point, config discovery, error reporting
//! - `commands`: one function per subcommand

pub mod args;
mod commands;
mod run;

pub use args::{Cli, Commands};
pub use run::run;
