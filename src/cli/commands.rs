//! Command implementations

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use inkcheck_engine::generate::{load_categories, load_prompt_template};
use inkcheck_engine::{
    GenerationPlan, GenerationReport, LlmSourceProvider, Orchestrator, OutcomeStore, RunReceipt,
    RunReport, ScaffoldPoll, Toolchain, Unwrapper, Workspace, WorkspaceLayout, generate_batch,
    load_artifacts, write_receipt,
};
use inkcheck_runner::NativeRunner;
use inkcheck_utils::canonicalization::emit_jcs;
use tracing::{info, warn};

use super::args::Commands;
use crate::{Config, InkcheckError};

pub(crate) async fn execute(command: Commands, config: &Config) -> Result<(), InkcheckError> {
    match command {
        Commands::Init => execute_init_command(config),
        Commands::Generate => execute_generate_command(config).await.map(|_| ()),
        Commands::Test { dir, json } => {
            let dir = dir.unwrap_or_else(|| config.output.generated_dir());
            execute_test_command(config, &dir, json).map(|_| ())
        }
        Commands::Run { json } => {
            execute_generate_command(config).await?;
            execute_test_command(config, &config.output.generated_dir(), json).map(|_| ())
        }
        Commands::Config => {
            execute_config_command(config);
            Ok(())
        }
    }
}

fn unwrapper(config: &Config) -> Unwrapper {
    Unwrapper::new(&config.generation.language_tag)
}

/// Scaffold the workspace project unless it already exists.
pub(crate) fn execute_init_command(config: &Config) -> Result<(), InkcheckError> {
    let toolchain = Toolchain::from_config(&config.toolchain)?;
    toolchain.preflight()?;

    let workspace = Workspace::scaffold(
        &config.workspace.dir,
        WorkspaceLayout::from_config(&config.workspace),
        &NativeRunner::new(),
        &toolchain,
        ScaffoldPoll::from_config(&config.workspace),
    )?;
    println!("Workspace ready at {}", workspace.root().display());
    Ok(())
}

/// Generate contracts for every configured category.
pub(crate) async fn execute_generate_command(
    config: &Config,
) -> Result<GenerationReport, InkcheckError> {
    let generation = &config.generation;
    let categories = load_categories(&generation.categories_file, generation.max_categories)?;
    if categories.is_empty() {
        warn!(
            path = %generation.categories_file.display(),
            "No categories found; nothing to generate"
        );
    }
    let template = load_prompt_template(&generation.prompt_file, &generation.category_placeholder)?;
    let plan = GenerationPlan::new(&categories, &template, generation.contracts_per_category)?;

    let provider = LlmSourceProvider::from_config(&config.llm)?;
    let generated_dir = config.output.generated_dir();
    let report = generate_batch(&provider, &plan, &unwrapper(config), &generated_dir).await?;

    println!(
        "Generated {} contract(s) in {}",
        report.written.len(),
        generated_dir.display()
    );
    for failed in &report.failed {
        println!("  skipped {}: {}", failed.name, failed.error);
    }
    Ok(report)
}

/// Build, audit and classify every contract in `dir`.
pub(crate) fn execute_test_command(
    config: &Config,
    dir: &Path,
    json: bool,
) -> Result<RunReport, InkcheckError> {
    if !dir.is_dir() {
        return Err(InkcheckError::Io(io::Error::new(
            ErrorKind::NotFound,
            format!("contracts directory {} does not exist", dir.display()),
        )));
    }

    let toolchain = Toolchain::from_config(&config.toolchain)?;
    toolchain.preflight()?;
    let workspace = Workspace::open(
        &config.workspace.dir,
        WorkspaceLayout::from_config(&config.workspace),
    )?;

    let artifacts = load_artifacts(dir)?;
    if artifacts.is_empty() {
        warn!(dir = %dir.display(), "No contracts to test");
    }

    let orchestrator = Orchestrator::new(
        NativeRunner::new(),
        toolchain,
        workspace,
        OutcomeStore::new(&config.output.root),
    )
    .with_unwrapper(unwrapper(config));
    let report = orchestrator.run(&artifacts)?;

    let receipt = RunReceipt::new(&report, orchestrator.workspace(), orchestrator.toolchain());
    let receipt_path = write_receipt(&config.output.root, &receipt)?;
    info!(path = %receipt_path.display(), "Wrote run receipt");

    if json {
        let summary = emit_jcs(&report.summary)
            .map_err(|e| InkcheckError::Io(io::Error::other(format!("{e:#}"))))?;
        println!("{summary}");
    } else {
        print!("{}", report.summary);
        println!("Results in {}", config.output.root.display());
        println!("Receipt: {}", receipt_path.display());
    }
    Ok(report)
}

/// Print every effective setting with its source.
pub(crate) fn execute_config_command(config: &Config) {
    match &config.config_path {
        Some(path) => println!("# config file: {}", display_path(path)),
        None => println!("# config file: none (built-in defaults)"),
    }
    for (key, (value, source)) in config.effective_config() {
        println!("{key} = {value}  [{source}]");
    }
}

fn display_path(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| PathBuf::from(path))
        .display()
        .to_string()
}
