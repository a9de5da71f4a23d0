//! Configuration flowing into the pipeline components

use std::fs;

use inkcheck::config::ConfigSource;
use inkcheck::engine::{ScaffoldPoll, Toolchain, Unwrapper, WorkspaceLayout};
use inkcheck::{CliArgs, Config};
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) {
    let config_dir = dir.path().join(".inkcheck");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), body).unwrap();
}

#[test]
fn file_settings_reach_toolchain_and_workspace() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    write_config(
        &dir,
        r#"
[workspace]
dir = "build/Scratch"
source_file = "src/lib.rs"
report_file = "scout.json"
scaffold_poll_ms = 250
scaffold_deadline_secs = 30

[toolchain]
build = ["cargo", "contract", "build", "--release"]
audit = ["cargo", "scout-audit", "--output-format", "json", "--output-path", "scout.json"]
timeout_secs = 900

[generation]
language_tag = "ink"
"#,
    );
    let nested = dir.path().join("a/b");
    fs::create_dir_all(&nested).unwrap();

    let config = Config::discover_from(&nested, &CliArgs::default()).unwrap();

    let toolchain = Toolchain::from_config(&config.toolchain).unwrap();
    assert_eq!(toolchain.build_command().display(), "cargo contract build --release");
    assert_eq!(toolchain.timeout(), Duration::from_secs(900));

    let layout = WorkspaceLayout::from_config(&config.workspace);
    assert_eq!(layout.source_file, "src/lib.rs");
    assert_eq!(layout.report_file, "scout.json");
    assert_eq!(layout.manifest_file, "Cargo.toml");

    let poll = ScaffoldPoll::from_config(&config.workspace);
    assert_eq!(poll.interval, Duration::from_millis(250));
    assert_eq!(poll.deadline, Duration::from_secs(30));

    let unwrapper = Unwrapper::new(&config.generation.language_tag);
    assert_eq!(unwrapper.unwrap("```ink\nmod a {}\n```"), "\nmod a {}\n");

    assert_eq!(config.source_of("toolchain.build"), ConfigSource::Config);
    assert_eq!(config.source_of("workspace.manifest_file"), ConfigSource::Default);
}

#[test]
fn cli_overrides_win_over_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    write_config(
        &dir,
        "[toolchain]\ntimeout_secs = 900\n\n[llm]\nmodel = \"gpt-4o\"\n",
    );

    let cli = CliArgs {
        timeout_secs: Some(60),
        model: Some("gpt-4o-mini".to_string()),
        ..CliArgs::default()
    };
    let config = Config::discover_from(dir.path(), &cli).unwrap();

    assert_eq!(config.toolchain.timeout_secs, 60);
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.source_of("toolchain.timeout_secs"), ConfigSource::Cli);
    assert_eq!(config.source_of("llm.model"), ConfigSource::Cli);
}

#[test]
fn defaults_describe_the_stock_toolchain() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();

    let config = Config::discover_from(dir.path(), &CliArgs::default()).unwrap();
    assert!(config.config_path.is_none());

    let toolchain = Toolchain::from_config(&config.toolchain).unwrap();
    assert_eq!(toolchain.build_command().display(), "cargo contract build");
    assert_eq!(
        toolchain.audit_command().display(),
        "cargo scout-audit --output-format json"
    );
    assert_eq!(config.output.generated_dir(), config.output.root.join("generated"));

    let effective = config.effective_config();
    assert_eq!(effective["workspace.dir"].0, "Test-Cargo");
    assert_eq!(effective["workspace.dir"].1, "default");
}

#[test]
fn empty_command_array_is_rejected_before_use() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    write_config(&dir, "[toolchain]\naudit = []\n");

    assert!(Config::discover_from(dir.path(), &CliArgs::default()).is_err());
}
