//! End-to-end pipeline scenarios with a scripted toolchain
//!
//! Every test drives the real orchestrator, workspace, classifier and
//! persistence against a temporary directory; only process execution is
//! replaced by `FakeRunner`.

use std::fs;
use std::path::{Path, PathBuf};

use inkcheck::engine::test_support::{FakeRunner, FakeStep};
use inkcheck::engine::{
    Artifact, OutcomeKind, OutcomeStore, Orchestrator, RunReceipt, Toolchain, Workspace,
    WorkspaceLayout, load_artifacts, write_receipt,
};
use inkcheck::InkcheckError;
use tempfile::TempDir;

struct Harness {
    _dir: TempDir,
    output: PathBuf,
    orchestrator: Orchestrator<FakeRunner>,
}

impl Harness {
    fn new(runner: FakeRunner) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Test-Cargo");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("Cargo.toml"), "[package]\nname = \"test-cargo\"\n").unwrap();
        let output = dir.path().join("contracts");
        let orchestrator = Orchestrator::new(
            runner,
            Toolchain::default(),
            Workspace::open(&root, WorkspaceLayout::default()).unwrap(),
            OutcomeStore::new(&output),
        );
        Self {
            _dir: dir,
            output,
            orchestrator,
        }
    }

    fn bucket_file(&self, kind: OutcomeKind, file: &str) -> PathBuf {
        self.output.join(kind.bucket()).join(file)
    }

    fn runner(&self) -> &FakeRunner {
        self.orchestrator.runner()
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

#[test]
fn build_failure_is_persisted_with_compiler_output() {
    let h = Harness::new(
        FakeRunner::new().on_build(FakeStep::exit(1, "", "error[E0308]: mismatched types")),
    );
    let report = h
        .orchestrator
        .run(&[Artifact::new("Token_0", "```rust\nmod token { bad }\n```")])
        .unwrap();

    assert_eq!(report.outcome_of("Token_0"), Some(OutcomeKind::BuildFailed));
    assert_eq!(
        read(&h.bucket_file(OutcomeKind::BuildFailed, "Token_0.txt")),
        "error[E0308]: mismatched types"
    );
    assert_eq!(
        read(&h.bucket_file(OutcomeKind::BuildFailed, "Token_0.rs")),
        "\nmod token { bad }\n"
    );
    assert_eq!(h.runner().audit_calls(), 0);
}

#[test]
fn empty_report_passes_without_diagnostics() {
    let h = Harness::new(
        FakeRunner::new()
            .on_build(FakeStep::success())
            .on_audit(FakeStep::success().writes_report("{}")),
    );
    let report = h.orchestrator.run(&[Artifact::new("Flipper_0", "mod flipper {}")]).unwrap();

    assert_eq!(report.outcome_of("Flipper_0"), Some(OutcomeKind::Passed));
    assert!(h.bucket_file(OutcomeKind::Passed, "Flipper_0.rs").is_file());
    assert!(!h.bucket_file(OutcomeKind::Passed, "Flipper_0.txt").exists());
}

#[test]
fn findings_are_persisted_as_serialized_report() {
    let h = Harness::new(
        FakeRunner::new()
            .on_build(FakeStep::success())
            .on_audit(FakeStep::success().writes_report(r#"{"integer-overflow": ["line 42"]}"#)),
    );
    let report = h.orchestrator.run(&[Artifact::new("Vault_0", "mod vault {}")]).unwrap();

    assert_eq!(report.outcome_of("Vault_0"), Some(OutcomeKind::Vulnerable));
    let diagnostics = read(&h.bucket_file(OutcomeKind::Vulnerable, "Vault_0.txt"));
    let parsed: serde_json::Value = serde_json::from_str(&diagnostics).unwrap();
    assert_eq!(parsed, serde_json::json!({"integer-overflow": ["line 42"]}));
}

#[test]
fn audit_failure_persists_audit_output() {
    let h = Harness::new(
        FakeRunner::new()
            .on_build(FakeStep::exit(0, "Finished release", ""))
            .on_audit(FakeStep::exit(1, "Scanning...\n", "thread 'main' panicked")),
    );
    h.orchestrator.run(&[Artifact::new("Dex_0", "mod dex {}")]).unwrap();

    assert_eq!(
        read(&h.bucket_file(OutcomeKind::AuditToolFailed, "Dex_0.txt")),
        "Scanning...\nthread 'main' panicked"
    );
}

#[test]
fn successful_audit_without_report_is_unreadable() {
    let h = Harness::new(
        FakeRunner::new()
            .on_build(FakeStep::success())
            .on_audit(FakeStep::success()),
    );
    let report = h.orchestrator.run(&[Artifact::new("Nft_0", "mod nft {}")]).unwrap();

    assert_eq!(report.outcome_of("Nft_0"), Some(OutcomeKind::AuditReportUnreadable));
    assert_eq!(
        read(&h.bucket_file(OutcomeKind::AuditReportUnreadable, "Nft_0.txt")),
        "no report file produced"
    );
}

#[test]
fn malformed_report_is_unreadable() {
    let h = Harness::new(
        FakeRunner::new()
            .on_build(FakeStep::success())
            .on_audit(FakeStep::success().writes_report("[\"not\", \"an object\"]")),
    );
    let report = h.orchestrator.run(&[Artifact::new("Nft_0", "mod nft {}")]).unwrap();

    assert_eq!(report.outcome_of("Nft_0"), Some(OutcomeKind::AuditReportUnreadable));
    let diagnostics = read(&h.bucket_file(OutcomeKind::AuditReportUnreadable, "Nft_0.txt"));
    assert!(diagnostics.contains("an array"), "{diagnostics}");
}

#[test]
fn stale_report_is_never_attributed_to_the_next_artifact() {
    let h = Harness::new(
        FakeRunner::new()
            .on_build(FakeStep::success())
            .on_build(FakeStep::success())
            .on_audit(FakeStep::success().writes_report(r#"{"reentrancy": ["line 7"]}"#))
            .on_audit(FakeStep::success()),
    );
    let report = h
        .orchestrator
        .run(&[Artifact::new("A", "mod a {}"), Artifact::new("B", "mod b {}")])
        .unwrap();

    assert_eq!(report.outcome_of("A"), Some(OutcomeKind::Vulnerable));
    assert_eq!(report.outcome_of("B"), Some(OutcomeKind::AuditReportUnreadable));
}

#[test]
fn batch_continues_past_failures_in_input_order() {
    let h = Harness::new(
        FakeRunner::new()
            .on_build(FakeStep::exit(1, "", "error"))
            .on_build(FakeStep::success())
            .on_build(FakeStep::timeout())
            .on_build(FakeStep::success())
            .on_audit(FakeStep::exit(2, "", "boom"))
            .on_audit(FakeStep::success().writes_report("{}")),
    );
    let artifacts = ["C", "A", "D", "B"].map(|name| Artifact::new(name, format!("mod {name} {{}}")));
    let report = h.orchestrator.run(&artifacts).unwrap();

    let order: Vec<_> = report.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["C", "A", "D", "B"]);
    assert_eq!(report.outcome_of("C"), Some(OutcomeKind::BuildFailed));
    assert_eq!(report.outcome_of("A"), Some(OutcomeKind::AuditToolFailed));
    assert_eq!(report.outcome_of("D"), Some(OutcomeKind::TimedOut));
    assert_eq!(report.outcome_of("B"), Some(OutcomeKind::Passed));
    assert_eq!(report.summary.total, 4);
    assert_eq!(h.runner().build_calls(), 4);
    assert_eq!(h.runner().audit_calls(), 2);

    let timeout_diagnostics = read(&h.bucket_file(OutcomeKind::TimedOut, "D.txt"));
    assert!(timeout_diagnostics.starts_with("build step timed out"));
}

#[test]
fn missing_toolchain_aborts_the_batch() {
    let h = Harness::new(
        FakeRunner::new()
            .on_build(FakeStep::success())
            .on_audit(FakeStep::spawn_failure()),
    );
    let err = h
        .orchestrator
        .run(&[Artifact::new("A", "mod a {}"), Artifact::new("B", "mod b {}")])
        .unwrap_err();

    assert!(matches!(err, InkcheckError::Runner(ref e) if e.is_launch_failure()));
    assert_eq!(err.to_exit_code().as_i32(), 69);
    assert_eq!(h.runner().build_calls(), 1);
}

#[test]
fn each_artifact_is_staged_over_the_previous_one() {
    let h = Harness::new(FakeRunner::new());
    let source_path = h.orchestrator.workspace().source_path();

    h.orchestrator
        .process(&Artifact::new("Long_0", "mod long {}\n// padding padding padding\n"))
        .unwrap();
    h.orchestrator.process(&Artifact::new("Short_0", "mod s {}")).unwrap();

    assert_eq!(read(&source_path), "mod s {}");
}

#[test]
fn generated_directory_round_trips_into_a_receipt() {
    let h = Harness::new(
        FakeRunner::new()
            .on_build(FakeStep::success())
            .on_audit(FakeStep::success().writes_report("{}"))
            .on_build(FakeStep::exit(1, "", "error")),
    );
    let generated = h.output.join("generated");
    fs::create_dir_all(&generated).unwrap();
    fs::write(generated.join("Auction_0.rs"), "```rust\nmod auction {}\n```").unwrap();
    fs::write(generated.join("Voting_0.rs"), "mod voting {").unwrap();

    let artifacts = load_artifacts(&generated).unwrap();
    let report = h.orchestrator.run(&artifacts).unwrap();
    let receipt = RunReceipt::new(&report, h.orchestrator.workspace(), h.orchestrator.toolchain());
    let path = write_receipt(&h.output, &receipt).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&read(&path)).unwrap();
    assert_eq!(parsed["summary"]["total"], 2);
    assert_eq!(parsed["summary"]["counts"]["PASSED"], 1);
    assert_eq!(parsed["summary"]["counts"]["BUILD_FAILED"], 1);
    assert_eq!(parsed["artifacts"][0]["name"], "Auction_0");
    assert_eq!(parsed["artifacts"][1]["outcome"], "BUILD_FAILED");
}
