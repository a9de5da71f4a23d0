//! Sequential batch execution
//!
//! Each artifact goes through the same steps in the shared workspace:
//! reset, stage, build, audit when the build succeeded, classify, persist.
//! An artifact that fails to build or audit is an outcome, not an error; the
//! batch only stops when the toolchain cannot be launched, the workspace
//! cannot be prepared, or results cannot be written.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use inkcheck_runner::ProcessRunner;
use inkcheck_utils::canonicalization::content_hash;
use inkcheck_utils::error::InkcheckError;
use inkcheck_utils::logging::{artifact_span, log_outcome};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifact::Artifact;
use crate::classifier::{OutcomeKind, classify};
use crate::persist::OutcomeStore;
use crate::report;
use crate::toolchain::Toolchain;
use crate::unwrap::Unwrapper;
use crate::workspace::Workspace;

/// What happened to one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub name: String,
    pub outcome: OutcomeKind,
    /// BLAKE3 of the staged source
    pub source_blake3: String,
    pub build_exit_code: Option<i32>,
    /// `None` when the audit did not run or was killed
    pub audit_exit_code: Option<i32>,
    pub duration_ms: u64,
}

/// Per-outcome counts. Every outcome kind has an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub counts: BTreeMap<OutcomeKind, usize>,
}

impl RunSummary {
    #[must_use]
    pub fn from_records(records: &[ArtifactRecord]) -> Self {
        let mut counts: BTreeMap<OutcomeKind, usize> =
            OutcomeKind::all().map(|kind| (kind, 0)).collect();
        for record in records {
            *counts.entry(record.outcome).or_default() += 1;
        }
        Self {
            total: records.len(),
            counts,
        }
    }

    #[must_use]
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tested {} contract(s)", self.total)?;
        for (kind, count) in &self.counts {
            writeln!(f, "  {:<24} {count:>5}  ({})", kind.as_str(), kind.bucket())?;
        }
        Ok(())
    }
}

/// Result of a whole batch, records in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub records: Vec<ArtifactRecord>,
    pub summary: RunSummary,
}

impl RunReport {
    #[must_use]
    pub fn new(records: Vec<ArtifactRecord>) -> Self {
        let summary = RunSummary::from_records(&records);
        Self { records, summary }
    }

    /// Artifact name to outcome.
    #[must_use]
    pub fn outcomes(&self) -> BTreeMap<String, OutcomeKind> {
        self.records
            .iter()
            .map(|record| (record.name.clone(), record.outcome))
            .collect()
    }

    #[must_use]
    pub fn outcome_of(&self, name: &str) -> Option<OutcomeKind> {
        self.records
            .iter()
            .find(|record| record.name == name)
            .map(|record| record.outcome)
    }
}

pub struct Orchestrator<R> {
    runner: R,
    toolchain: Toolchain,
    workspace: Workspace,
    store: OutcomeStore,
    unwrapper: Unwrapper,
}

impl<R: ProcessRunner> Orchestrator<R> {
    #[must_use]
    pub fn new(runner: R, toolchain: Toolchain, workspace: Workspace, store: OutcomeStore) -> Self {
        Self {
            runner,
            toolchain,
            workspace,
            store,
            unwrapper: Unwrapper::default(),
        }
    }

    #[must_use]
    pub fn with_unwrapper(mut self, unwrapper: Unwrapper) -> Self {
        self.unwrapper = unwrapper;
        self
    }

    pub const fn runner(&self) -> &R {
        &self.runner
    }

    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub const fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Run every artifact in order.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal error: `InkcheckError::Runner` when a tool
    /// cannot be launched, `InkcheckError::Workspace` when the workspace
    /// cannot be reset or staged, `InkcheckError::Persist` when results
    /// cannot be written. Records for earlier artifacts are already on disk.
    pub fn run(&self, artifacts: &[Artifact]) -> Result<RunReport, InkcheckError> {
        self.store.ensure_buckets()?;
        info!(
            count = artifacts.len(),
            workspace = %self.workspace.root().display(),
            "Testing contracts"
        );

        let mut records = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            records.push(self.process(artifact)?);
        }

        let report = RunReport::new(records);
        info!(
            total = report.summary.total,
            passed = report.summary.count(OutcomeKind::Passed),
            vulnerable = report.summary.count(OutcomeKind::Vulnerable),
            "Batch complete"
        );
        Ok(report)
    }

    /// Run one artifact through the pipeline and persist its outcome.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub fn process(&self, artifact: &Artifact) -> Result<ArtifactRecord, InkcheckError> {
        let span = artifact_span(&artifact.name);
        let _guard = span.enter();
        let started = Instant::now();

        self.workspace.reset()?;
        let clean_text = artifact.clean_text(&self.unwrapper);
        self.workspace.stage(clean_text)?;

        let build = self
            .toolchain
            .build(&self.runner, &self.workspace, &artifact.name)?;

        let (audit, report) = if build.success() {
            let audit = self
                .toolchain
                .audit(&self.runner, &self.workspace, &artifact.name)?;
            let report = audit.success().then(|| report::interpret(&self.workspace));
            (Some(audit), report)
        } else {
            (None, None)
        };

        let classification = classify(&build, audit.as_ref(), report.as_ref());
        self.store
            .persist(&artifact.name, clean_text, &classification)?;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log_outcome(
            &artifact.name,
            classification.kind.as_str(),
            u128::from(duration_ms),
        );

        Ok(ArtifactRecord {
            name: artifact.name.clone(),
            outcome: classification.kind,
            source_blake3: content_hash(clean_text.as_bytes()),
            build_exit_code: build.exit_code,
            audit_exit_code: audit.and_then(|a| a.exit_code),
            duration_ms,
        })
    }
}
