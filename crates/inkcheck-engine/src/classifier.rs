//! Mapping build and audit results to an outcome bucket

use std::fmt;

use inkcheck_runner::ProcessOutput;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{EnumIter, IntoEnumIterator};

use crate::report::AuditReport;

/// Diagnostics for an audit run that left no report behind
pub const NO_REPORT_DIAGNOSTIC: &str = "no report file produced";

/// The bucket an artifact ends up in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    BuildFailed,
    AuditToolFailed,
    AuditReportUnreadable,
    Vulnerable,
    Passed,
    TimedOut,
}

impl OutcomeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BuildFailed => "BUILD_FAILED",
            Self::AuditToolFailed => "AUDIT_TOOL_FAILED",
            Self::AuditReportUnreadable => "AUDIT_REPORT_UNREADABLE",
            Self::Vulnerable => "VULNERABLE",
            Self::Passed => "PASSED",
            Self::TimedOut => "TIMED_OUT",
        }
    }

    /// Directory under the output root holding artifacts with this outcome.
    #[must_use]
    pub const fn bucket(self) -> &'static str {
        match self {
            Self::BuildFailed => "failed_build",
            Self::AuditToolFailed => "failed_audit",
            Self::AuditReportUnreadable => "unreadable_report",
            Self::Vulnerable => "found_vulnerabilities",
            Self::Passed => "passed",
            Self::TimedOut => "timed_out",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A toolchain step, for logs and timeout diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Build,
    Audit,
}

impl Step {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Audit => "audit",
        }
    }
}

/// Outcome plus the text persisted next to the artifact, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: OutcomeKind,
    pub diagnostics: Option<String>,
}

impl Classification {
    fn new(kind: OutcomeKind, diagnostics: impl Into<String>) -> Self {
        Self {
            kind,
            diagnostics: Some(diagnostics.into()),
        }
    }
}

/// Decide the outcome for one artifact.
///
/// Total over every combination of inputs, including ones the orchestrator
/// never produces (an audit result after a failed build, a missing audit
/// after a successful one). Checks run in this order:
///
/// 1. build timed out or failed
/// 2. audit missing, timed out or failed
/// 3. report missing or unreadable
/// 4. report empty or carrying findings
#[must_use]
pub fn classify(
    build: &ProcessOutput,
    audit: Option<&ProcessOutput>,
    report: Option<&AuditReport>,
) -> Classification {
    if build.timed_out {
        return timed_out(Step::Build, build);
    }
    if !build.success() {
        return Classification::new(OutcomeKind::BuildFailed, build.combined_output());
    }

    let Some(audit) = audit else {
        return Classification::new(OutcomeKind::AuditToolFailed, "audit step did not run");
    };
    if audit.timed_out {
        return timed_out(Step::Audit, audit);
    }
    if !audit.success() {
        return Classification::new(OutcomeKind::AuditToolFailed, audit.combined_output());
    }

    match report {
        None | Some(AuditReport::Absent) => {
            Classification::new(OutcomeKind::AuditReportUnreadable, NO_REPORT_DIAGNOSTIC)
        }
        Some(AuditReport::Malformed { error }) => {
            Classification::new(OutcomeKind::AuditReportUnreadable, error.clone())
        }
        Some(AuditReport::Empty) => Classification {
            kind: OutcomeKind::Passed,
            diagnostics: None,
        },
        Some(AuditReport::Findings(map)) => Classification::new(
            OutcomeKind::Vulnerable,
            Value::Object(map.clone()).to_string(),
        ),
    }
}

fn timed_out(step: Step, output: &ProcessOutput) -> Classification {
    Classification::new(
        OutcomeKind::TimedOut,
        format!("{} step timed out\n{}", step.as_str(), output.combined_output()),
    )
}
