//! Run receipts
//!
//! One JSON document per `inkcheck test` run under `<output_root>/runs/`,
//! written as JCS canonical JSON so identical runs produce identical bytes
//! apart from the timestamp.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use inkcheck_utils::atomic_write::write_bytes_atomic;
use inkcheck_utils::canonicalization::emit_jcs;
use inkcheck_utils::error::InkcheckError;
use serde::{Deserialize, Serialize};

use crate::orchestrator::{ArtifactRecord, RunReport, RunSummary};
use crate::toolchain::Toolchain;
use crate::workspace::Workspace;

pub const RECEIPT_SCHEMA_VERSION: &str = "1";

/// Directory under the output root holding receipts
pub const RUNS_DIR: &str = "runs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReceipt {
    pub schema_version: String,
    pub emitted_at: DateTime<Utc>,
    pub inkcheck_version: String,
    pub workspace: String,
    pub build_command: String,
    pub audit_command: String,
    pub timeout_secs: u64,
    pub summary: RunSummary,
    pub artifacts: Vec<ArtifactRecord>,
}

impl RunReceipt {
    #[must_use]
    pub fn new(report: &RunReport, workspace: &Workspace, toolchain: &Toolchain) -> Self {
        Self {
            schema_version: RECEIPT_SCHEMA_VERSION.to_string(),
            emitted_at: Utc::now(),
            inkcheck_version: env!("CARGO_PKG_VERSION").to_string(),
            workspace: workspace.root().display().to_string(),
            build_command: toolchain.build_command().display(),
            audit_command: toolchain.audit_command().display(),
            timeout_secs: toolchain.timeout().as_secs(),
            summary: report.summary.clone(),
            artifacts: report.records.clone(),
        }
    }
}

/// Write `receipt` to `<output_root>/runs/<emitted_at>.json`.
///
/// # Errors
///
/// Returns `InkcheckError::Persist` if serialization or the write fails.
pub fn write_receipt(output_root: &Path, receipt: &RunReceipt) -> Result<PathBuf, InkcheckError> {
    let timestamp = receipt.emitted_at.format("%Y%m%d_%H%M%S");
    let path = output_root.join(RUNS_DIR).join(format!("{timestamp}.json"));

    let json = emit_jcs(receipt).map_err(|e| InkcheckError::Persist {
        path: path.display().to_string(),
        reason: format!("{e:#}"),
    })?;
    write_bytes_atomic(&path, json.as_bytes()).map_err(|e| InkcheckError::Persist {
        path: path.display().to_string(),
        reason: format!("{e:#}"),
    })?;

    Ok(path)
}
