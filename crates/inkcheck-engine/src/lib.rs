//! The inkcheck pipeline
//!
//! Generated contracts are staged one at a time into a single reusable
//! project directory, built, audited when the build succeeds, and sorted into
//! an outcome bucket under the output root. Everything here is sequential.

pub use inkcheck_config as config;
pub use inkcheck_llm as llm;
pub use inkcheck_runner as runner;

pub use inkcheck_utils::atomic_write;
pub use inkcheck_utils::canonicalization;
pub use inkcheck_utils::error;
pub use inkcheck_utils::logging;

pub mod artifact;
pub mod classifier;
pub mod generate;
pub mod orchestrator;
pub mod persist;
pub mod receipt;
pub mod report;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;
pub mod toolchain;
pub mod unwrap;
pub mod workspace;

pub use artifact::{Artifact, load_artifacts};
pub use classifier::{Classification, OutcomeKind, Step, classify};
pub use generate::{
    GenerationPlan, GenerationReport, LlmSourceProvider, PromptTemplate, SourceProvider,
    generate_batch,
};
pub use orchestrator::{ArtifactRecord, Orchestrator, RunReport, RunSummary};
pub use persist::OutcomeStore;
pub use receipt::{RunReceipt, write_receipt};
pub use report::AuditReport;
pub use toolchain::Toolchain;
pub use unwrap::{Unwrapper, unwrap};
pub use workspace::{ScaffoldPoll, Workspace, WorkspaceLayout};
