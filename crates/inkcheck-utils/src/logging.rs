//! Logging and observability infrastructure for inkcheck
//!
//! Structured logging with `tracing`. Every artifact's pipeline runs inside
//! [`artifact_span`], and the step helpers below attach the `artifact`,
//! `step`, `exit_code`, `outcome` and `duration_ms` fields.

use tracing::{Level, debug, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "inkcheck=info,warn";

/// Filter used with `--verbose` when `RUST_LOG` is unset.
pub const VERBOSE_FILTER: &str = "inkcheck=debug,info";

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` always wins. Without it, `verbose` selects between
/// [`DEFAULT_FILTER`] and [`VERBOSE_FILTER`]. Logs go to stderr so that
/// `inkcheck test --json` keeps stdout machine-readable.
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Filter directive used when `RUST_LOG` is not set.
#[must_use]
pub const fn default_filter(verbose: bool) -> &'static str {
    if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }
}

/// Span wrapping one artifact's pass through the pipeline.
pub fn artifact_span(artifact: &str) -> tracing::Span {
    span!(Level::INFO, "artifact", artifact = %artifact)
}

/// Log the start of a pipeline step (`build`, `audit`, `scaffold`, `generate`).
pub fn log_step_start(artifact: &str, step: &str) {
    debug!(artifact = %artifact, step = %step, "Starting step");
}

/// Log a finished toolchain step.
pub fn log_step_complete(artifact: &str, step: &str, exit_code: Option<i32>, duration_ms: u128) {
    match exit_code {
        Some(0) => debug!(
            artifact = %artifact,
            step = %step,
            exit_code = 0,
            duration_ms = %duration_ms,
            "Step succeeded"
        ),
        Some(code) => info!(
            artifact = %artifact,
            step = %step,
            exit_code = code,
            duration_ms = %duration_ms,
            "Step failed"
        ),
        None => warn!(
            artifact = %artifact,
            step = %step,
            duration_ms = %duration_ms,
            "Step terminated without an exit code"
        ),
    }
}

/// Log the final outcome for an artifact.
pub fn log_outcome(artifact: &str, outcome: &str, duration_ms: u128) {
    info!(
        artifact = %artifact,
        outcome = %outcome,
        duration_ms = %duration_ms,
        "Artifact classified"
    );
}
