//! Writing classified artifacts into their outcome buckets
//!
//! Layout under the output root:
//!
//! ```text
//! <root>/<bucket>/<name>.rs    source as staged for the build
//! <root>/<bucket>/<name>.txt   diagnostics, when the outcome has any
//! ```

use std::path::{Component, Path, PathBuf};

use inkcheck_utils::atomic_write::write_bytes_atomic;
use inkcheck_utils::error::InkcheckError;
use tracing::debug;

use crate::classifier::{Classification, OutcomeKind};

/// Extension of persisted diagnostics
pub const DIAGNOSTICS_EXTENSION: &str = "txt";

/// Files written for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedOutcome {
    pub source_path: PathBuf,
    pub diagnostics_path: Option<PathBuf>,
}

/// The output root and its bucket directories.
#[derive(Debug, Clone)]
pub struct OutcomeStore {
    root: PathBuf,
}

impl OutcomeStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn bucket_dir(&self, kind: OutcomeKind) -> PathBuf {
        self.root.join(kind.bucket())
    }

    /// Create every bucket directory, so an empty bucket is still visible.
    ///
    /// # Errors
    ///
    /// Returns `InkcheckError::Persist` naming the directory that could not
    /// be created.
    pub fn ensure_buckets(&self) -> Result<(), InkcheckError> {
        for kind in OutcomeKind::all() {
            let dir = self.bucket_dir(kind);
            std::fs::create_dir_all(&dir).map_err(|e| InkcheckError::Persist {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Persist the staged source and, when present, the diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `InkcheckError::Persist` if `name` is not a single path
    /// component or a file cannot be written.
    pub fn persist(
        &self,
        name: &str,
        clean_text: &str,
        classification: &Classification,
    ) -> Result<PersistedOutcome, InkcheckError> {
        let bucket = self.bucket_dir(classification.kind);
        if !is_single_component(name) {
            return Err(InkcheckError::Persist {
                path: bucket.join(name).display().to_string(),
                reason: "artifact name must be a single path component".to_string(),
            });
        }

        let source_path = bucket.join(format!("{name}.{}", crate::artifact::SOURCE_EXTENSION));
        write(&source_path, clean_text.as_bytes())?;

        let diagnostics_path = match &classification.diagnostics {
            Some(text) => {
                let path = bucket.join(format!("{name}.{DIAGNOSTICS_EXTENSION}"));
                write(&path, text.as_bytes())?;
                Some(path)
            }
            None => None,
        };

        debug!(
            artifact = %name,
            bucket = classification.kind.bucket(),
            "Persisted artifact"
        );
        Ok(PersistedOutcome {
            source_path,
            diagnostics_path,
        })
    }
}

fn write(path: &Path, content: &[u8]) -> Result<(), InkcheckError> {
    write_bytes_atomic(path, content)
        .map(|_| ())
        .map_err(|e| InkcheckError::Persist {
            path: path.display().to_string(),
            reason: format!("{e:#}"),
        })
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
