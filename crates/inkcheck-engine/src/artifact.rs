//! Generated contract sources awaiting the pipeline

use std::fs;
use std::path::{Component, Path};

use inkcheck_utils::error::InkcheckError;
use tracing::{debug, warn};

use crate::unwrap::Unwrapper;

/// File extension of generated contract sources
pub const SOURCE_EXTENSION: &str = "rs";

/// One generated contract: its name and the text as written.
///
/// The name becomes the file stem of every persisted copy, so it must be a
/// single path component; names produced by generation are sanitized with
/// [`inkcheck_utils::artifact_name::sanitize_artifact_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub source_text: String,
}

impl Artifact {
    #[must_use]
    pub fn new(name: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_text: source_text.into(),
        }
    }

    /// Source with any exact markdown fence removed.
    #[must_use]
    pub fn clean_text<'a>(&'a self, unwrapper: &Unwrapper) -> &'a str {
        unwrapper.unwrap(&self.source_text)
    }
}

/// Load every `*.rs` file directly inside `dir`, sorted by file name.
///
/// The artifact name is the file stem, taken verbatim. Files whose stem is
/// not a usable file name (`..rs` has the stem `.`) are skipped with a
/// warning.
///
/// # Errors
///
/// Returns `InkcheckError::Io` if the directory or a file cannot be read.
pub fn load_artifacts(dir: &Path) -> Result<Vec<Artifact>, InkcheckError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_source = path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION);
        if is_source {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut artifacts = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        if !is_single_component(&stem) {
            warn!(path = %path.display(), "Skipping contract whose name is not a file name");
            continue;
        }
        let source_text = fs::read_to_string(&path)?;
        debug!(artifact = %stem, path = %path.display(), "Loaded artifact");
        artifacts.push(Artifact::new(stem, source_text));
    }

    Ok(artifacts)
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_text_strips_fence() {
        let artifact = Artifact::new("Token_0", "```rust\nmod token {}\n```");
        assert_eq!(artifact.clean_text(&Unwrapper::default()), "\nmod token {}\n");
    }

    #[test]
    fn test_load_artifacts_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Voting_0.rs"), "voting").unwrap();
        fs::write(dir.path().join("Auction_0.rs"), "auction").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.rs")).unwrap();

        let artifacts = load_artifacts(dir.path()).unwrap();
        let names: Vec<_> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Auction_0", "Voting_0"]);
        assert_eq!(artifacts[0].source_text, "auction");
    }

    #[test]
    fn test_load_artifacts_keeps_stem_verbatim() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Token_(ERC20)_0.rs"), "").unwrap();

        let artifacts = load_artifacts(dir.path()).unwrap();
        assert_eq!(artifacts[0].name, "Token_(ERC20)_0");
    }

    #[test]
    fn test_load_artifacts_missing_dir() {
        let dir = TempDir::new().unwrap();
        let result = load_artifacts(&dir.path().join("absent"));
        assert!(matches!(result, Err(InkcheckError::Io(_))));
    }

    #[test]
    fn test_load_artifacts_skips_dot_stems() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("..rs"), "stray").unwrap();
        fs::write(dir.path().join("Escrow_0.rs"), "escrow").unwrap();

        let artifacts = load_artifacts(dir.path()).unwrap();
        let names: Vec<_> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Escrow_0"]);
    }

    #[test]
    fn test_single_component_names() {
        assert!(is_single_component("Token_0"));
        assert!(is_single_component(".hidden"));
        assert!(!is_single_component("."));
        assert!(!is_single_component(""));
    }
}
