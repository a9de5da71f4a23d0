//! Atomic file operations
//!
//! Content is written to a temporary file in the target directory, fsynced,
//! then renamed over the target. Bytes are written exactly as given: build
//! logs and contract sources keep their original line endings.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Result of an atomic write operation
#[derive(Debug, Clone, Default)]
pub struct AtomicWriteResult {
    /// Whether cross-filesystem fallback was used
    pub used_cross_filesystem_fallback: bool,
    /// Number of bytes written
    pub bytes_written: usize,
}

/// Atomically write `content` to `path`, creating parent directories.
pub fn write_bytes_atomic(path: &Path, content: &[u8]) -> Result<AtomicWriteResult> {
    let mut result = AtomicWriteResult {
        bytes_written: content.len(),
        ..AtomicWriteResult::default()
    };

    let temp_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(temp_dir)
        .with_context(|| format!("Failed to create parent directory: {}", temp_dir.display()))?;

    let mut temp_file = NamedTempFile::new_in(temp_dir)
        .with_context(|| format!("Failed to create temporary file in: {}", temp_dir.display()))?;

    temp_file
        .write_all(content)
        .with_context(|| "Failed to write content to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .with_context(|| "Failed to fsync temporary file")?;

    match temp_file.persist(path) {
        Ok(_) => {}
        Err(persist_error) if is_cross_filesystem_error(&persist_error.error) => {
            result.used_cross_filesystem_fallback = true;
            cross_filesystem_copy(persist_error.file.path(), path)?;
        }
        Err(persist_error) => {
            return Err(anyhow::Error::new(persist_error.error))
                .with_context(|| format!("Failed to atomically write file: {}", path.display()));
        }
    }

    Ok(result)
}

/// Check if an error indicates a rename across filesystems
#[cfg(unix)]
fn is_cross_filesystem_error(err: &std::io::Error) -> bool {
    // EXDEV on Linux and macOS
    err.raw_os_error() == Some(18)
}

#[cfg(not(unix))]
fn is_cross_filesystem_error(err: &std::io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    err.raw_os_error() == Some(17)
}

/// Copy the temp file next to the target, fsync, then rename.
fn cross_filesystem_copy(source: &Path, target: &Path) -> Result<()> {
    let content = fs::read(source)
        .with_context(|| format!("Failed to read temporary file: {}", source.display()))?;

    let target_dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(target_dir)
        .with_context(|| format!("Failed to create temporary file in: {}", target_dir.display()))?;
    staged
        .write_all(&content)
        .with_context(|| "Failed to write fallback temporary file")?;
    staged
        .as_file()
        .sync_all()
        .with_context(|| "Failed to fsync fallback temporary file")?;
    staged
        .persist(target)
        .map_err(|e| anyhow::Error::new(e.error))
        .with_context(|| format!("Failed to replace target file: {}", target.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passed").join("Token_0.rs");

        let result = write_bytes_atomic(&path, "#[ink::contract]\nmod token {}\n".as_bytes()).unwrap();
        assert!(!result.used_cross_filesystem_fallback);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "#[ink::contract]\nmod token {}\n"
        );
    }

    #[test]
    fn test_atomic_write_preserves_crlf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("failed_build").join("Token_0.txt");

        write_bytes_atomic(&path, "error: one\r\nerror: two\r\n".as_bytes()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"error: one\r\nerror: two\r\n");
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lib.rs");

        write_bytes_atomic(&path, "first version that is longer".as_bytes()).unwrap();
        write_bytes_atomic(&path, "second".as_bytes()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        write_bytes_atomic(&path, "x".as_bytes()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
