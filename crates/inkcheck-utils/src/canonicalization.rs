use anyhow::{Context, Result};
use blake3::Hasher;
use serde::Serialize;

/// Emit a value as JCS-canonical JSON (RFC 8785).
///
/// Run receipts and `inkcheck test --json` go through here so the same run
/// always serializes to the same bytes.
///
/// ```rust
/// use inkcheck_utils::canonicalization::emit_jcs;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Summary {
///     total: usize,
///     passed: usize,
/// }
///
/// let json = emit_jcs(&Summary { total: 3, passed: 1 }).unwrap();
/// assert_eq!(json, r#"{"passed":1,"total":3}"#);
/// ```
pub fn emit_jcs<T: Serialize>(value: &T) -> Result<String> {
    let json_value =
        serde_json::to_value(value).with_context(|| "Failed to serialize value to JSON")?;
    let json_bytes = serde_json_canonicalizer::to_vec(&json_value)
        .with_context(|| "Failed to canonicalize JSON using JCS")?;
    String::from_utf8(json_bytes).with_context(|| "JCS output contained invalid UTF-8")
}

/// BLAKE3 hex digest of raw content.
///
/// Recorded per artifact so a receipt identifies exactly which source was
/// built, even after the generated directory is regenerated.
#[must_use]
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize().to_hex().to_string()
}
