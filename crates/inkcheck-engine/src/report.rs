//! Reading the auditor's JSON report
//!
//! The auditor writes a single JSON object mapping detector names to their
//! findings. An empty object means nothing was found. Any other shape, or no
//! file at all, means the audit result cannot be trusted.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value};

use crate::workspace::Workspace;

/// What was found at the report path after an audit.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditReport {
    /// No report file exists
    Absent,
    /// The file could not be read or is not a JSON object
    Malformed { error: String },
    /// An empty JSON object
    Empty,
    /// A non-empty JSON object, kept as parsed
    Findings(Map<String, Value>),
}

impl AuditReport {
    /// Whether the report can be used to decide between passed and vulnerable.
    #[must_use]
    pub const fn is_readable(&self) -> bool {
        matches!(self, Self::Empty | Self::Findings(_))
    }

    /// Number of top-level entries (detectors with findings).
    #[must_use]
    pub fn finding_count(&self) -> usize {
        match self {
            Self::Findings(map) => map.len(),
            _ => 0,
        }
    }
}

/// Interpret the report in `workspace`.
#[must_use]
pub fn interpret(workspace: &Workspace) -> AuditReport {
    read_report(&workspace.report_path())
}

/// Interpret the report file at `path`.
#[must_use]
pub fn read_report(path: &Path) -> AuditReport {
    match fs::read_to_string(path) {
        Ok(text) => parse_report(&text),
        Err(e) if e.kind() == ErrorKind::NotFound => AuditReport::Absent,
        Err(e) => AuditReport::Malformed {
            error: format!("failed to read {}: {e}", path.display()),
        },
    }
}

/// Interpret report text.
#[must_use]
pub fn parse_report(text: &str) -> AuditReport {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) if map.is_empty() => AuditReport::Empty,
        Ok(Value::Object(map)) => AuditReport::Findings(map),
        Ok(other) => AuditReport::Malformed {
            error: format!("expected a JSON object, found {}", json_type_name(&other)),
        },
        Err(e) => AuditReport::Malformed {
            error: e.to_string(),
        },
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::WorkspaceLayout;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_is_empty() {
        assert_eq!(parse_report("{}"), AuditReport::Empty);
        assert_eq!(parse_report("  {\n}\n"), AuditReport::Empty);
    }

    #[test]
    fn test_findings_kept_as_parsed() {
        let report = parse_report(r#"{"integer-overflow": ["line 42"]}"#);
        let AuditReport::Findings(map) = &report else {
            panic!("expected findings, got {report:?}");
        };
        assert_eq!(map["integer-overflow"], serde_json::json!(["line 42"]));
        assert_eq!(report.finding_count(), 1);
        assert!(report.is_readable());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let report = parse_report("{not json");
        assert!(matches!(report, AuditReport::Malformed { .. }));
        assert!(!report.is_readable());
    }

    #[test]
    fn test_empty_file_is_malformed() {
        assert!(matches!(parse_report(""), AuditReport::Malformed { .. }));
    }

    #[test]
    fn test_non_object_is_malformed() {
        for (text, kind) in [("[]", "an array"), ("null", "null"), ("42", "a number")] {
            match parse_report(text) {
                AuditReport::Malformed { error } => assert!(error.contains(kind), "{error}"),
                other => panic!("expected malformed for {text}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_interpret_absent_report() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::open(dir.path(), WorkspaceLayout::default()).unwrap();
        assert_eq!(interpret(&ws), AuditReport::Absent);
    }

    #[test]
    fn test_interpret_reads_workspace_report() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::open(dir.path(), WorkspaceLayout::default()).unwrap();
        fs::write(ws.report_path(), "{}").unwrap();
        assert_eq!(interpret(&ws), AuditReport::Empty);
    }
}
