//! Artifact name sanitization
//!
//! Artifact names become file names under every bucket directory, so they are
//! restricted to `[A-Za-z0-9._-]`.

use crate::error::{ErrorCategory, UserFriendlyError};
use unicode_normalization::UnicodeNormalization;

/// Error type for artifact name validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactNameError {
    #[error("Artifact name is empty")]
    Empty,

    #[error("Artifact name '{original}' has no alphanumeric characters")]
    NoAlphanumeric { original: String },
}

impl UserFriendlyError for ArtifactNameError {
    fn user_message(&self) -> String {
        match self {
            Self::Empty => "An artifact has an empty name".to_string(),
            Self::NoAlphanumeric { original } => {
                format!("The artifact name '{original}' contains no letters or digits")
            }
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Artifact names are derived from category labels or file stems and are used as file names in every outcome directory."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        vec![
            "Remove blank or punctuation-only lines from the categories file".to_string(),
            "Rename source files so their stem contains a letter or digit".to_string(),
        ]
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

/// Sanitize a raw label into a file-system safe artifact name.
///
/// - NFKC normalization folds full-width and compatibility characters
/// - everything outside `[A-Za-z0-9._-]` (whitespace and path separators
///   included) becomes `_`
/// - runs of dots are rewritten so `..` never survives
/// - the result must contain at least one ASCII alphanumeric character
///
/// ```
/// use inkcheck_utils::artifact_name::sanitize_artifact_name;
///
/// assert_eq!(sanitize_artifact_name("Token Vesting_0").unwrap(), "Token_Vesting_0");
/// assert_eq!(sanitize_artifact_name("../escape").unwrap(), "___escape");
/// assert!(sanitize_artifact_name("  ").is_err());
/// ```
pub fn sanitize_artifact_name(raw: &str) -> Result<String, ArtifactNameError> {
    if raw.is_empty() {
        return Err(ArtifactNameError::Empty);
    }

    let normalized: String = raw.nfkc().collect();

    let mut sanitized: String = normalized
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", "__");
    }

    if !sanitized.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(ArtifactNameError::NoAlphanumeric {
            original: raw.to_string(),
        });
    }

    if sanitized != raw {
        tracing::debug!(original = %raw, sanitized = %sanitized, "Artifact name sanitized");
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_names_unchanged() {
        assert_eq!(sanitize_artifact_name("Token_0").unwrap(), "Token_0");
        assert_eq!(sanitize_artifact_name("erc20-v2.1").unwrap(), "erc20-v2.1");
    }

    #[test]
    fn test_whitespace_and_separators_replaced() {
        assert_eq!(
            sanitize_artifact_name("Multi Sig Wallet_3").unwrap(),
            "Multi_Sig_Wallet_3"
        );
        assert_eq!(sanitize_artifact_name("a/b\\c").unwrap(), "a_b_c");
        assert_eq!(sanitize_artifact_name("dao\tvote").unwrap(), "dao_vote");
    }

    #[test]
    fn test_parent_traversal_collapsed() {
        assert_eq!(sanitize_artifact_name("../../etc").unwrap(), "______etc");
        assert_eq!(sanitize_artifact_name("a...b").unwrap(), "a__.b");
    }

    #[test]
    fn test_fullwidth_normalized() {
        assert_eq!(sanitize_artifact_name("Ｔｏｋｅｎ").unwrap(), "Token");
    }

    #[test]
    fn test_rejects_empty_and_punctuation_only() {
        assert_eq!(sanitize_artifact_name(""), Err(ArtifactNameError::Empty));
        assert!(matches!(
            sanitize_artifact_name("  -- "),
            Err(ArtifactNameError::NoAlphanumeric { .. })
        ));
    }

    #[test]
    fn test_error_user_friendly() {
        let err = ArtifactNameError::Empty;
        assert!(!err.user_message().is_empty());
        assert!(err.context().is_some());
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    proptest! {
        #[test]
        fn prop_sanitized_names_are_safe(raw in "\\PC{1,40}") {
            if let Ok(name) = sanitize_artifact_name(&raw) {
                prop_assert!(!name.contains(".."));
                prop_assert!(!name.contains('/'));
                prop_assert!(!name.contains('\\'));
                prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || "._-".contains(c)));
            }
        }

        #[test]
        fn prop_sanitize_is_idempotent(raw in "[a-zA-Z0-9 ./_-]{1,40}") {
            if let Ok(once) = sanitize_artifact_name(&raw) {
                prop_assert_eq!(sanitize_artifact_name(&once).unwrap(), once);
            }
        }
    }
}
