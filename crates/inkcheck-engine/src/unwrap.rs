//! Markdown fence removal for model responses
//!
//! Models answer with the contract wrapped in a fenced block:
//!
//! ````text
//! ```rust
//! #[ink::contract]
//! mod token { ... }
//! ```
//! ````
//!
//! Only an exact wrapper is removed: the text must start with the opening
//! marker and end with the closing marker. Nothing is trimmed, so the newline
//! after the opening marker and the one before the closing marker stay in the
//! result. Anything else passes through untouched.

/// Closing fence marker
pub const CLOSING_FENCE: &str = "```";

/// Strips an exact `` ```<tag> `` ... `` ``` `` wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwrapper {
    opening: String,
}

impl Unwrapper {
    #[must_use]
    pub fn new(language_tag: &str) -> Self {
        Self {
            opening: format!("{CLOSING_FENCE}{language_tag}"),
        }
    }

    /// The opening marker, e.g. `` ```rust ``.
    #[must_use]
    pub fn opening(&self) -> &str {
        &self.opening
    }

    /// Remove wrappers until none remains.
    ///
    /// Repeating until a fixed point makes the operation idempotent even for
    /// responses fenced twice over.
    #[must_use]
    pub fn unwrap<'a>(&self, text: &'a str) -> &'a str {
        let mut current = text;
        while let Some(inner) = self.strip_once(current) {
            current = inner;
        }
        current
    }

    /// The markers may not overlap: the closing marker is searched for only
    /// after the opening marker has been removed.
    fn strip_once<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.strip_prefix(self.opening.as_str())?
            .strip_suffix(CLOSING_FENCE)
    }
}

impl Default for Unwrapper {
    fn default() -> Self {
        Self::new("rust")
    }
}

/// Unwrap with the default `rust` tag.
#[must_use]
pub fn unwrap(text: &str) -> String {
    Unwrapper::default().unwrap(text).to_string()
}
