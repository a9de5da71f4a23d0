//! LLM backend abstraction
//!
//! Generation talks to the model through the [`LlmBackend`] trait; the only
//! shipped implementation is an OpenAI-compatible chat completions client.

pub(crate) mod http_client;
mod openai_backend;
mod types;

pub use inkcheck_utils::error::LlmError;
pub use types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};

use inkcheck_config::LlmConfig;
use openai_backend::OpenAiBackend;

/// Providers accepted in `[llm] provider`.
pub const SUPPORTED_PROVIDERS: &[&str] = &["openai", "openai-compatible", "openrouter"];

/// Construct the backend named by `[llm] provider`.
///
/// # Errors
///
/// Returns `LlmError::Unsupported` for an unknown provider and
/// `LlmError::Misconfiguration` when the API key is missing.
pub fn from_config(config: &LlmConfig) -> Result<Box<dyn LlmBackend>, LlmError> {
    match config.provider.as_str() {
        "openai" | "openai-compatible" | "openrouter" => {
            Ok(Box::new(OpenAiBackend::new_from_config(config)?))
        }
        other => Err(LlmError::Unsupported(format!(
            "unknown LLM provider '{other}' (supported: {})",
            SUPPORTED_PROVIDERS.join(", ")
        ))),
    }
}

/// Redact credentials from text destined for logs.
#[must_use]
pub fn redact(message: &str) -> String {
    http_client::redact_error_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_unknown_provider_is_unsupported() {
        let config = LlmConfig {
            provider: "claude-cli".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            from_config(&config).err(),
            Some(LlmError::Unsupported(_))
        ));
    }

    #[test]
    #[serial]
    fn test_openai_provider_constructs_with_key() {
        let config = LlmConfig {
            api_key_env: "INKCHECK_TEST_PRESENT_KEY".to_string(),
            ..LlmConfig::default()
        };
        // SAFETY: serialized with other tests touching the environment
        unsafe { std::env::set_var("INKCHECK_TEST_PRESENT_KEY", "sk-test") };
        let backend = from_config(&config);
        unsafe { std::env::remove_var("INKCHECK_TEST_PRESENT_KEY") };
        assert!(backend.is_ok());
    }
}
