//! OpenAI-compatible chat completions backend
//!
//! Works against api.openai.com and any server exposing the same
//! `/chat/completions` contract (OpenRouter, local gateways).

use crate::http_client::HttpClient;
use crate::types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};
use async_trait::async_trait;
use inkcheck_config::LlmConfig;
use inkcheck_utils::error::LlmError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const PROVIDER: &str = "openai";

#[derive(Clone)]
pub(crate) struct OpenAiBackend {
    client: Arc<HttpClient>,
    endpoint: String,
    api_key: String,
    default_model: String,
    default_params: HttpParams,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HttpParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for HttpParams {
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            temperature: 0.6,
        }
    }
}

/// `https://host/v1` -> `https://host/v1/chat/completions`
fn completions_endpoint(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/chat/completions")
    }
}

impl OpenAiBackend {
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the HTTP client cannot be constructed
    pub fn new(
        api_key: String,
        base_url: &str,
        default_model: String,
        default_params: HttpParams,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Arc::new(HttpClient::new()?),
            endpoint: completions_endpoint(base_url),
            api_key,
            default_model,
            default_params,
        })
    }

    #[cfg(test)]
    fn with_client(mut self, client: HttpClient) -> Self {
        self.client = Arc::new(client);
        self
    }

    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the API key variable is unset or
    /// empty, or the HTTP client cannot be constructed
    pub fn new_from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(LlmError::Misconfiguration(format!(
                    "API key not found in environment variable '{}'. \
                     Set it (a .env file is read) or change [llm] api_key_env.",
                    config.api_key_env
                )));
            }
        };

        Self::new(
            api_key,
            &config.base_url,
            config.model.clone(),
            HttpParams {
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            },
        )
    }

    /// Invocation values win over backend defaults.
    fn resolve_params(&self, inv: &LlmInvocation) -> (String, HttpParams) {
        let model = if inv.model.is_empty() {
            self.default_model.clone()
        } else {
            inv.model.clone()
        };

        let params = HttpParams {
            max_tokens: inv.max_tokens.unwrap_or(self.default_params.max_tokens),
            temperature: inv.temperature.unwrap_or(self.default_params.temperature),
        };

        (model, params)
    }

    fn convert_messages(messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|msg| OpenAiMessage {
                role: match msg.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: msg.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let (model, params) = self.resolve_params(&inv);

        debug!(
            provider = PROVIDER,
            label = %inv.label,
            model = %model,
            max_tokens = params.max_tokens,
            temperature = params.temperature,
            timeout_secs = inv.timeout.as_secs(),
            "Invoking chat completions"
        );

        let request_body = ChatRequest {
            model: model.clone(),
            messages: Self::convert_messages(&inv.messages),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream: false,
        };

        let request = self
            .client
            .client()
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body);

        let response = self
            .client
            .execute_with_retry(request, inv.timeout, PROVIDER)
            .await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to parse {PROVIDER} response: {e}")))?;

        let choice = body.choices.into_iter().next().ok_or_else(|| {
            LlmError::Transport(format!("{PROVIDER} response missing choices[0]"))
        })?;

        let content = choice.message.content.ok_or_else(|| {
            LlmError::Transport(format!("{PROVIDER} response missing content in choices[0]"))
        })?;

        let mut result = LlmResult::new(content, PROVIDER, body.model.unwrap_or(model));
        result.finish_reason = choice.finish_reason;
        if let Some(usage) = body.usage {
            result = result.with_tokens(usage.prompt_tokens, usage.completion_tokens);
        }

        debug!(
            provider = PROVIDER,
            label = %inv.label,
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            finish_reason = ?result.finish_reason,
            "Chat completion received"
        );

        Ok(result)
    }
}

#[derive(Debug, Clone, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
