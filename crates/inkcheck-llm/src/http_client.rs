//! Shared HTTP client for HTTP-based LLM providers
//!
//! One `reqwest::Client` is built per backend and reused across invocations,
//! with the timeout and retry policy applied here rather than in callers.

use inkcheck_utils::error::LlmError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on any single request, whatever the caller asks for
const DEFAULT_MAX_HTTP_TIMEOUT: Duration = Duration::from_secs(600);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries for 5xx and network failures (not 4xx, not timeouts)
const MAX_RETRIES: u32 = 2;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Arc<Client>,
    max_timeout: Duration,
    initial_backoff: Duration,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the client cannot be constructed
    pub fn new() -> Result<Self, LlmError> {
        Self::with_max_timeout(DEFAULT_MAX_HTTP_TIMEOUT)
    }

    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the client cannot be constructed
    pub fn with_max_timeout(max_timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| {
                LlmError::Misconfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client: Arc::new(client),
            max_timeout,
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    #[cfg(test)]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Execute a request with timeout and retry policy
    ///
    /// - per-request timeout: `min(request_timeout, max_timeout)`
    /// - up to 2 retries for 5xx and network failures, linear backoff
    /// - 4xx and timeouts are returned immediately
    ///
    /// # Errors
    ///
    /// - `LlmError::ProviderAuth` for 401/403
    /// - `LlmError::ProviderQuota` for 429
    /// - `LlmError::ProviderOutage` for 5xx after retries
    /// - `LlmError::Timeout` for timeouts
    /// - `LlmError::Transport` for other failures
    pub async fn execute_with_retry(
        &self,
        request_builder: reqwest::RequestBuilder,
        request_timeout: Duration,
        provider_name: &str,
    ) -> Result<Response, LlmError> {
        let effective_timeout = request_timeout.min(self.max_timeout);

        let mut attempt = 0;

        loop {
            attempt += 1;

            let request = request_builder
                .try_clone()
                .ok_or_else(|| LlmError::Transport("Failed to clone request for retry".to_string()))?
                .timeout(effective_timeout)
                .build()
                .map_err(|e| LlmError::Transport(format!("Failed to build request: {e}")))?;

            debug!(
                provider = provider_name,
                attempt = attempt,
                timeout_secs = effective_timeout.as_secs(),
                "Executing HTTP request"
            );

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_client_error() {
                        return Err(map_client_error(status, provider_name));
                    }

                    if status.is_server_error() {
                        if attempt <= MAX_RETRIES {
                            warn!(
                                provider = provider_name,
                                attempt = attempt,
                                status = status.as_u16(),
                                "Server error, will retry"
                            );
                            tokio::time::sleep(self.initial_backoff * attempt).await;
                            continue;
                        }

                        return Err(LlmError::ProviderOutage(format!(
                            "{provider_name} returned server error: {status}"
                        )));
                    }

                    return Ok(response);
                }
                Err(e) => {
                    if e.is_timeout() {
                        return Err(LlmError::Timeout {
                            duration: effective_timeout,
                        });
                    }

                    let message = redact_error_message(&e.to_string());

                    if attempt <= MAX_RETRIES {
                        warn!(
                            provider = provider_name,
                            attempt = attempt,
                            error = %message,
                            "Network error, will retry"
                        );
                        tokio::time::sleep(self.initial_backoff * attempt).await;
                        continue;
                    }

                    return Err(LlmError::Transport(format!(
                        "{provider_name} request failed: {message}"
                    )));
                }
            }
        }
    }
}

/// Map 4xx status codes to `LlmError` variants
fn map_client_error(status: StatusCode, provider_name: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::ProviderAuth(format!("{provider_name} authentication failed: {status}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            LlmError::ProviderQuota(format!("{provider_name} rate limit exceeded: {status}"))
        }
        _ => LlmError::Transport(format!("{provider_name} returned client error: {status}")),
    }
}

/// URLs with embedded credentials
static URL_WITH_CREDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(https?://)[^:@\s/]+:[^@\s]+@").expect("static pattern"));

/// Bearer tokens in echoed headers
static BEARER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(bearer\s+)[A-Za-z0-9._~+/=-]+").expect("static pattern"));

/// Long key-like runs (`sk-...` and similar)
static POTENTIAL_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9_-]{32,}").expect("static pattern"));

/// Strip credentials from a message before it is logged or returned.
pub(crate) fn redact_error_message(message: &str) -> String {
    let redacted = URL_WITH_CREDS.replace_all(message, "$1[REDACTED]@");
    let redacted = BEARER_TOKEN.replace_all(&redacted, "$1[REDACTED]");
    let redacted = POTENTIAL_KEY.replace_all(&redacted, "[REDACTED_KEY]");
    redacted.into_owned()
}
