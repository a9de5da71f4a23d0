//! Generation stage: categories and a prompt template in, contract sources out
//!
//! Every category is rendered into the prompt template and sent to the
//! model `contracts_per_category` times. Responses are unwrapped and written
//! to `<generated_dir>/<category>_<index>.rs`, which is exactly what
//! [`load_artifacts`](crate::artifact::load_artifacts) reads back.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use inkcheck_config::LlmConfig;
use inkcheck_llm::{LlmBackend, LlmError, LlmInvocation, Message, redact};
use inkcheck_utils::artifact_name::{ArtifactNameError, sanitize_artifact_name};
use inkcheck_utils::atomic_write::write_bytes_atomic;
use inkcheck_utils::error::{ConfigError, InkcheckError};
use tracing::{debug, info, warn};

use crate::artifact::SOURCE_EXTENSION;
use crate::unwrap::Unwrapper;

/// Produces raw contract text for a prompt.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns the provider's `LlmError` unchanged; nothing is retried here.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// [`SourceProvider`] backed by a chat-completion model.
pub struct LlmSourceProvider {
    backend: Box<dyn LlmBackend>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmSourceProvider {
    #[must_use]
    pub fn new(backend: Box<dyn LlmBackend>, config: &LlmConfig) -> Self {
        Self {
            backend,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.timeout(),
        }
    }

    /// # Errors
    ///
    /// Returns `LlmError::Unsupported` for an unknown provider and
    /// `LlmError::Misconfiguration` when the API key is not set.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self::new(inkcheck_llm::from_config(config)?, config))
    }
}

#[async_trait]
impl SourceProvider for LlmSourceProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let invocation = LlmInvocation::new(
            "generate",
            self.model.clone(),
            self.timeout,
            vec![Message::user(prompt)],
        )
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        let result = self.backend.invoke(invocation).await?;
        if result.truncated() {
            warn!(
                model = %result.model_used,
                max_tokens = self.max_tokens,
                "Response hit the token limit and is probably incomplete"
            );
        }
        debug!(
            model = %result.model_used,
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Received completion"
        );
        Ok(result.raw_response)
    }
}

/// Prompt text with a category placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
    placeholder: String,
}

impl PromptTemplate {
    #[must_use]
    pub fn new(text: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Replace every occurrence of the placeholder with `category`.
    #[must_use]
    pub fn render(&self, category: &str) -> String {
        self.text.replace(&self.placeholder, category)
    }

    #[must_use]
    pub fn has_placeholder(&self) -> bool {
        self.text.contains(&self.placeholder)
    }
}

/// Read the prompt template file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` when the file is missing and
/// `InkcheckError::Io` when it cannot be read.
pub fn load_prompt_template(path: &Path, placeholder: &str) -> Result<PromptTemplate, InkcheckError> {
    let template = PromptTemplate::new(read_input(path)?, placeholder);
    if !template.has_placeholder() {
        warn!(
            path = %path.display(),
            placeholder = %placeholder,
            "Prompt template has no category placeholder; every category gets the same prompt"
        );
    }
    Ok(template)
}

/// One category per line; whitespace trimmed, blank lines skipped, at most
/// `max` kept.
#[must_use]
pub fn parse_categories(text: &str, max: usize) -> Vec<String> {
    let mut categories: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if categories.len() > max {
        warn!(
            found = categories.len(),
            max_categories = max,
            "Category list truncated"
        );
        categories.truncate(max);
    }
    categories
}

/// Read and parse the categories file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` when the file is missing and
/// `InkcheckError::Io` when it cannot be read.
pub fn load_categories(path: &Path, max: usize) -> Result<Vec<String>, InkcheckError> {
    Ok(parse_categories(&read_input(path)?, max))
}

fn read_input(path: &Path) -> Result<String, InkcheckError> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.display().to_string(),
            }
            .into()
        } else {
            InkcheckError::Io(e)
        }
    })
}

/// A single contract to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedArtifact {
    pub category: String,
    pub index: usize,
    pub name: String,
    pub prompt: String,
}

/// The full list of requests for a generation run.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    entries: Vec<PlannedArtifact>,
}

impl GenerationPlan {
    /// Expand categories into named requests, `<category>_<index>` each.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactNameError` when a category cannot produce a safe file
    /// name. Checked up front so nothing is requested for a plan that would
    /// fail halfway.
    pub fn new(
        categories: &[String],
        template: &PromptTemplate,
        contracts_per_category: usize,
    ) -> Result<Self, ArtifactNameError> {
        let mut entries = Vec::with_capacity(categories.len() * contracts_per_category);
        let mut seen = HashSet::new();
        for category in categories {
            let prompt = template.render(category);
            for index in 0..contracts_per_category {
                let name = sanitize_artifact_name(&format!("{category}_{index}"))?;
                if !seen.insert(name.clone()) {
                    warn!(artifact = %name, category = %category, "Duplicate artifact name; later output overwrites earlier");
                }
                entries.push(PlannedArtifact {
                    category: category.clone(),
                    index,
                    name,
                    prompt: prompt.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[PlannedArtifact] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedGeneration {
    pub name: String,
    /// Redacted provider error
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub written: Vec<GeneratedArtifact>,
    pub failed: Vec<FailedGeneration>,
}

impl GenerationReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Request every planned artifact in order and write the unwrapped responses.
///
/// Transient provider errors (transport, quota, outage, timeout) are logged
/// and the artifact is skipped.
///
/// # Errors
///
/// - `InkcheckError::Llm` for a non-transient provider error such as bad
///   credentials, which would fail every remaining request the same way
/// - `InkcheckError::Persist` when a generated file cannot be written
pub async fn generate_batch<P: SourceProvider + ?Sized>(
    provider: &P,
    plan: &GenerationPlan,
    unwrapper: &Unwrapper,
    generated_dir: &Path,
) -> Result<GenerationReport, InkcheckError> {
    let mut report = GenerationReport::default();
    info!(
        count = plan.len(),
        dir = %generated_dir.display(),
        "Generating contracts"
    );

    for entry in plan.entries() {
        info!(artifact = %entry.name, category = %entry.category, "Requesting contract");
        let response = match provider.generate(&entry.prompt).await {
            Ok(text) => text,
            Err(e) if e.is_transient() => {
                let error = redact(&e.to_string());
                warn!(artifact = %entry.name, error = %error, "Generation failed, skipping");
                report.failed.push(FailedGeneration {
                    name: entry.name.clone(),
                    error,
                });
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let path = generated_dir.join(format!("{}.{SOURCE_EXTENSION}", entry.name));
        write_bytes_atomic(&path, unwrapper.unwrap(&response).as_bytes()).map_err(|e| {
            InkcheckError::Persist {
                path: path.display().to_string(),
                reason: format!("{e:#}"),
            }
        })?;
        debug!(artifact = %entry.name, path = %path.display(), "Wrote generated contract");
        report.written.push(GeneratedArtifact {
            name: entry.name.clone(),
            path,
        });
    }

    info!(
        written = report.written.len(),
        failed = report.failed.len(),
        "Generation complete"
    );
    Ok(report)
}
