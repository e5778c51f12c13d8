use anyhow::Result;
use async_trait::async_trait;

use crate::config::{RoleSettings, Settings};
use crate::llm::ollama::OllamaClient;

/// One prompt aimed at one model.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub temperature: f64,
    pub prompt: &'a str,
}

impl<'a> CompletionRequest<'a> {
    /// Bind a prompt to the model and temperature of a configured role.
    pub fn for_role(role: &'a RoleSettings, prompt: &'a str) -> Self {
        Self {
            model: &role.model,
            temperature: role.temperature,
            prompt,
        }
    }
}

/// The server refused the request itself, so sending it again cannot help.
///
/// Providers return this for 4xx replies such as an unknown model. Anything
/// else (transport errors, timeouts, 5xx) is treated as transient.
#[derive(Debug, thiserror::Error)]
#[error("request rejected with status {status}: {message}")]
pub struct RejectedRequest {
    pub status: u16,
    pub message: String,
}

/// Whether a failed completion is worth another attempt.
pub fn is_retryable(err: &anyhow::Error) -> bool {
    !err.chain().any(|cause| cause.is::<RejectedRequest>())
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a single-message prompt and return the raw reply text.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String>;
}

/// Build an LLM provider from runtime settings.
pub fn build_provider(settings: &Settings) -> Result<Box<dyn LlmProvider>> {
    match settings.llm.provider.to_lowercase().as_str() {
        "ollama" => Ok(Box::new(OllamaClient::from_settings(settings)?)),
        other => anyhow::bail!(
            "Unsupported llm.provider '{}'. Supported providers: ollama",
            other
        ),
    }
}
