use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::llm::client::{CompletionRequest, LlmProvider, RejectedRequest};

pub struct OllamaClient {
    http: Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let endpoint = settings.llm.endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            anyhow::bail!(
                "Ollama endpoint is missing. Set llm.endpoint in config or BANTER_OLLAMA_ENDPOINT."
            );
        }

        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(settings.llm.timeout_secs))
                .build()
                .context("Failed to build Ollama HTTP client")?,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.endpoint, path)
    }

    /// List the models installed on the server.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .http
            .get(self.request_url("tags"))
            .send()
            .await
            .with_context(|| format!("Could not reach Ollama at {}", self.endpoint))?;

        let response = response
            .error_for_status()
            .context("Ollama returned an error status")?;

        let payload: OllamaTagsResponse = response
            .json()
            .await
            .context("Failed to parse Ollama model list")?;

        Ok(payload.models)
    }
}

#[async_trait]
impl LlmProvider for OllamaClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String> {
        let body = OllamaChatRequest {
            model: request.model,
            messages: vec![OllamaMessage {
                role: "user",
                content: request.prompt,
            }],
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
            },
        };

        tracing::debug!(model = request.model, "Sending chat request");

        let response = self
            .http
            .post(self.request_url("chat"))
            .json(&body)
            .send()
            .await
            .context("Ollama request failed")?;

        let status = response.status();
        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| body.trim().to_string());
            return Err(anyhow::Error::new(RejectedRequest {
                status: status.as_u16(),
                message,
            })
            .context("Ollama returned an error status"));
        }

        let response = response
            .error_for_status()
            .context("Ollama returned an error status")?;

        let payload: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        let message = payload
            .message
            .context("Ollama response did not contain a message")?;

        Ok(message.content)
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessageResponse {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// An installed model as reported by `/api/tags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl ModelInfo {
    /// Whether this entry satisfies a configured model name.
    ///
    /// Ollama reports `llama3` as `llama3:latest`, so a bare name matches its
    /// `latest` tag.
    pub fn matches(&self, wanted: &str) -> bool {
        self.name == wanted || (!wanted.contains(':') && self.name == format!("{wanted}:latest"))
    }
}
