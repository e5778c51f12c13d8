//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::dialogue::Variant;

/// Environment variable that overrides `llm.endpoint`.
pub const ENDPOINT_ENV: &str = "BANTER_OLLAMA_ENDPOINT";

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Inference server settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// The persona asking questions
    #[serde(default = "default_host", deserialize_with = "host_overlay")]
    pub host: RoleSettings,

    /// The persona answering them
    #[serde(default = "default_guest", deserialize_with = "guest_overlay")]
    pub guest: RoleSettings,

    /// The model writing the closing takeaways
    #[serde(default = "default_summarizer", deserialize_with = "summarizer_overlay")]
    pub summarizer: RoleSettings,

    /// Dialogue loop settings
    #[serde(default)]
    pub dialogue: DialogueSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (ollama)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Base URL of the inference server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How many times a failed model call is retried before the run aborts.
    /// Only transient failures are retried: connection errors, timeouts,
    /// 429 and 5xx replies. A 4xx such as an unknown model aborts at once.
    #[serde(default)]
    pub max_retries: u32,
}

/// One model role: who it plays and how it samples.
///
/// A `[host]`, `[guest]` or `[summarizer]` section only needs the keys it
/// changes; the rest come from that role's defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSettings {
    /// Display name used in prompts and transcript lines
    pub name: String,

    /// Model name on the inference server
    pub model: String,

    /// Sampling temperature
    pub temperature: f64,
}

/// The keys of a role section as written in the file.
#[derive(Debug, Deserialize)]
struct RoleOverlay {
    name: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
}

impl RoleOverlay {
    fn over(self, base: RoleSettings) -> RoleSettings {
        RoleSettings {
            name: self.name.unwrap_or(base.name),
            model: self.model.unwrap_or(base.model),
            temperature: self.temperature.unwrap_or(base.temperature),
        }
    }
}

fn host_overlay<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<RoleSettings, D::Error> {
    RoleOverlay::deserialize(d).map(|o| o.over(default_host()))
}

fn guest_overlay<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<RoleSettings, D::Error> {
    RoleOverlay::deserialize(d).map(|o| o.over(default_guest()))
}

fn summarizer_overlay<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<RoleSettings, D::Error> {
    RoleOverlay::deserialize(d).map(|o| o.over(default_summarizer()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSettings {
    /// What the podcast is about
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Question/answer rounds to attempt
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Hard ceiling on counted turns
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Question/answer pairs shown to the host as recent context
    #[serde(default = "default_history_pairs")]
    pub history_pairs: usize,

    /// Prompt style and turn accounting (plain, themed)
    #[serde(default)]
    pub variant: Variant,
}

// Default value functions

fn default_llm_provider() -> String {
    "ollama".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_host() -> RoleSettings {
    RoleSettings {
        name: "Sana".to_string(),
        model: "llama3.2:1b".to_string(),
        temperature: 0.7,
    }
}

fn default_guest() -> RoleSettings {
    RoleSettings {
        name: "Sara".to_string(),
        model: "phi3:mini".to_string(),
        temperature: 0.7,
    }
}

fn default_summarizer() -> RoleSettings {
    RoleSettings {
        name: "Summarizer".to_string(),
        model: "llama3.2:1b".to_string(),
        temperature: 0.3,
    }
}

fn default_topic() -> String {
    "Why Agile fails?".to_string()
}

fn default_iterations() -> u32 {
    5
}

fn default_max_turns() -> u32 {
    12
}

fn default_history_pairs() -> usize {
    2
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            iterations: default_iterations(),
            max_turns: default_max_turns(),
            history_pairs: default_history_pairs(),
            variant: Variant::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            host: default_host(),
            guest: default_guest(),
            summarizer: default_summarizer(),
            dialogue: DialogueSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        Self::load_from(&config_path)
    }

    /// Load settings from an explicit file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                self.llm.endpoint = endpoint;
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "banter", "banter")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &Path) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}
