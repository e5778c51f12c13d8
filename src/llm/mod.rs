//! LLM module for banter
//!
//! Talks to the inference server and builds the prompts each role receives.

mod client;
mod ollama;
pub mod prompts;

pub use client::{build_provider, is_retryable, CompletionRequest, LlmProvider, RejectedRequest};
pub use ollama::{ModelInfo, OllamaClient};
