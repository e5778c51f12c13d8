//! Configuration module for banter
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{DialogueSettings, LlmSettings, RoleSettings, Settings, ENDPOINT_ENV};
