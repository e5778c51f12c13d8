//! banter - A two-persona podcast staged between local language models
//!
//! A host model asks, a guest model answers, and a third model sums it all up.

pub mod cli;
pub mod config;
pub mod dialogue;
pub mod llm;

use thiserror::Error;

use crate::dialogue::Role;

/// Main error type for banter
#[derive(Error, Debug)]
pub enum BanterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{role} model call failed: {message}")]
    Inference { role: Role, message: String },

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BanterError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "banter";
