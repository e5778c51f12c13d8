//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::dialogue::Variant;

/// banter - A two-persona podcast staged between local language models
#[derive(Parser, Debug)]
#[command(name = "banter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a podcast episode and print its summary
    Run {
        /// Topic to discuss (overrides dialogue.topic)
        #[arg(short, long)]
        topic: Option<String>,

        /// Question/answer rounds to attempt (overrides dialogue.iterations)
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Hard ceiling on counted turns (overrides dialogue.max_turns)
        #[arg(long)]
        max_turns: Option<u32>,

        /// Dialogue flavour (overrides dialogue.variant)
        #[arg(long, value_enum)]
        variant: Option<Variant>,

        /// Q/A pairs the host sees as context (overrides dialogue.history_pairs)
        #[arg(long)]
        history_pairs: Option<usize>,

        /// Write the finished episode to this file
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Export format (txt, json, md)
        #[arg(short, long, default_value = "txt")]
        format: String,
    },

    /// Check that the inference server and configured models are available
    Doctor {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
