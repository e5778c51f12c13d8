//! banter - A two-persona podcast staged between local language models
//!
//! Entry point for the banter CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use banter::cli::commands::RunOptions;
use banter::cli::{Cli, Commands};
use banter::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Completions { shell } => {
            banter::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            match command {
                Commands::Run {
                    topic,
                    iterations,
                    max_turns,
                    variant,
                    history_pairs,
                    export,
                    format,
                } => {
                    let options = RunOptions {
                        topic,
                        iterations,
                        max_turns,
                        variant,
                        history_pairs,
                        export,
                        format,
                    };
                    banter::cli::commands::run_dialogue(&settings, options).await?;
                }
                Commands::Doctor { json } => {
                    banter::cli::commands::run_doctor(&settings, json).await?;
                }
                Commands::Config(config_cmd) => {
                    banter::cli::commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
