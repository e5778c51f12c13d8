//! CLI command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::dialogue::{DialogueDriver, Episode, Turn, Variant};
use crate::llm::{build_provider, OllamaClient};

/// Formats accepted by `run --export`
pub const EXPORT_FORMATS: [&str; 3] = ["txt", "json", "md"];

/// Per-run overrides collected from `banter run`
#[derive(Debug, Default)]
pub struct RunOptions {
    pub topic: Option<String>,
    pub iterations: Option<u32>,
    pub max_turns: Option<u32>,
    pub variant: Option<Variant>,
    pub history_pairs: Option<usize>,
    pub export: Option<PathBuf>,
    pub format: String,
}

impl RunOptions {
    /// Settings for this run with the command-line overrides applied.
    pub fn apply(&self, settings: &Settings) -> Settings {
        let mut settings = settings.clone();
        let dialogue = &mut settings.dialogue;

        if let Some(topic) = &self.topic {
            dialogue.topic = topic.clone();
        }
        if let Some(iterations) = self.iterations {
            dialogue.iterations = iterations;
        }
        if let Some(max_turns) = self.max_turns {
            dialogue.max_turns = max_turns;
        }
        if let Some(variant) = self.variant {
            dialogue.variant = variant;
        }
        if let Some(history_pairs) = self.history_pairs {
            dialogue.history_pairs = history_pairs;
        }

        settings
    }
}

/// Run one episode, printing it as it happens
pub async fn run_dialogue(settings: &Settings, options: RunOptions) -> Result<()> {
    if options.export.is_some() && !EXPORT_FORMATS.contains(&options.format.as_str()) {
        anyhow::bail!(
            "Unsupported format: {}. Supported: {}",
            options.format,
            EXPORT_FORMATS.join(", ")
        );
    }

    let settings = options.apply(settings);
    let provider = build_provider(&settings)?;

    let episode = {
        let stdout = std::io::stdout();
        let mut driver = DialogueDriver::new(provider.as_ref(), &settings, stdout.lock());
        driver.run().await?
    };

    if let Some(path) = options.export {
        let content = render_export(&episode, &options.format)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write export: {}", path.display()))?;
        println!(
            "Episode {} exported to: {}",
            episode.short_id(),
            path.display()
        );
    }

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct DoctorModel {
    role: &'static str,
    model: String,
    status: &'static str,
}

#[derive(Serialize)]
struct DoctorReport {
    endpoint: String,
    reachable: bool,
    models: Vec<DoctorModel>,
    notes: Vec<String>,
}

/// Check the inference server and the configured models.
pub async fn run_doctor(settings: &Settings, json: bool) -> Result<()> {
    let report = collect_doctor_report(settings).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("banter doctor");
    println!("endpoint: {}", report.endpoint);
    println!(
        "server:   {}",
        if report.reachable { "ok" } else { "unreachable" }
    );
    println!();

    for model in &report.models {
        println!("{:<12} {:<10} {}", model.role, model.status, model.model);
    }

    if !report.notes.is_empty() {
        println!();
        for note in &report.notes {
            println!("{}", note);
        }
    }

    Ok(())
}

async fn collect_doctor_report(settings: &Settings) -> Result<DoctorReport> {
    let client = OllamaClient::from_settings(settings)?;
    let roles = [
        ("host", &settings.host),
        ("guest", &settings.guest),
        ("summarizer", &settings.summarizer),
    ];

    let mut notes = Vec::new();
    let installed = match client.list_models().await {
        Ok(models) => Some(models),
        Err(e) => {
            notes.push(format!("error: {:#}", e));
            notes.push("hint: start the server with `ollama serve` or set llm.endpoint.".to_string());
            None
        }
    };

    let models: Vec<DoctorModel> = roles
        .into_iter()
        .map(|(role, config)| {
            let status = match &installed {
                Some(models) if models.iter().any(|m| m.matches(&config.model)) => "ok",
                Some(_) => "missing",
                None => "unknown",
            };
            if status == "missing" {
                notes.push(format!("hint: run `ollama pull {}`", config.model));
            }
            DoctorModel {
                role,
                model: config.model.clone(),
                status,
            }
        })
        .collect();

    Ok(DoctorReport {
        endpoint: client.endpoint().to_string(),
        reachable: installed.is_some(),
        models,
        notes,
    })
}

// Helper functions

fn render_export(episode: &Episode, format: &str) -> Result<String> {
    Ok(match format {
        "txt" => export_as_txt(episode),
        "json" => export_as_json(episode)?,
        "md" => export_as_markdown(episode),
        _ => anyhow::bail!(
            "Unsupported format: {}. Supported: {}",
            format,
            EXPORT_FORMATS.join(", ")
        ),
    })
}

fn export_as_txt(episode: &Episode) -> String {
    let mut output = String::new();
    output.push_str(&format!("Topic: {}\n", episode.topic));
    output.push_str(&format!(
        "Date: {}\n",
        episode.created_at.format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!("Variant: {}\n", episode.variant));
    output.push_str("\n---\n\n");

    output.push_str(&episode.transcript.render(episode.speakers()));
    output.push_str("\n\n---\n\nSummary:\n");
    output.push_str(&episode.summary);
    output.push('\n');

    output
}

fn export_as_markdown(episode: &Episode) -> String {
    let speakers = episode.speakers();
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", episode.topic));
    output.push_str(&format!(
        "_{} with {}, {}_\n\n",
        episode.host,
        episode.guest,
        episode.created_at.format("%Y-%m-%d %H:%M")
    ));

    let mut question_num = 0;
    for turn in episode.transcript.turns() {
        if let Turn::Question(_) = turn {
            question_num += 1;
            output.push_str(&format!("## Q{}\n\n", question_num));
        }
        output.push_str(&format!("**{}:** {}\n\n", speakers.label(turn), turn.text()));
    }

    output.push_str("## Summary\n\n");
    output.push_str(&episode.summary);
    output.push('\n');

    output
}

fn export_as_json(episode: &Episode) -> Result<String> {
    Ok(serde_json::to_string_pretty(episode)?)
}
