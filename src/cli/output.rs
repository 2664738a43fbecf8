// Terminal output for publish runs, generated samples and configuration
use clap::ValueEnum;
use colored::*;
use serde::Serialize;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::config::PublisherConfig;
use crate::pipeline::PublishedMessage;
use crate::sample::SampleMessage;

/// Output format for publish and generate results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Output format for the effective configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConfigFormat {
    /// TOML, loadable with `--config`
    #[default]
    Toml,
    /// Pretty-printed JSON
    Json,
}

/// Kind of a one-line status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Informational note
    Info,
    /// Non-fatal problem
    Warning,
    /// Failed run, written to stderr
    Failure,
}

/// Sample message flattened into one table row
#[derive(Debug, Serialize, Tabled)]
struct SampleRow {
    message_id: String,
    timestamp: String,
    content: String,
    source: String,
    version: String,
    sequence: u64,
}

impl From<&SampleMessage> for SampleRow {
    fn from(message: &SampleMessage) -> Self {
        Self {
            message_id: message.message_id.clone(),
            timestamp: message.timestamp.clone(),
            content: message.content.clone(),
            source: message.metadata.source.clone(),
            version: message.metadata.version.clone(),
            sequence: message.metadata.sequence,
        }
    }
}

/// Render the outcome of a publish run.
///
/// JSON output carries the topic and the ID pairs and nothing else, so it can
/// be piped into other tools.
pub fn render_publish_summary(
    topic: &str,
    published: &[PublishedMessage],
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "topic": topic,
            "published": published,
        }))?),
        OutputFormat::Table if published.is_empty() => {
            Ok(format!("{}", format!("No messages published to {}", topic).yellow()))
        }
        OutputFormat::Table => Ok(format!(
            "{}\n{} {}",
            Table::new(published),
            "✓".green().bold(),
            format!("Published {} message(s) to {}", published.len(), topic).green()
        )),
    }
}

/// Render generated sample messages.
pub fn render_samples(messages: &[SampleMessage], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(messages)?),
        OutputFormat::Table if messages.is_empty() => {
            Ok(format!("{}", "No messages generated".yellow()))
        }
        OutputFormat::Table => {
            let rows: Vec<SampleRow> = messages.iter().map(SampleRow::from).collect();
            Ok(Table::new(rows).to_string())
        }
    }
}

/// Render the effective configuration.
pub fn render_config(config: &PublisherConfig, format: ConfigFormat) -> anyhow::Result<String> {
    match format {
        ConfigFormat::Toml => Ok(config.to_toml()?),
        ConfigFormat::Json => Ok(serde_json::to_string_pretty(config)?),
    }
}

/// Format a status line with its marker.
pub fn status_line(status: Status, message: &str) -> String {
    match status {
        Status::Info => format!("{} {}", "ℹ".blue().bold(), message),
        Status::Warning => format!("{} {}", "⚠".yellow().bold(), message.yellow()),
        Status::Failure => format!("{} {}", "✗".red().bold(), message.red()),
    }
}

/// Print a status line; failures go to stderr.
pub fn report(status: Status, message: &str) {
    match status {
        Status::Failure => eprintln!("{}", status_line(status, message)),
        _ => println!("{}", status_line(status, message)),
    }
}
