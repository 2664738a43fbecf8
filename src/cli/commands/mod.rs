// Commands module
/// Publish command implementation
pub mod publish;

use crate::cli::output::*;
use crate::cli::Commands;
use crate::config::PublisherConfig;
use crate::sample::{try_generate, SampleOptions};

/// Execute a CLI command; no subcommand means `publish` configured from the
/// environment.
pub async fn execute_command(command: Option<Commands>, config: PublisherConfig) -> anyhow::Result<()> {
    match Commands::or_default(command)? {
        Commands::Publish(args) => publish::execute(args, config).await,
        Commands::Generate { count, format } => execute_generate(count, format, &config),
        Commands::Config { format } => execute_config(format, &config),
    }
}

fn execute_generate(count: i64, format: OutputFormat, config: &PublisherConfig) -> anyhow::Result<()> {
    let options = SampleOptions {
        source: config.pubsub.source.clone(),
        version: config.pubsub.version.clone(),
    };
    let messages = try_generate(count, &options)?;
    println!("{}", render_samples(&messages, format)?);
    Ok(())
}

fn execute_config(format: ConfigFormat, config: &PublisherConfig) -> anyhow::Result<()> {
    println!("{}", render_config(config, format)?);

    if let Err(e) = config.validate() {
        report(Status::Warning, &e.to_string());
    }
    Ok(())
}
