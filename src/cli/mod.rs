// CLI module for pubsub-publisher
/// Command execution handlers
pub mod commands;
/// Output formatting utilities
pub mod output;

use std::path::PathBuf;

use clap::{Args, Command, FromArgMatches, Parser, Subcommand};

use crate::cli::output::{ConfigFormat, OutputFormat};
use crate::config::{LogFormat, PublisherConfig};

/// Command-line interface for pubsub-publisher
#[derive(Parser)]
#[command(name = "pubsub-publisher")]
#[command(author, version, about = "Publish JSON messages to a GCP Pub/Sub compatible topic", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, short, global = true, env = "PUBSUB_PUBLISHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (overrides the config file)
    #[arg(long, global = true, env = "PUBSUB_PUBLISHER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format (overrides the config file)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Publish sample messages to a topic (default)
    Publish(PublishArgs),

    /// Print generated sample messages without publishing
    Generate {
        /// Number of messages to generate
        #[arg(long, short = 'n', default_value = "5", allow_hyphen_values = true)]
        count: i64,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Show the effective configuration
    Config {
        /// Output format
        #[arg(long, short, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
}

/// Arguments for the publish command
#[derive(Args, Debug, Clone, Default)]
pub struct PublishArgs {
    /// Project ID
    #[arg(long, env = "PUBSUB_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Topic ID
    #[arg(long, env = "PUBSUB_TOPIC_ID")]
    pub topic_id: Option<String>,

    /// Pub/Sub REST endpoint
    #[arg(long, env = "PUBSUB_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Number of sample messages to publish
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Per-publish timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Attach an idempotency key attribute to every message
    #[arg(long)]
    pub idempotency_key: bool,

    /// Publish to an in-memory backend instead of the network
    #[arg(long)]
    pub dry_run: bool,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    pub print_metrics: bool,

    /// Output format for the result summary
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl PublishArgs {
    /// Arguments for a bare invocation, read from the environment.
    ///
    /// Goes through clap so the `env` attributes and defaults apply exactly as
    /// they do for an explicit `publish` subcommand.
    pub fn from_env() -> Result<Self, clap::Error> {
        let matches = Self::augment_args(Command::new("publish")).try_get_matches_from(["publish"])?;
        Self::from_arg_matches(&matches)
    }
}

impl Commands {
    /// The given command, or `publish` configured from the environment.
    pub fn or_default(command: Option<Commands>) -> Result<Commands, clap::Error> {
        match command {
            Some(command) => Ok(command),
            None => Ok(Commands::Publish(PublishArgs::from_env()?)),
        }
    }
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Load the configuration file (or defaults) and apply global overrides.
    pub fn load_config(&self) -> crate::Result<PublisherConfig> {
        let mut config = match &self.config {
            Some(path) => PublisherConfig::from_file(path)?,
            None => PublisherConfig::default(),
        };

        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["pubsub-publisher"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_publish() {
        let cli = Cli::try_parse_from([
            "pubsub-publisher",
            "publish",
            "--project-id",
            "my-project",
            "--topic-id",
            "orders",
            "-n",
            "3",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Publish(args)) => {
                assert_eq!(args.project_id.as_deref(), Some("my-project"));
                assert_eq!(args.topic_id.as_deref(), Some("orders"));
                assert_eq!(args.count, Some(3));
                assert!(args.dry_run);
                assert!(!args.idempotency_key);
            }
            _ => panic!("expected publish command"),
        }
    }

    #[test]
    fn test_parse_generate_negative_count() {
        let cli = Cli::try_parse_from(["pubsub-publisher", "generate", "--count", "-1"]).unwrap();
        match cli.command {
            Some(Commands::Generate { count, .. }) => assert_eq!(count, -1),
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_load_config_overrides() {
        let cli = Cli::try_parse_from([
            "pubsub-publisher",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "config",
        ])
        .unwrap();
        let config = cli.load_config().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_formats_rejected() {
        assert!(Cli::try_parse_from(["pubsub-publisher", "--log-format", "xml", "config"]).is_err());
        assert!(Cli::try_parse_from(["pubsub-publisher", "generate", "--format", "yaml"]).is_err());
        assert!(Cli::try_parse_from(["pubsub-publisher", "publish", "-f", "csv"]).is_err());
        assert!(Cli::try_parse_from(["pubsub-publisher", "config", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_parse_formats() {
        let cli = Cli::try_parse_from(["pubsub-publisher", "generate", "-f", "table"]).unwrap();
        match cli.command {
            Some(Commands::Generate { format, .. }) => assert_eq!(format, OutputFormat::Table),
            _ => panic!("expected generate command"),
        }

        let cli = Cli::try_parse_from(["pubsub-publisher", "config"]).unwrap();
        match cli.command {
            Some(Commands::Config { format }) => assert_eq!(format, ConfigFormat::Toml),
            _ => panic!("expected config command"),
        }
    }

    #[test]
    fn test_bare_invocation_reads_environment() {
        // The only test touching these variables.
        std::env::set_var("PUBSUB_PROJECT_ID", "env-project");
        std::env::set_var("PUBSUB_TOPIC_ID", "env-topic");

        let cli = Cli::try_parse_from(["pubsub-publisher"]).unwrap();
        let command = Commands::or_default(cli.command);

        std::env::remove_var("PUBSUB_PROJECT_ID");
        std::env::remove_var("PUBSUB_TOPIC_ID");

        match command.unwrap() {
            Commands::Publish(args) => {
                assert_eq!(args.project_id.as_deref(), Some("env-project"));
                assert_eq!(args.topic_id.as_deref(), Some("env-topic"));
                assert_eq!(args.format, OutputFormat::Table);
                assert!(!args.dry_run);
            }
            _ => panic!("expected publish command"),
        }
    }
}
