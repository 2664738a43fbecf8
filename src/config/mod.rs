//! Configuration system for pubsub-publisher.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::backend::rest::DEFAULT_ENDPOINT;
use crate::sample::{DEFAULT_SOURCE, DEFAULT_VERSION};
use crate::types::validation::{validate_project_id, validate_topic_id};
use crate::Error;

/// Project ID placeholder that must be replaced before publishing.
pub const PLACEHOLDER_PROJECT_ID: &str = "YOUR_PROJECT_ID";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Pub/Sub configuration.
    pub pubsub: PubsubConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Pub/Sub-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PubsubConfig {
    /// Project ID.
    pub project_id: String,
    /// Topic ID.
    pub topic_id: String,
    /// REST endpoint base URL.
    pub endpoint: String,
    /// Per-publish timeout in seconds.
    pub timeout_secs: u64,
    /// Number of sample messages to publish.
    pub message_count: usize,
    /// Attach an idempotency key attribute to every message.
    pub attach_idempotency_key: bool,
    /// Value for `metadata.source` in sample messages.
    pub source: String,
    /// Value for `metadata.version` in sample messages.
    pub version: String,
}

impl Default for PubsubConfig {
    fn default() -> Self {
        Self {
            project_id: PLACEHOLDER_PROJECT_ID.to_string(),
            topic_id: "my-example-topic".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            message_count: 5,
            attach_idempotency_key: false,
            source: DEFAULT_SOURCE.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl PubsubConfig {
    /// Per-publish timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether the endpoint is the Google Cloud Pub/Sub service.
    pub fn targets_google(&self) -> bool {
        self.endpoint.trim().trim_end_matches('/') == DEFAULT_ENDPOINT
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: String,
    /// Log format (text or json).
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log format enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text format.
    Text,
    /// JSON format.
    Json,
}

impl PublisherConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::InvalidConfiguration(format!("Failed to parse config: {}", e)))
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfiguration(format!("Failed to render config: {}", e)))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        let pubsub = &self.pubsub;

        if pubsub.project_id == PLACEHOLDER_PROJECT_ID {
            return Err(Error::InvalidConfiguration(format!(
                "project_id is still the placeholder '{}'; set it in the config file or PUBSUB_PROJECT_ID",
                PLACEHOLDER_PROJECT_ID
            )));
        }
        if pubsub.project_id.trim().is_empty() {
            return Err(Error::InvalidConfiguration("project_id must not be empty".to_string()));
        }
        if pubsub.project_id.contains('/') {
            return Err(Error::InvalidConfiguration(format!(
                "project_id '{}' must not contain '/'",
                pubsub.project_id
            )));
        }
        // Emulators accept any project name; Google enforces its ID rules.
        if pubsub.targets_google() {
            validate_project_id(&pubsub.project_id)
                .map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        }
        validate_topic_id(&pubsub.topic_id)
            .map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        if pubsub.endpoint.trim().is_empty() {
            return Err(Error::InvalidConfiguration("endpoint must not be empty".to_string()));
        }
        if pubsub.timeout_secs == 0 {
            return Err(Error::InvalidConfiguration(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
