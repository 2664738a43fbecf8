//! Common data types for pubsub-publisher.

pub mod validation;

use crate::error::{Error, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use validation::validate_topic_id;

/// Attribute key carrying a client generated idempotency key.
pub const IDEMPOTENCY_KEY_ATTRIBUTE: &str = "idempotency_key";

/// Fully qualified topic address: `projects/{project}/topics/{topic}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicPath {
    project_id: String,
    topic_id: String,
}

impl TopicPath {
    /// Build a topic path from its parts.
    ///
    /// The topic ID is validated against the Pub/Sub naming rules. The project
    /// ID only has to be non-empty: emulators accept arbitrary project names.
    pub fn new(project_id: impl Into<String>, topic_id: impl Into<String>) -> Result<Self> {
        let project_id = project_id.into();
        let topic_id = topic_id.into();

        if project_id.is_empty() || project_id.contains('/') {
            return Err(ValidationError::InvalidProjectId(format!(
                "Project ID must be non-empty and must not contain '/': '{}'",
                project_id
            ))
            .into());
        }
        validate_topic_id(&topic_id)?;

        Ok(Self { project_id, topic_id })
    }

    /// Parse a `projects/{project}/topics/{topic}` string.
    pub fn parse(name: &str) -> Result<Self> {
        let parts: Vec<&str> = name.split('/').collect();

        if parts.len() != 4 || parts[0] != "projects" || parts[2] != "topics" {
            return Err(Error::Validation(ValidationError::InvalidParameter {
                name: "topic_path".to_string(),
                reason: format!("Invalid topic path format: {}", name),
            }));
        }

        Self::new(parts[1], parts[3])
    }

    /// The project ID.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The topic ID.
    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }
}

impl fmt::Display for TopicPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projects/{}/topics/{}", self.project_id, self.topic_id)
    }
}

/// Envelope handed to a publish backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Payload bytes (UTF-8 JSON for structured payloads).
    pub data: Vec<u8>,
    /// String attributes sent alongside the payload.
    pub attributes: HashMap<String, String>,
}

impl OutgoingMessage {
    /// Wrap raw payload bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            attributes: HashMap::new(),
        }
    }

    /// Serialize a payload to UTF-8 JSON bytes.
    pub fn from_json<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        let data = serde_json::to_vec(payload)?;
        Ok(Self::new(data))
    }

    /// Add a string attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Attach a random idempotency key, letting receivers drop duplicates
    /// when the same envelope is submitted again.
    pub fn with_idempotency_key(self) -> Self {
        self.with_attribute(IDEMPOTENCY_KEY_ATTRIBUTE, Uuid::new_v4().to_string())
    }

    /// The attached idempotency key, if any.
    pub fn idempotency_key(&self) -> Option<&str> {
        self.attributes.get(IDEMPOTENCY_KEY_ATTRIBUTE).map(String::as_str)
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
