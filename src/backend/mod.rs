//! Publish backend traits and implementations.

use crate::types::{OutgoingMessage, TopicPath};
use crate::Result;
use async_trait::async_trait;

pub mod memory;
pub mod rest;

/// Messaging backend capability: accept a payload addressed to a topic and
/// return the identifier it assigned.
#[async_trait]
pub trait PublishBackend: Send + Sync {
    /// Submit a single message and wait for the backend's answer.
    async fn publish(&self, topic: &TopicPath, message: &OutgoingMessage) -> Result<String>;

    /// Backend name, used in logs and metrics.
    fn name(&self) -> &'static str;
}
