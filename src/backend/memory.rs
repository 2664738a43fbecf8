//! In-memory publish backend.
//!
//! Records accepted messages per topic and assigns incrementing numeric IDs,
//! the same shape real Pub/Sub message IDs have. Used for dry runs and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::PublishBackend;
use crate::types::{OutgoingMessage, TopicPath};
use crate::{Error, Result};

/// A message accepted by the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    /// Assigned message ID.
    pub message_id: String,
    /// The accepted envelope.
    pub message: OutgoingMessage,
}

/// In-memory publish backend.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    inner: Arc<InMemoryBackendInner>,
}

#[derive(Default)]
struct InMemoryBackendInner {
    /// Accepted messages keyed by rendered topic path.
    topics: RwLock<HashMap<String, Vec<StoredMessage>>>,
    /// When set, only these topics accept messages.
    known_topics: Option<Vec<TopicPath>>,
    next_id: AtomicU64,
}

impl InMemoryBackend {
    /// Backend accepting messages for any topic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend accepting messages only for the listed topics.
    pub fn with_topics(topics: impl IntoIterator<Item = TopicPath>) -> Self {
        Self {
            inner: Arc::new(InMemoryBackendInner {
                known_topics: Some(topics.into_iter().collect()),
                ..Default::default()
            }),
        }
    }

    /// Messages accepted for a topic, in submission order.
    pub async fn messages(&self, topic: &TopicPath) -> Vec<StoredMessage> {
        let topics = self.inner.topics.read().await;
        topics.get(&topic.to_string()).cloned().unwrap_or_default()
    }

    /// Total number of accepted messages across all topics.
    pub async fn message_count(&self) -> usize {
        let topics = self.inner.topics.read().await;
        topics.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl PublishBackend for InMemoryBackend {
    async fn publish(&self, topic: &TopicPath, message: &OutgoingMessage) -> Result<String> {
        if let Some(known) = &self.inner.known_topics {
            if !known.contains(topic) {
                return Err(Error::Publish(format!("Topic not found: {}", topic)));
            }
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let message_id = id.to_string();

        let mut topics = self.inner.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_default()
            .push(StoredMessage {
                message_id: message_id.clone(),
                message: message.clone(),
            });

        debug!("In-memory publish to {} assigned {}", topic, message_id);
        Ok(message_id)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_assigns_incrementing_ids() {
        let backend = InMemoryBackend::new();
        let topic = TopicPath::new("local-project", "orders").unwrap();

        let first = backend.publish(&topic, &OutgoingMessage::new("a")).await.unwrap();
        let second = backend.publish(&topic, &OutgoingMessage::new("b")).await.unwrap();
        assert_eq!(first, "1");
        assert_eq!(second, "2");

        let stored = backend.messages(&topic).await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].message.data, b"a");
        assert_eq!(stored[1].message_id, "2");
        assert_eq!(backend.message_count().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_topic_rejected() {
        let known = TopicPath::new("local-project", "orders").unwrap();
        let other = TopicPath::new("local-project", "payments").unwrap();
        let backend = InMemoryBackend::with_topics([known.clone()]);

        assert!(backend.publish(&known, &OutgoingMessage::new("a")).await.is_ok());
        let err = backend.publish(&other, &OutgoingMessage::new("b")).await.unwrap_err();
        assert!(matches!(err, Error::Publish(_)));
        assert!(backend.messages(&other).await.is_empty());
    }
}
