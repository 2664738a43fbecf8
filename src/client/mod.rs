//! Publisher client.
//!
//! [`create_client`] resolves credentials and binds a [`PublisherClient`] to a
//! backend. [`PublisherClient::publish`] serializes a payload and submits it,
//! waiting for the backend's acknowledgement before returning.
//!
//! Each call submits the payload exactly once. Nothing is retried; a caller
//! that re-submits after a failure may produce a duplicate unless the envelope
//! carries an idempotency key that downstream consumers honour.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::auth::{resolve_required, Credentials, CredentialsProvider};
use crate::backend::rest::RestBackend;
use crate::backend::PublishBackend;
use crate::config::PubsubConfig;
use crate::metrics::METRICS;
use crate::types::validation::{validate_message_size, PUBSUB_MAX_MESSAGE_SIZE};
use crate::types::{OutgoingMessage, TopicPath};
use crate::{Error, Result};

/// Default per-publish timeout.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where published messages go.
#[derive(Clone)]
pub enum BackendTarget {
    /// Pub/Sub REST endpoint.
    Rest {
        /// Endpoint base URL or `host:port`.
        endpoint: String,
    },
    /// A ready-made backend (in-memory, test stubs).
    Custom(Arc<dyn PublishBackend>),
}

/// Client behaviour options.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Upper bound for a single publish call.
    pub timeout: Duration,
    /// Attach an idempotency key attribute to payloads passed to `publish`.
    pub attach_idempotency_key: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PUBLISH_TIMEOUT,
            attach_idempotency_key: false,
        }
    }
}

impl From<&PubsubConfig> for ClientOptions {
    fn from(config: &PubsubConfig) -> Self {
        Self {
            timeout: config.timeout(),
            attach_idempotency_key: config.attach_idempotency_key,
        }
    }
}

/// Resolve credentials and construct a publisher client.
pub async fn create_client(
    provider: &dyn CredentialsProvider,
    target: BackendTarget,
    options: ClientOptions,
) -> Result<PublisherClient> {
    let credentials = resolve_required(provider).await.map_err(|e| {
        error!("Error creating publisher client: {}", e);
        e
    })?;

    match credentials.project_id() {
        Some(project) => info!("Using credentials for project: {}", project),
        None => info!("Using credentials without an associated project"),
    }

    let backend: Arc<dyn PublishBackend> = match target {
        BackendTarget::Rest { endpoint } => {
            let backend = RestBackend::new(&endpoint, &credentials).map_err(|e| {
                error!("Error creating publisher client: {}", e);
                match e {
                    Error::ClientConstruction(_) => e,
                    other => Error::ClientConstruction(other.to_string()),
                }
            })?;
            debug!("REST backend bound to {}", backend.endpoint());
            Arc::new(backend)
        }
        BackendTarget::Custom(backend) => backend,
    };

    if options.timeout.is_zero() {
        return Err(Error::ClientConstruction(
            "publish timeout must be greater than zero".to_string(),
        ));
    }

    info!("Successfully created publisher client ({} backend)", backend.name());

    Ok(PublisherClient {
        backend,
        credentials,
        options,
    })
}

/// Handle for publishing to topics.
///
/// Holds no mutable state; safe to reuse for sequential publishes.
pub struct PublisherClient {
    backend: Arc<dyn PublishBackend>,
    credentials: Credentials,
    options: ClientOptions,
}

impl PublisherClient {
    /// Build a topic address.
    pub fn topic_path(&self, project_id: &str, topic_id: &str) -> Result<TopicPath> {
        TopicPath::new(project_id, topic_id)
    }

    /// Credentials the client was built with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Client options.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Serialize `payload` as UTF-8 JSON and publish it.
    ///
    /// Returns the backend assigned message ID.
    pub async fn publish<T: Serialize + ?Sized>(&self, topic: &TopicPath, payload: &T) -> Result<String> {
        let mut message = OutgoingMessage::from_json(payload).map_err(|e| {
            error!("Error publishing message: {}", e);
            METRICS.record_error(&topic.to_string(), e.kind());
            e
        })?;
        if self.options.attach_idempotency_key {
            message = message.with_idempotency_key();
        }
        self.publish_message(topic, &message).await
    }

    /// Publish a prepared envelope.
    ///
    /// Re-submitting the same envelope keeps its attributes, including any
    /// idempotency key.
    pub async fn publish_message(&self, topic: &TopicPath, message: &OutgoingMessage) -> Result<String> {
        let topic_name = topic.to_string();
        let result = self.submit(topic, message).await;

        match &result {
            Ok(message_id) => info!("Message published successfully. ID: {}", message_id),
            Err(e) => {
                error!("Error publishing message to {}: {}", topic_name, e);
                METRICS.record_error(&topic_name, e.kind());
            }
        }

        result
    }

    async fn submit(&self, topic: &TopicPath, message: &OutgoingMessage) -> Result<String> {
        validate_message_size(message.len(), PUBSUB_MAX_MESSAGE_SIZE)?;

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.options.timeout, self.backend.publish(topic, message)).await;

        let message_id = match outcome {
            Err(_) => {
                return Err(Error::Publish(format!(
                    "No acknowledgement from {} within {:?}",
                    topic, self.options.timeout
                )))
            }
            Ok(Err(Error::Publish(reason))) => return Err(Error::Publish(reason)),
            Ok(Err(other)) => return Err(Error::Publish(other.to_string())),
            Ok(Ok(message_id)) => message_id,
        };

        if message_id.is_empty() {
            return Err(Error::Publish(format!(
                "Backend returned an empty message ID for {}",
                topic
            )));
        }

        METRICS.record_published(
            &topic.to_string(),
            self.backend.name(),
            start.elapsed().as_secs_f64(),
        );
        Ok(message_id)
    }
}
