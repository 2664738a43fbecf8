//! Pub/Sub REST backend.
//!
//! Publishes through `POST {endpoint}/v1/projects/{project}/topics/{topic}:publish`,
//! the JSON transcoding of the Pub/Sub `Publish` RPC. Works against the Google
//! endpoint as well as local emulators.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::backend::PublishBackend;
use crate::types::{OutgoingMessage, TopicPath};
use crate::{Error, Result};

/// Default Google Cloud Pub/Sub endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://pubsub.googleapis.com";

const CONNECT_TIMEOUT_SECONDS: u64 = 10;

// ============================================================================
// Wire Types
// ============================================================================

/// Request for publishing messages.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    /// Messages to publish.
    pub messages: Vec<PubsubMessage>,
}

/// A Pub/Sub message as sent on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubsubMessage {
    /// Message data (base64-encoded on the wire).
    #[serde(with = "base64")]
    pub data: Vec<u8>,
    /// Message attributes.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

/// Response for publishing messages.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    /// Message IDs assigned by the server.
    #[serde(default)]
    pub message_ids: Vec<String>,
}

/// Error body returned by Google Cloud APIs.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

mod base64 {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(serde::de::Error::custom)
    }
}

impl From<&OutgoingMessage> for PubsubMessage {
    fn from(message: &OutgoingMessage) -> Self {
        Self {
            data: message.data.clone(),
            attributes: message.attributes.clone(),
        }
    }
}

// ============================================================================
// Backend
// ============================================================================

/// REST publish backend.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl RestBackend {
    /// Create a backend for `endpoint` (e.g. `https://pubsub.googleapis.com`
    /// or `http://localhost:8085`).
    pub fn new(endpoint: &str, credentials: &Credentials) -> Result<Self> {
        let endpoint = normalize_endpoint(endpoint)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS))
            .user_agent(format!("pubsub-publisher/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ClientConstruction(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            access_token: credentials.access_token().map(str::to_string),
        })
    }

    /// The endpoint base URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// URL of the publish action for a topic.
    pub fn publish_url(&self, topic: &TopicPath) -> Result<Url> {
        self.endpoint
            .join(&format!("v1/{}:publish", topic))
            .map_err(|e| Error::Publish(format!("Invalid publish URL for {}: {}", topic, e)))
    }
}

/// Parse an endpoint, accepting a bare `host:port` as plain HTTP (the
/// `PUBSUB_EMULATOR_HOST` convention).
fn normalize_endpoint(endpoint: &str) -> Result<Url> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(Error::ClientConstruction("Endpoint must not be empty".to_string()));
    }

    let with_scheme = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };
    let with_slash = if with_scheme.ends_with('/') {
        with_scheme
    } else {
        format!("{}/", with_scheme)
    };

    let url = Url::parse(&with_slash)
        .map_err(|e| Error::ClientConstruction(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::ClientConstruction(format!(
            "Unsupported endpoint scheme: {}",
            other
        ))),
    }
}

#[async_trait]
impl PublishBackend for RestBackend {
    async fn publish(&self, topic: &TopicPath, message: &OutgoingMessage) -> Result<String> {
        let url = self.publish_url(topic)?;
        let body = PublishRequest {
            messages: vec![PubsubMessage::from(message)],
        };

        debug!("POST {} ({} bytes)", url, message.len());

        let mut request = self.client.post(url).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Publish(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => format!("{} {}", err.error.status, err.error.message),
                Err(_) => text,
            };
            warn!("Publish to {} rejected with status {}", topic, status);
            return Err(Error::Publish(format!(
                "Publish rejected with status {}: {}",
                status,
                detail.trim()
            )));
        }

        let published: PublishResponse = response
            .json()
            .await
            .map_err(|e| Error::Publish(format!("Failed to parse publish response: {}", e)))?;

        published
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| Error::Publish("Publish response contained no message ID".to_string()))
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}
