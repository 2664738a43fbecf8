//! Sample publishing run: validate configuration, build the client, generate
//! sample messages and publish them one at a time.

use serde::Serialize;
use tabled::Tabled;
use tracing::{error, info};

use crate::auth::CredentialsProvider;
use crate::client::{create_client, BackendTarget, ClientOptions};
use crate::config::PublisherConfig;
use crate::sample::{generate_with, SampleOptions};
use crate::Result;

/// Outcome of one published sample message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct PublishedMessage {
    /// Client side sample ID (`msg_001`, ...).
    pub sample_id: String,
    /// Backend assigned message ID.
    pub message_id: String,
}

/// Publish `config.pubsub.message_count` sample messages.
///
/// Stops at the first failure. Messages published before the failure stay
/// published.
pub async fn run(
    config: &PublisherConfig,
    provider: &dyn CredentialsProvider,
    target: BackendTarget,
) -> Result<Vec<PublishedMessage>> {
    let result = run_inner(config, provider, target).await;
    if let Err(e) = &result {
        error!("Error in main execution: {}", e);
    }
    result
}

async fn run_inner(
    config: &PublisherConfig,
    provider: &dyn CredentialsProvider,
    target: BackendTarget,
) -> Result<Vec<PublishedMessage>> {
    config.validate()?;
    let pubsub = &config.pubsub;

    let client = create_client(provider, target, ClientOptions::from(pubsub)).await?;

    let topic = client.topic_path(&pubsub.project_id, &pubsub.topic_id)?;
    info!("Publishing to topic: {}", topic);

    let options = SampleOptions {
        source: pubsub.source.clone(),
        version: pubsub.version.clone(),
    };
    let messages = generate_with(pubsub.message_count, &options);

    let mut published = Vec::with_capacity(messages.len());
    for message in &messages {
        let message_id = client.publish(&topic, message).await?;
        info!("Published: {}", message.message_id);
        published.push(PublishedMessage {
            sample_id: message.message_id.clone(),
            message_id,
        });
    }

    info!("All {} messages published successfully!", published.len());
    Ok(published)
}
