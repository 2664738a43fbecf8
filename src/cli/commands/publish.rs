// Publish command implementation
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::auth::{
    default_provider, Credentials, CredentialsProvider, StaticCredentialsProvider,
    EMULATOR_HOST_ENV,
};
use crate::backend::memory::InMemoryBackend;
use crate::cli::output::*;
use crate::cli::PublishArgs;
use crate::client::BackendTarget;
use crate::config::PublisherConfig;
use crate::metrics::gather_metrics;
use crate::pipeline;

fn emulator_host() -> Option<String> {
    std::env::var(EMULATOR_HOST_ENV)
        .ok()
        .filter(|host| !host.trim().is_empty())
}

/// Apply command-line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut PublisherConfig, args: &PublishArgs) {
    let pubsub = &mut config.pubsub;

    if let Some(project_id) = &args.project_id {
        pubsub.project_id = project_id.clone();
    }
    if let Some(topic_id) = &args.topic_id {
        pubsub.topic_id = topic_id.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        pubsub.endpoint = endpoint.clone();
    } else if let Some(host) = emulator_host() {
        pubsub.endpoint = host;
    }
    if let Some(count) = args.count {
        pubsub.message_count = count;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        pubsub.timeout_secs = timeout_secs;
    }
    if args.idempotency_key {
        pubsub.attach_idempotency_key = true;
    }
}

/// Execute the publish command
pub async fn execute(args: PublishArgs, mut config: PublisherConfig) -> Result<()> {
    apply_overrides(&mut config, &args);

    let (provider, target): (Box<dyn CredentialsProvider>, BackendTarget) = if args.dry_run {
        info!("Dry run: publishing to the in-memory backend");
        report(Status::Info, "Dry run: messages are kept in memory and not sent anywhere");
        (
            Box::new(StaticCredentialsProvider::new(Credentials::anonymous(None))),
            BackendTarget::Custom(Arc::new(InMemoryBackend::new())),
        )
    } else {
        let emulator = !config.pubsub.targets_google() && emulator_host().is_some();
        info!(
            "Resolving credentials from {}",
            if emulator { "the emulator environment" } else { "application default credentials" }
        );
        (
            default_provider(emulator),
            BackendTarget::Rest {
                endpoint: config.pubsub.endpoint.clone(),
            },
        )
    };

    let result = pipeline::run(&config, provider.as_ref(), target).await;

    if args.print_metrics {
        println!("{}", gather_metrics());
    }

    match result {
        Ok(published) => {
            let topic = format!(
                "projects/{}/topics/{}",
                config.pubsub.project_id, config.pubsub.topic_id
            );
            println!("{}", render_publish_summary(&topic, &published, args.format)?);
            Ok(())
        }
        Err(e) => {
            report(Status::Failure, &e.to_string());
            Err(anyhow::Error::new(e).context("Publish run failed"))
        }
    }
}
