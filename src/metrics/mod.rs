//! Publish metrics using Prometheus.
//!
//! - **Counters**: messages published, publish failures by error kind
//! - **Histograms**: publish round trip latency

use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tracing::error;

/// Global metrics registry
static METRICS_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Global metrics instance
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    let metrics = Metrics::new();
    if let Err(e) = metrics.register(&METRICS_REGISTRY) {
        error!("Failed to register metrics: {}", e);
    }
    Arc::new(metrics)
});

/// Metrics collector for the publisher
pub struct Metrics {
    /// Messages accepted by the backend (counter)
    pub messages_published_total: IntCounterVec,
    /// Failed publish calls (counter)
    pub publish_errors_total: IntCounterVec,
    /// Publish round trip latency in seconds (histogram)
    pub publish_latency_seconds: HistogramVec,
}

impl Metrics {
    /// Create a new, unregistered Metrics instance
    pub fn new() -> Self {
        let messages_published_total = IntCounterVec::new(
            Opts::new(
                "pubsub_publisher_messages_published_total",
                "Total messages accepted by the backend",
            ),
            &["topic", "backend"],
        )
        .expect("Failed to create messages_published_total metric");

        let publish_errors_total = IntCounterVec::new(
            Opts::new(
                "pubsub_publisher_publish_errors_total",
                "Total failed publish calls",
            ),
            &["topic", "kind"],
        )
        .expect("Failed to create publish_errors_total metric");

        let publish_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "pubsub_publisher_publish_latency_seconds",
                "Publish round trip latency in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["topic", "backend"],
        )
        .expect("Failed to create publish_latency_seconds metric");

        Self {
            messages_published_total,
            publish_errors_total,
            publish_latency_seconds,
        }
    }

    /// Register all metrics with a registry
    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.messages_published_total.clone()))?;
        registry.register(Box::new(self.publish_errors_total.clone()))?;
        registry.register(Box::new(self.publish_latency_seconds.clone()))?;
        Ok(())
    }

    /// Record an accepted message and its latency
    pub fn record_published(&self, topic: &str, backend: &str, latency_seconds: f64) {
        self.messages_published_total
            .with_label_values(&[topic, backend])
            .inc();
        self.publish_latency_seconds
            .with_label_values(&[topic, backend])
            .observe(latency_seconds);
    }

    /// Record a failed publish call
    pub fn record_error(&self, topic: &str, kind: &str) {
        self.publish_errors_total
            .with_label_values(&[topic, kind])
            .inc();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Render all registered metrics in the Prometheus text format
pub fn gather_metrics() -> String {
    // Force registration before gathering
    Lazy::force(&METRICS);

    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        error!("Failed to convert metrics to UTF-8: {}", e);
        String::new()
    })
}
