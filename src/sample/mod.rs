//! Sample message generation.
//!
//! Produces synthetic JSON payloads for demonstration runs and tests. The
//! generator is pure apart from reading the wall clock for timestamps.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default `metadata.source` value.
pub const DEFAULT_SOURCE: &str = "pubsub-publisher-example";

/// Default `metadata.version` value.
pub const DEFAULT_VERSION: &str = "1.0";

/// A synthetic message payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMessage {
    /// Client side identifier, `msg_` followed by the zero padded position.
    pub message_id: String,
    /// RFC 3339 timestamp captured at generation time.
    pub timestamp: String,
    /// Human readable content.
    pub content: String,
    /// Message metadata.
    pub metadata: SampleMetadata,
}

/// Metadata attached to every sample message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMetadata {
    /// Producer name.
    pub source: String,
    /// Payload schema version.
    pub version: String,
    /// 1-based position within the generated batch.
    pub sequence: u64,
}

/// Options controlling the generated metadata.
#[derive(Debug, Clone)]
pub struct SampleOptions {
    /// Value for `metadata.source`.
    pub source: String,
    /// Value for `metadata.version`.
    pub version: String,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

/// Format the client side identifier for a 1-based position.
pub fn format_message_id(position: u64) -> String {
    format!("msg_{:03}", position)
}

/// Generate `count` sample messages with default metadata.
pub fn generate(count: usize) -> Vec<SampleMessage> {
    generate_with(count, &SampleOptions::default())
}

/// Generate `count` sample messages with the given metadata.
pub fn generate_with(count: usize, options: &SampleOptions) -> Vec<SampleMessage> {
    (1..=count as u64)
        .map(|position| SampleMessage {
            message_id: format_message_id(position),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            content: format!("This is sample message number {}", position),
            metadata: SampleMetadata {
                source: options.source.clone(),
                version: options.version.clone(),
                sequence: position,
            },
        })
        .collect()
}

/// Generate sample messages from a signed count, rejecting negative values.
pub fn try_generate(count: i64, options: &SampleOptions) -> Result<Vec<SampleMessage>> {
    let count = usize::try_from(count).map_err(|_| {
        Error::InvalidArgument(format!("message count must be >= 0, got {}", count))
    })?;
    Ok(generate_with(count, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_generate_count_and_sequence() {
        for count in [0usize, 1, 5, 12, 120] {
            let messages = generate(count);
            assert_eq!(messages.len(), count);
            let sequences: Vec<u64> = messages.iter().map(|m| m.metadata.sequence).collect();
            let expected: Vec<u64> = (1..=count as u64).collect();
            assert_eq!(sequences, expected);
        }
    }

    #[test]
    fn test_generate_zero_is_empty() {
        assert!(generate(0).is_empty());
    }

    #[test]
    fn test_message_id_format() {
        assert_eq!(format_message_id(1), "msg_001");
        assert_eq!(format_message_id(12), "msg_012");
        assert_eq!(format_message_id(100), "msg_100");
        assert_eq!(format_message_id(1000), "msg_1000");

        let messages = generate(12);
        assert_eq!(messages[0].message_id, "msg_001");
        assert_eq!(messages[11].message_id, "msg_012");
    }

    #[test]
    fn test_message_content_and_metadata() {
        let messages = generate(2);
        assert_eq!(messages[1].content, "This is sample message number 2");
        assert_eq!(messages[1].metadata.source, DEFAULT_SOURCE);
        assert_eq!(messages[1].metadata.version, DEFAULT_VERSION);

        let options = SampleOptions {
            source: "sensor-gateway".to_string(),
            version: "2.1".to_string(),
        };
        let messages = generate_with(1, &options);
        assert_eq!(messages[0].metadata.source, "sensor-gateway");
        assert_eq!(messages[0].metadata.version, "2.1");
    }

    #[test]
    fn test_timestamps_are_ordered() {
        let messages = generate(20);
        let times: Vec<_> = messages
            .iter()
            .map(|m| DateTime::parse_from_rfc3339(&m.timestamp).unwrap())
            .collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_json_round_trip() {
        for message in generate(3) {
            let bytes = serde_json::to_vec(&message).unwrap();
            let decoded: SampleMessage = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(decoded, message);

            let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(value["metadata"]["sequence"], message.metadata.sequence);
        }
    }

    #[test]
    fn test_try_generate_rejects_negative() {
        let err = try_generate(-1, &SampleOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(try_generate(3, &SampleOptions::default()).unwrap().len(), 3);
    }
}
