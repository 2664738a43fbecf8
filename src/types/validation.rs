//! Validation functions for project IDs, topic IDs and payload sizes.

use crate::error::ValidationError;
use crate::Result;

/// Pub/Sub maximum message size (10 MB).
pub const PUBSUB_MAX_MESSAGE_SIZE: usize = 10_485_760;

/// GCP project ID validation (6-30 chars, lowercase letters, digits and hyphens,
/// must start with a letter and must not end with a hyphen).
pub fn validate_project_id(project_id: &str) -> Result<()> {
    if project_id.len() < 6 || project_id.len() > 30 {
        return Err(ValidationError::InvalidProjectId(format!(
            "Project ID must be 6-30 characters, got {}",
            project_id.len()
        ))
        .into());
    }

    if !project_id.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(ValidationError::InvalidProjectId(
            "Project ID must start with a lowercase letter".to_string(),
        )
        .into());
    }

    if project_id.ends_with('-') {
        return Err(ValidationError::InvalidProjectId(
            "Project ID must not end with a hyphen".to_string(),
        )
        .into());
    }

    for ch in project_id.chars() {
        if !ch.is_ascii_lowercase() && !ch.is_ascii_digit() && ch != '-' {
            return Err(ValidationError::InvalidProjectId(format!(
                "Project ID contains invalid character: '{}'",
                ch
            ))
            .into());
        }
    }

    Ok(())
}

/// Pub/Sub topic ID validation (3-255 chars, must start with letter,
/// must not start with "goog").
pub fn validate_topic_id(topic_id: &str) -> Result<()> {
    if topic_id.len() < 3 || topic_id.len() > 255 {
        return Err(ValidationError::InvalidTopicId(format!(
            "Topic ID must be 3-255 characters, got {}",
            topic_id.len()
        ))
        .into());
    }

    if !topic_id.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(
            ValidationError::InvalidTopicId("Topic ID must start with a letter".to_string()).into(),
        );
    }

    if topic_id.to_ascii_lowercase().starts_with("goog") {
        return Err(ValidationError::InvalidTopicId(
            "Topic ID must not start with 'goog'".to_string(),
        )
        .into());
    }

    for ch in topic_id.chars() {
        if !ch.is_ascii_alphanumeric() && !matches!(ch, '-' | '_' | '.' | '~' | '+' | '%') {
            return Err(ValidationError::InvalidTopicId(format!(
                "Topic ID contains invalid character: '{}'",
                ch
            ))
            .into());
        }
    }

    Ok(())
}

/// Validate message size against a maximum.
pub fn validate_message_size(size: usize, max_size: usize) -> Result<()> {
    if size > max_size {
        return Err(ValidationError::MessageTooLarge { size, max: max_size }.into());
    }
    Ok(())
}
