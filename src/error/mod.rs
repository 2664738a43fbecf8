//! Error types for pubsub-publisher.

use thiserror::Error;

/// Result type for publisher operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pubsub-publisher.
#[derive(Error, Debug)]
pub enum Error {
    /// No valid credentials could be resolved.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The publisher client could not be constructed.
    #[error("Client construction error: {0}")]
    ClientConstruction(String),

    /// The payload could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Submission was rejected or not acknowledged.
    #[error("Publish error: {0}")]
    Publish(String),

    /// Configuration is missing or still holds a placeholder.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid argument passed by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short, stable label for the error kind (used as a metrics label).
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Authentication(_) => "authentication",
            Error::ClientConstruction(_) => "client_construction",
            Error::Serialization(_) => "serialization",
            Error::Publish(_) => "publish",
            Error::InvalidConfiguration(_) => "invalid_configuration",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::Validation(_) => "validation",
            Error::Io(_) => "io",
        }
    }
}

/// Validation error types.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid project ID.
    #[error("Invalid project ID: {0}")]
    InvalidProjectId(String),

    /// Invalid topic ID.
    #[error("Invalid topic ID: {0}")]
    InvalidTopicId(String),

    /// Message too large.
    #[error("Message too large: {size} bytes (max: {max} bytes)")]
    MessageTooLarge {
        /// Actual message size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Invalid parameter.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Reason for invalidity.
        reason: String,
    },
}
