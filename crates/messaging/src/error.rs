//! Bus error types.

use thiserror::Error;

/// Errors that can occur while publishing or consuming messages.
#[derive(Debug, Error)]
pub enum BusError {
    /// A message could not be serialized for publishing.
    #[error("Failed to encode message for topic '{topic}': {source}")]
    Encode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    /// A received payload could not be deserialized.
    #[error("Failed to decode message from topic '{topic}': {source}")]
    Decode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },
}
