//! Registry error types

use super::key::StreamId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Stream id was empty or absent
    #[error("missing stream id")]
    MissingStreamId,
    /// Connection id was empty or absent
    #[error("missing connection id")]
    MissingConnectionId,
    /// Another producer already owns the stream
    #[error("stream already has a producer: {0}")]
    ProducerActive(StreamId),
}
