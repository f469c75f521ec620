//! Crate error types

use std::io;

use crate::registry::RegistryError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("request error: {0}")]
    Request(#[from] RequestError),

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Failures while reading a connection's request head
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Peer closed before sending a request line
    #[error("connection closed before request head")]
    Empty,

    #[error("malformed request head: {0}")]
    Malformed(String),

    #[error("request head exceeds {0} bytes")]
    TooLarge(usize),

    #[error("request head not received in time")]
    TimedOut,

    #[error("unknown path: {0}")]
    UnknownPath(String),
}

/// Failures writing to a single consumer sink
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),

    #[error("write timed out")]
    TimedOut,

    /// The owning connection already dropped the sink
    #[error("sink closed")]
    Closed,
}
