//! Session context
//!
//! Identity of one producer or consumer connection, passed to the session
//! drivers for routing and logging.

use crate::registry::{ConnectionId, StreamId};

/// Role a connection plays on the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    /// Sends bytes to be relayed
    Producer,
    /// Receives relayed bytes
    Consumer,
}

impl std::fmt::Display for SessionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionRole::Producer => f.write_str("producer"),
            SessionRole::Consumer => f.write_str("consumer"),
        }
    }
}

/// Context for a single relay session
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Unique session ID
    pub session_id: u64,

    /// Transport origin of the connection
    pub connection: ConnectionId,

    /// Stream the session produces to or consumes from
    pub stream: StreamId,

    /// Producer or consumer
    pub role: SessionRole,
}

impl SessionContext {
    /// Context for a producer session
    pub fn producer(session_id: u64, connection: ConnectionId, stream: StreamId) -> Self {
        Self {
            session_id,
            connection,
            stream,
            role: SessionRole::Producer,
        }
    }

    /// Context for a consumer session
    pub fn consumer(session_id: u64, connection: ConnectionId, stream: StreamId) -> Self {
        Self {
            session_id,
            connection,
            stream,
            role: SessionRole::Consumer,
        }
    }
}
