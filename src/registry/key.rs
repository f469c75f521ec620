//! Identifier types for streams and consumer connections

use std::fmt;

/// Caller-chosen name of a logical byte stream
///
/// Construction never validates; operations that require a non-empty id
/// check [`StreamId::is_empty`] and fail with a registry error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StreamId(String);

impl StreamId {
    /// Create a new stream id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StreamId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Transport-level origin of a consumer (normally the peer socket address)
///
/// Unique among consumers registered on the same stream at the same time,
/// but may be reused once a connection has gone away.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Create a new connection id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<std::net::SocketAddr> for ConnectionId {
    fn from(addr: std::net::SocketAddr) -> Self {
        Self(addr.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_id_display() {
        let id = StreamId::from("camera-1");
        assert_eq!(id.to_string(), "camera-1");
        assert!(!id.is_empty());
        assert!(StreamId::default().is_empty());
    }

    #[test]
    fn test_connection_id_from_socket_addr() {
        let addr: std::net::SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let id = ConnectionId::from(addr);
        assert_eq!(id.as_str(), "127.0.0.1:5000");
    }
}
