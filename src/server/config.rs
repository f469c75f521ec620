//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::session::DEFAULT_CHUNK_SIZE;

/// Default port the relay listens on
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Maximum bytes read from a producer per broadcast
    pub chunk_size: usize,

    /// Request head must arrive within this time
    pub request_timeout: Duration,

    /// Producer is disconnected after this long without data
    pub producer_idle_timeout: Duration,

    /// Maximum size of a request head in bytes
    pub max_request_head: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            max_connections: 0, // Unlimited
            chunk_size: DEFAULT_CHUNK_SIZE,
            request_timeout: Duration::from_secs(10),
            producer_idle_timeout: Duration::from_secs(60),
            max_request_head: 8 * 1024,
            tcp_nodelay: true, // Relayed chunks are small and latency-sensitive
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the port, keeping the bind host
    pub fn port(mut self, port: u16) -> Self {
        self.bind_addr.set_port(port);
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set producer read chunk size (at least one byte)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Set request head timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set producer idle timeout
    pub fn producer_idle_timeout(mut self, timeout: Duration) -> Self {
        self.producer_idle_timeout = timeout;
        self
    }

    /// Set maximum request head size
    pub fn max_request_head(mut self, size: usize) -> Self {
        self.max_request_head = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.bind_addr.ip().is_loopback());
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.max_request_head, 8192);
        assert_eq!(config.producer_idle_timeout, Duration::from_secs(60));
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "0.0.0.0:4000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
    }

    #[test]
    fn test_builder_port_keeps_host() {
        let config = ServerConfig::default().port(8443);

        assert_eq!(config.bind_addr.port(), 8443);
        assert!(config.bind_addr.ip().is_loopback());
    }

    #[test]
    fn test_builder_chunk_size_floor() {
        let config = ServerConfig::default().chunk_size(0);

        assert_eq!(config.chunk_size, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:3001".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .max_connections(50)
            .chunk_size(1024)
            .request_timeout(Duration::from_secs(2))
            .producer_idle_timeout(Duration::from_secs(30))
            .max_request_head(512);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.producer_idle_timeout, Duration::from_secs(30));
        assert_eq!(config.max_request_head, 512);
    }
}
