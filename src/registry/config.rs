//! Registry configuration

use std::time::Duration;

/// Configuration for the stream registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Upper bound on one write+flush to a single consumer during broadcast
    pub write_timeout: Duration,

    /// Let several producers feed one stream at once (chunks interleave)
    pub allow_concurrent_producers: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(5),
            allow_concurrent_producers: false,
        }
    }
}

impl RegistryConfig {
    /// Set the per-sink write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Allow or reject concurrent producers on one stream
    pub fn allow_concurrent_producers(mut self, allow: bool) -> Self {
        self.allow_concurrent_producers = allow;
        self
    }
}
