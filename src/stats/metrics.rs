//! Statistics for relay sessions and the server

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::registry::BroadcastOutcome;

/// Producer session statistics
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Total bytes read from the producer
    pub bytes_received: u64,
    /// Number of non-empty reads broadcast
    pub chunks_received: u64,
    /// Sum of successful sink writes across all chunks
    pub deliveries: u64,
    /// Sum of failed or timed out sink writes across all chunks
    pub failed_deliveries: u64,
    /// Session start time
    pub started_at: Instant,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self {
            bytes_received: 0,
            chunks_received: 0,
            deliveries: 0,
            failed_deliveries: 0,
            started_at: Instant::now(),
        }
    }

    /// Account for one broadcast chunk
    pub fn record_chunk(&mut self, len: usize, outcome: BroadcastOutcome) {
        self.bytes_received += len as u64;
        self.chunks_received += 1;
        self.deliveries += outcome.delivered as u64;
        self.failed_deliveries += outcome.failed as u64;
    }

    /// Get duration since the session started
    pub fn duration(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Calculate bitrate in bits per second
    pub fn bitrate(&self) -> u64 {
        let secs = self.duration().as_secs();
        if secs > 0 {
            (self.bytes_received * 8) / secs
        } else {
            0
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Server-wide connection counters
#[derive(Debug, Default)]
pub struct ServerCounters {
    total_connections: AtomicU64,
    active_connections: AtomicU64,
    rejected_connections: AtomicU64,
}

impl ServerCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_rejected(&self) {
        self.rejected_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot
    pub fn snapshot(&self) -> ServerStats {
        ServerStats {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            rejected_connections: self.rejected_connections.load(Ordering::Relaxed),
        }
    }
}

/// Server-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStats {
    /// Total connections ever accepted
    pub total_connections: u64,
    /// Currently open connections
    pub active_connections: u64,
    /// Connections refused by the connection limit
    pub rejected_connections: u64,
}
