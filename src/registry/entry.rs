//! Stream entry and statistics types
//!
//! This module defines the per-stream state stored in the registry.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use super::key::ConnectionId;
use super::sink::SinkHandle;

/// Entry for a single stream in the registry
///
/// Always accessed under the stream's own mutex, so plain fields suffice.
#[derive(Debug)]
pub struct StreamEntry {
    /// Registered consumers keyed by connection id
    pub(super) consumers: HashMap<ConnectionId, SinkHandle>,

    /// Session ids of producers currently feeding this stream
    pub(super) producers: HashSet<u64>,

    /// Total bytes delivered to at least one consumer
    pub bytes_relayed: u64,

    /// Total chunks delivered to at least one consumer
    pub chunks_relayed: u64,

    /// When the stream was first seen
    pub created_at: Instant,
}

impl StreamEntry {
    pub(super) fn new() -> Self {
        Self {
            consumers: HashMap::new(),
            producers: HashSet::new(),
            bytes_relayed: 0,
            chunks_relayed: 0,
            created_at: Instant::now(),
        }
    }

    /// Get the number of registered consumers
    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    /// Check if any producer is feeding the stream
    pub fn has_producer(&self) -> bool {
        !self.producers.is_empty()
    }

    pub(super) fn record_chunk(&mut self, len: usize) {
        self.bytes_relayed += len as u64;
        self.chunks_relayed += 1;
    }

    pub(super) fn stats(&self) -> StreamStats {
        StreamStats {
            consumer_count: self.consumer_count(),
            producer_count: self.producers.len(),
            has_producer: self.has_producer(),
            bytes_relayed: self.bytes_relayed,
            chunks_relayed: self.chunks_relayed,
            age: self.created_at.elapsed(),
        }
    }
}

/// Statistics for a stream
#[derive(Debug, Clone)]
pub struct StreamStats {
    /// Number of registered consumers
    pub consumer_count: usize,
    /// Number of producers currently feeding the stream
    pub producer_count: usize,
    /// Whether any producer is feeding the stream
    pub has_producer: bool,
    /// Bytes that reached at least one consumer
    pub bytes_relayed: u64,
    /// Chunks that reached at least one consumer
    pub chunks_relayed: u64,
    /// Time since the stream was created
    pub age: Duration,
}

/// Result of a single broadcast call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Consumers that received the chunk
    pub delivered: usize,
    /// Consumers whose write failed, timed out or whose sink was gone
    pub failed: usize,
}
