//! Stream registry implementation
//!
//! The central registry that maps stream ids to registered consumers and
//! fans producer chunks out to them.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Mutex, RwLock};

use super::config::RegistryConfig;
use super::entry::{BroadcastOutcome, StreamEntry, StreamStats};
use super::error::RegistryError;
use super::key::{ConnectionId, StreamId};
use super::sink::ConsumerSink;

/// Central registry for all streams
///
/// The outer map is only write-locked to create a stream. Every
/// register/unregister/broadcast then takes that stream's own mutex for its
/// whole duration, so a slow broadcast on one stream never blocks another.
pub struct StreamRegistry {
    /// Map of stream id to stream entry
    streams: RwLock<HashMap<StreamId, Arc<Mutex<StreamEntry>>>>,

    /// Configuration
    config: RegistryConfig,
}

impl StreamRegistry {
    /// Create a new stream registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new stream registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    async fn entry(&self, stream: &StreamId) -> Option<Arc<Mutex<StreamEntry>>> {
        self.streams.read().await.get(stream).cloned()
    }

    async fn entry_or_create(&self, stream: &StreamId) -> Arc<Mutex<StreamEntry>> {
        if let Some(entry) = self.entry(stream).await {
            return entry;
        }

        let mut streams = self.streams.write().await;
        Arc::clone(streams.entry(stream.clone()).or_insert_with(|| {
            tracing::debug!(stream = %stream, "Stream created");
            Arc::new(Mutex::new(StreamEntry::new()))
        }))
    }

    /// Register a consumer sink for a stream
    ///
    /// Overwrites any sink already registered under the same connection id.
    /// Only a weak handle is stored; the caller keeps ownership of the sink.
    pub async fn register(
        &self,
        stream: &StreamId,
        connection: &ConnectionId,
        sink: &Arc<ConsumerSink>,
    ) -> Result<(), RegistryError> {
        if stream.is_empty() {
            return Err(RegistryError::MissingStreamId);
        }
        if connection.is_empty() {
            return Err(RegistryError::MissingConnectionId);
        }

        let entry_arc = self.entry_or_create(stream).await;
        let mut entry = entry_arc.lock().await;

        let replaced = entry
            .consumers
            .insert(connection.clone(), sink.handle())
            .is_some();

        tracing::info!(
            stream = %stream,
            connection = %connection,
            consumers = entry.consumer_count(),
            replaced = replaced,
            "Consumer registered"
        );

        Ok(())
    }

    /// Unregister a consumer
    ///
    /// Idempotent: unknown streams and connections are ignored. Returns
    /// whether an entry was actually removed.
    pub async fn unregister(&self, stream: &StreamId, connection: &ConnectionId) -> bool {
        let Some(entry_arc) = self.entry(stream).await else {
            return false;
        };
        let mut entry = entry_arc.lock().await;

        let removed = entry.consumers.remove(connection).is_some();
        if removed {
            tracing::info!(
                stream = %stream,
                connection = %connection,
                consumers = entry.consumer_count(),
                "Consumer unregistered"
            );
        }

        removed
    }

    /// Broadcast a chunk to every consumer of a stream
    ///
    /// Holds the stream's lock while writing to each sink in turn. A sink that
    /// fails or exceeds the write timeout is logged, shut down and skipped
    /// from then on; it stays registered until its own connection ends. Only
    /// chunks that reached at least one consumer count towards the stream's
    /// relayed totals.
    pub async fn broadcast(&self, stream: &StreamId, data: &Bytes) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();

        let Some(entry_arc) = self.entry(stream).await else {
            return outcome;
        };
        let mut entry = entry_arc.lock().await;

        for (connection, sink) in &entry.consumers {
            match sink.write_chunk(data, self.config.write_timeout).await {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        stream = %stream,
                        connection = %connection,
                        error = %e,
                        "Consumer write failed"
                    );
                }
            }
        }

        // Chunks nobody received are dropped, not relayed
        if outcome.delivered > 0 {
            entry.record_chunk(data.len());
        }

        tracing::trace!(
            stream = %stream,
            bytes = data.len(),
            delivered = outcome.delivered,
            failed = outcome.failed,
            "Chunk broadcast"
        );

        outcome
    }

    /// Claim a producer slot on a stream
    ///
    /// Rejects the claim if another session already produces on the stream,
    /// unless concurrent producers are allowed by configuration.
    pub async fn claim_producer(
        &self,
        stream: &StreamId,
        session_id: u64,
    ) -> Result<(), RegistryError> {
        if stream.is_empty() {
            return Err(RegistryError::MissingStreamId);
        }

        let entry_arc = self.entry_or_create(stream).await;
        let mut entry = entry_arc.lock().await;

        let taken = entry.producers.iter().any(|&id| id != session_id);
        if taken && !self.config.allow_concurrent_producers {
            tracing::warn!(
                stream = %stream,
                session_id = session_id,
                "Producer rejected, stream already has a producer"
            );
            return Err(RegistryError::ProducerActive(stream.clone()));
        }

        entry.producers.insert(session_id);
        tracing::info!(
            stream = %stream,
            session_id = session_id,
            producers = entry.producers.len(),
            consumers = entry.consumer_count(),
            "Producer registered"
        );

        Ok(())
    }

    /// Release a producer slot previously claimed by `session_id`
    pub async fn release_producer(&self, stream: &StreamId, session_id: u64) {
        let Some(entry_arc) = self.entry(stream).await else {
            return;
        };
        let mut entry = entry_arc.lock().await;

        if !entry.producers.remove(&session_id) {
            tracing::warn!(
                stream = %stream,
                session_id = session_id,
                "Producer release mismatch"
            );
            return;
        }

        tracing::info!(
            stream = %stream,
            session_id = session_id,
            consumers = entry.consumer_count(),
            "Producer released"
        );
    }

    /// Number of consumers registered on a stream
    pub async fn consumer_count(&self, stream: &StreamId) -> usize {
        match self.entry(stream).await {
            Some(entry_arc) => entry_arc.lock().await.consumer_count(),
            None => 0,
        }
    }

    /// Check whether a consumer is registered on a stream
    pub async fn is_registered(&self, stream: &StreamId, connection: &ConnectionId) -> bool {
        match self.entry(stream).await {
            Some(entry_arc) => entry_arc.lock().await.consumers.contains_key(connection),
            None => false,
        }
    }

    /// Get stream statistics
    pub async fn stream_stats(&self, stream: &StreamId) -> Option<StreamStats> {
        let entry_arc = self.entry(stream).await?;
        let entry = entry_arc.lock().await;
        Some(entry.stats())
    }

    /// Get total number of streams
    pub async fn stream_count(&self) -> usize {
        self.streams.read().await.len()
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}
