//! Consumer sink handles
//!
//! A [`ConsumerSink`] is owned by the task driving a consumer connection.
//! The registry only ever holds a [`SinkHandle`], a weak reference that stops
//! resolving as soon as the owning task drops its `Arc`.
//!
//! A write that fails or times out may have left a partial chunk on the wire,
//! so the sink is marked broken and its writer shut down. Later chunks are
//! never appended after a truncated one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::SinkError;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Writable, flushable output of one consumer connection
pub struct ConsumerSink {
    writer: Mutex<BoxedWriter>,
    broken: AtomicBool,
}

impl ConsumerSink {
    /// Wrap a writer in a shared sink
    pub fn new<W>(writer: W) -> Arc<Self>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Arc::new(Self {
            writer: Mutex::new(Box::new(writer)),
            broken: AtomicBool::new(false),
        })
    }

    /// Non-owning handle for storage in the registry
    pub fn handle(self: &Arc<Self>) -> SinkHandle {
        SinkHandle(Arc::downgrade(self))
    }

    /// Whether an earlier write failed and the sink was shut down
    pub fn is_broken(&self) -> bool {
        self.broken.load(Ordering::Acquire)
    }

    /// Write a chunk and flush it, giving up after `timeout`
    ///
    /// The first failure breaks the sink: its writer is shut down and every
    /// later call returns [`SinkError::Closed`] without writing.
    pub async fn write_chunk(&self, data: &[u8], timeout: Duration) -> Result<(), SinkError> {
        if self.is_broken() {
            return Err(SinkError::Closed);
        }

        let mut writer = self.writer.lock().await;
        if self.is_broken() {
            return Err(SinkError::Closed);
        }

        let write = async {
            writer.write_all(data).await?;
            writer.flush().await
        };

        let result = match tokio::time::timeout(timeout, write).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => SinkError::Io(e),
            Err(_) => SinkError::TimedOut,
        };

        self.broken.store(true, Ordering::Release);
        // Best effort: ends the consumer's connection so capture unregisters it
        if let Ok(Err(e)) = tokio::time::timeout(timeout, writer.shutdown()).await {
            tracing::debug!(error = %e, "Consumer sink shutdown failed");
        }

        Err(result)
    }
}

impl std::fmt::Debug for ConsumerSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerSink").finish_non_exhaustive()
    }
}

/// Weak reference to a [`ConsumerSink`]
#[derive(Debug, Clone)]
pub struct SinkHandle(Weak<ConsumerSink>);

impl SinkHandle {
    /// Whether the owning connection still holds the sink
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Write through to the sink if its owner is still alive
    pub async fn write_chunk(&self, data: &[u8], timeout: Duration) -> Result<(), SinkError> {
        let sink = self.0.upgrade().ok_or(SinkError::Closed)?;
        sink.write_chunk(data, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn test_write_chunk_flushes_to_reader() {
        let (mut reader, writer) = tokio::io::duplex(64);
        let sink = ConsumerSink::new(writer);

        sink.write_chunk(b"abc", Duration::from_secs(1))
            .await
            .unwrap();

        let mut buf = [0u8; 3];
        reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"abc");
    }

    #[tokio::test]
    async fn test_write_chunk_times_out_when_reader_stalls() {
        // Nobody reads, so the 4-byte pipe fills and the write blocks
        let (_reader, writer) = tokio::io::duplex(4);
        let sink = ConsumerSink::new(writer);

        let result = sink
            .write_chunk(b"0123456789", Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(SinkError::TimedOut)));
    }

    #[tokio::test]
    async fn test_no_bytes_follow_a_partial_chunk() {
        let (mut reader, writer) = tokio::io::duplex(4);
        let sink = ConsumerSink::new(writer);

        let result = sink
            .write_chunk(b"AAAAAAAA", Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(SinkError::TimedOut)));
        assert!(sink.is_broken());

        let result = sink.write_chunk(b"BB", Duration::from_millis(50)).await;
        assert!(matches!(result, Err(SinkError::Closed)));

        // The reader sees the truncated chunk, then end-of-stream
        let mut received = Vec::new();
        reader.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"AAAA");
    }

    #[tokio::test]
    async fn test_io_error_breaks_sink() {
        let (reader, writer) = tokio::io::duplex(64);
        drop(reader);
        let sink = ConsumerSink::new(writer);

        let result = sink.write_chunk(b"x", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(SinkError::Io(_))));
        assert!(sink.is_broken());
    }

    #[tokio::test]
    async fn test_handle_closed_after_owner_drops() {
        let (_reader, writer) = tokio::io::duplex(64);
        let sink = ConsumerSink::new(writer);
        let handle = sink.handle();
        assert!(handle.is_alive());

        drop(sink);

        assert!(!handle.is_alive());
        let result = handle.write_chunk(b"x", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(SinkError::Closed)));
    }
}
