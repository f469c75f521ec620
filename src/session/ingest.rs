//! Producer ingest
//!
//! Reads a producer's byte stream in fixed-size chunks and broadcasts each
//! non-empty chunk before issuing the next read.

use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;
use crate::registry::{RegistryError, StreamRegistry};
use crate::stats::SessionStats;

use super::context::SessionContext;

/// Default read size for producer bodies
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;

/// How a producer session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestEnd {
    /// Producer closed its side cleanly
    EndOfStream,
    /// A read failed; the session ends without retry
    ReadError(io::ErrorKind),
    /// No bytes arrived within the idle timeout
    IdleTimeout,
}

/// Summary of a finished producer session
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub stats: SessionStats,
    pub end: IngestEnd,
}

/// Relay a producer's body into the registry
///
/// Fails before any read if the stream id is empty or another producer
/// already owns the stream. Read errors, end-of-stream and a read that stays
/// idle for longer than `idle_timeout` end the session normally, release the
/// producer slot and are reported in the returned [`IngestReport`].
pub async fn ingest<R>(
    registry: &StreamRegistry,
    ctx: &SessionContext,
    reader: R,
    chunk_size: usize,
    idle_timeout: Duration,
) -> Result<IngestReport>
where
    R: AsyncRead + Unpin,
{
    if ctx.stream.is_empty() {
        tracing::warn!(
            session_id = ctx.session_id,
            peer = %ctx.connection,
            "Producer refused: stream id missing"
        );
        return Err(RegistryError::MissingStreamId.into());
    }

    registry.claim_producer(&ctx.stream, ctx.session_id).await?;

    tracing::info!(
        session_id = ctx.session_id,
        stream = %ctx.stream,
        peer = %ctx.connection,
        "Stream created for connection"
    );

    let report = pump(registry, ctx, reader, chunk_size.max(1), idle_timeout).await;

    registry.release_producer(&ctx.stream, ctx.session_id).await;

    match report.end {
        IngestEnd::EndOfStream => tracing::info!(
            session_id = ctx.session_id,
            stream = %ctx.stream,
            bytes = report.stats.bytes_received,
            chunks = report.stats.chunks_received,
            "Producer finished"
        ),
        IngestEnd::ReadError(kind) => tracing::info!(
            session_id = ctx.session_id,
            stream = %ctx.stream,
            bytes = report.stats.bytes_received,
            chunks = report.stats.chunks_received,
            error = ?kind,
            "Producer read failed"
        ),
        IngestEnd::IdleTimeout => tracing::info!(
            session_id = ctx.session_id,
            stream = %ctx.stream,
            bytes = report.stats.bytes_received,
            chunks = report.stats.chunks_received,
            idle_ms = idle_timeout.as_millis() as u64,
            "Producer idle, closing"
        ),
    }

    Ok(report)
}

async fn pump<R>(
    registry: &StreamRegistry,
    ctx: &SessionContext,
    mut reader: R,
    chunk_size: usize,
    idle_timeout: Duration,
) -> IngestReport
where
    R: AsyncRead + Unpin,
{
    let mut stats = SessionStats::new();
    let mut buf = BytesMut::with_capacity(chunk_size);

    let end = loop {
        buf.resize(chunk_size, 0);

        let read = tokio::time::timeout(idle_timeout, reader.read(&mut buf[..])).await;
        let n = match read {
            Err(_) => break IngestEnd::IdleTimeout,
            // A zero-length read is end-of-stream for AsyncRead
            Ok(Ok(0)) => break IngestEnd::EndOfStream,
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                tracing::debug!(
                    session_id = ctx.session_id,
                    error = %e,
                    "Producer read error"
                );
                break IngestEnd::ReadError(e.kind());
            }
        };

        buf.truncate(n);
        let chunk = buf.split().freeze();

        let outcome = registry.broadcast(&ctx.stream, &chunk).await;
        stats.record_chunk(n, outcome);
    };

    IngestReport { stats, end }
}
