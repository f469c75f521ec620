//! Per-connection driver
//!
//! Reads the request head, then hands the socket to the producer or consumer
//! session driver.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::error::{RequestError, Result};
use crate::protocol::{read_request_head, Endpoint};
use crate::registry::{ConnectionId, ConsumerSink, StreamRegistry};
use crate::server::config::ServerConfig;
use crate::session::{capture, ingest, SessionContext};

/// A single accepted relay connection
pub(crate) struct Connection {
    session_id: u64,
    socket: TcpStream,
    peer_addr: SocketAddr,
    config: ServerConfig,
    registry: Arc<StreamRegistry>,
    shutdown: watch::Receiver<bool>,
}

impl Connection {
    pub(crate) fn new(
        session_id: u64,
        socket: TcpStream,
        peer_addr: SocketAddr,
        config: ServerConfig,
        registry: Arc<StreamRegistry>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            session_id,
            socket,
            peer_addr,
            config,
            registry,
            shutdown,
        }
    }

    /// Drive the connection to completion
    pub(crate) async fn run(self) -> Result<()> {
        let (read_half, write_half) = self.socket.into_split();
        let mut reader = BufReader::new(read_half);

        let head = tokio::time::timeout(
            self.config.request_timeout,
            read_request_head(&mut reader, self.config.max_request_head),
        )
        .await
        .map_err(|_| RequestError::TimedOut)??;

        let endpoint = head.endpoint()?;
        let connection = ConnectionId::from(self.peer_addr);

        tracing::debug!(
            session_id = self.session_id,
            peer = %self.peer_addr,
            endpoint = ?endpoint,
            stream = %head.stream_id(),
            "Request received"
        );

        match endpoint {
            Endpoint::Stream => {
                let ctx = SessionContext::producer(self.session_id, connection, head.stream_id());
                ingest(
                    &self.registry,
                    &ctx,
                    reader,
                    self.config.chunk_size,
                    self.config.producer_idle_timeout,
                )
                .await?;
            }
            Endpoint::Capture => {
                let ctx = SessionContext::consumer(self.session_id, connection, head.stream_id());
                let sink = ConsumerSink::new(write_half);
                let terminated = wait_for_close(reader, self.shutdown);
                capture(&self.registry, &ctx, sink, terminated).await?;
            }
        }

        Ok(())
    }
}

/// Resolve once the consumer hangs up, its socket errors, or the server stops
///
/// Anything the consumer sends after its request head is discarded.
async fn wait_for_close(
    mut reader: BufReader<OwnedReadHalf>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut scratch = [0u8; 512];

    loop {
        tokio::select! {
            read = reader.read(&mut scratch) => match read {
                Ok(0) | Err(_) => return,
                Ok(_) => continue,
            },
            _ = stopped(&mut shutdown) => return,
        }
    }
}

/// Resolve once the shutdown flag is set or the server is gone
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
