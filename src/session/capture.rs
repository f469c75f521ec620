//! Consumer registration
//!
//! Keeps a consumer's sink in the registry for exactly as long as its
//! connection lives. This path never writes relayed data itself.

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::registry::{ConsumerSink, StreamRegistry};

use super::context::SessionContext;
use super::state::ConsumerState;

/// Register a consumer, wait for `terminated`, then unregister it
///
/// The sink is dropped on return, after which the registry's weak handle no
/// longer resolves. Refused registrations (missing ids) return an error and
/// leave the registry untouched.
pub async fn capture<F>(
    registry: &StreamRegistry,
    ctx: &SessionContext,
    sink: Arc<ConsumerSink>,
    terminated: F,
) -> Result<ConsumerState>
where
    F: Future<Output = ()>,
{
    let mut state = ConsumerState::new();

    if let Err(e) = registry.register(&ctx.stream, &ctx.connection, &sink).await {
        tracing::warn!(
            session_id = ctx.session_id,
            connection = %ctx.connection,
            stream = %ctx.stream,
            error = %e,
            "Connection couldn't be registered"
        );
        state.on_closed();
        return Err(e.into());
    }
    state.on_registered();

    terminated.await;

    registry.unregister(&ctx.stream, &ctx.connection).await;
    state.on_closed();

    tracing::debug!(
        session_id = ctx.session_id,
        role = %ctx.role,
        connection = %ctx.connection,
        stream = %ctx.stream,
        registered_ms = state.registered_for().as_millis() as u64,
        "Consumer session ended"
    );

    Ok(state)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio::io::AsyncReadExt;
    use tokio::sync::oneshot;

    use super::*;
    use crate::error::Error;
    use crate::registry::{ConnectionId, RegistryError, StreamId};
    use crate::session::state::ConsumerPhase;

    #[tokio::test]
    async fn test_registered_until_terminated() {
        let registry = Arc::new(StreamRegistry::new());
        let stream = StreamId::from("s1");
        let (mut reader, writer) = tokio::io::duplex(1024);
        let sink = ConsumerSink::new(writer);
        let (done_tx, done_rx) = oneshot::channel::<()>();

        let ctx = SessionContext::consumer(1, ConnectionId::from("x"), stream.clone());
        let task = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                capture(&registry, &ctx, sink, async {
                    let _ = done_rx.await;
                })
                .await
            })
        };

        // Wait for the spawned task to register
        while registry.consumer_count(&stream).await == 0 {
            tokio::task::yield_now().await;
        }

        registry.broadcast(&stream, &Bytes::from_static(b"live")).await;
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"live");

        done_tx.send(()).unwrap();
        let state = task.await.unwrap().unwrap();
        assert_eq!(state.phase, ConsumerPhase::Closed);

        // Nothing is written after the connection ended
        assert_eq!(registry.consumer_count(&stream).await, 0);
        let outcome = registry
            .broadcast(&stream, &Bytes::from_static(b"after"))
            .await;
        assert_eq!(outcome.delivered + outcome.failed, 0);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn test_missing_ids_are_refused() {
        let registry = StreamRegistry::new();

        for (connection, stream, expected) in [
            ("x", "", RegistryError::MissingStreamId),
            ("", "s1", RegistryError::MissingConnectionId),
        ] {
            let (_reader, writer) = tokio::io::duplex(16);
            let ctx = SessionContext::consumer(
                1,
                ConnectionId::from(connection),
                StreamId::from(stream),
            );

            // A refusal returns without waiting on termination
            let result = capture(
                &registry,
                &ctx,
                ConsumerSink::new(writer),
                std::future::pending::<()>(),
            )
            .await;

            match result {
                Err(Error::Registry(e)) => assert_eq!(e, expected),
                other => panic!("unexpected result: {other:?}"),
            }
        }

        assert_eq!(registry.stream_count().await, 0);
    }
}
