//! Stream registry for producer/consumer fan-out
//!
//! The registry maps a stream id to the consumers currently registered on it
//! and copies every producer chunk to each of them.
//!
//! # Architecture
//!
//! ```text
//!                          Arc<StreamRegistry>
//!                     ┌──────────────────────────────┐
//!                     │ streams: HashMap<StreamId,   │
//!                     │   Mutex<StreamEntry {        │
//!                     │     consumers: ConnId → Weak │
//!                     │     producers,               │
//!                     │   }>                         │
//!                     │ >                            │
//!                     └──────────────┬───────────────┘
//!                                    │
//!         ┌──────────────────────────┼──────────────────────────┐
//!         │                          │                          │
//!         ▼                          ▼                          ▼
//!    [Producer]                 [Consumer]                 [Consumer]
//!    ingest()                   capture()                  capture()
//!         │                     owns Arc<ConsumerSink>     owns Arc<ConsumerSink>
//!         └──► registry.broadcast() ──► write + flush ──► TCP
//! ```
//!
//! # Locking
//!
//! Each stream has its own mutex, held for the full duration of register,
//! unregister and broadcast on that stream. Writes to each sink are bounded by
//! [`RegistryConfig::write_timeout`], so one stalled consumer delays its
//! stream by at most that long per chunk and never blocks other streams.
//!
//! Chunks are `bytes::Bytes`, so every sink write shares one allocation.

pub mod config;
pub mod entry;
pub mod error;
pub mod key;
pub mod sink;
pub mod store;

pub use config::RegistryConfig;
pub use entry::{BroadcastOutcome, StreamEntry, StreamStats};
pub use error::RegistryError;
pub use key::{ConnectionId, StreamId};
pub use sink::{ConsumerSink, SinkHandle};
pub use store::StreamRegistry;
