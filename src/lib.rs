//! Real-time byte stream relay
//!
//! One producer connection streams raw bytes tagged with a stream id, and
//! every consumer registered under the same id receives those bytes in order.
//!
//! ```text
//!   producer ──► session::ingest ──► StreamRegistry::broadcast ──┬──► consumer A
//!                                                                ├──► consumer B
//!                                                                └──► consumer C
//! ```
//!
//! The [`registry`] module owns the fan-out state, [`session`] drives the
//! producer and consumer lifecycles, and [`server`] is a thin TCP front end.

pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use error::{Error, Result};
pub use registry::{ConnectionId, ConsumerSink, RegistryConfig, StreamId, StreamRegistry};
pub use server::{RelayServer, ServerConfig};
