//! Producer and consumer session drivers
//!
//! - [`ingest`] turns a producer's body into broadcast calls
//! - [`capture`] holds a consumer's registration for its connection lifetime

pub mod capture;
pub mod context;
pub mod ingest;
pub mod state;

pub use capture::capture;
pub use context::{SessionContext, SessionRole};
pub use ingest::{ingest, IngestEnd, IngestReport, DEFAULT_CHUNK_SIZE};
pub use state::{ConsumerPhase, ConsumerState};
