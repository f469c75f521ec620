//! TCP front end for the relay
//!
//! - `POST /stream` connections are producers
//! - `GET /capture` connections are consumers

pub mod config;
mod connection;
pub mod listener;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use listener::RelayServer;
