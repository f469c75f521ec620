//! Consumer lifecycle state machine
//!
//! A consumer moves `Pending → Registered → Closed` exactly once. There is no
//! way back into `Registered`; a reconnecting client is a new session.

use std::time::{Duration, Instant};

/// Consumer lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerPhase {
    /// Not yet in the registry
    Pending,
    /// Present in the registry, waiting for the connection to end
    Registered,
    /// Removed from the registry (terminal)
    Closed,
}

/// Lifecycle of one consumer connection
#[derive(Debug)]
pub struct ConsumerState {
    /// Current phase
    pub phase: ConsumerPhase,

    /// Time the consumer entered the registry
    pub registered_at: Option<Instant>,

    /// Time the consumer left the registry
    pub closed_at: Option<Instant>,
}

impl ConsumerState {
    pub fn new() -> Self {
        Self {
            phase: ConsumerPhase::Pending,
            registered_at: None,
            closed_at: None,
        }
    }

    /// Mark the consumer as registered
    pub fn on_registered(&mut self) {
        if self.phase == ConsumerPhase::Pending {
            self.phase = ConsumerPhase::Registered;
            self.registered_at = Some(Instant::now());
        }
    }

    /// Mark the consumer as closed
    ///
    /// Closing a consumer that never registered is allowed (refused request).
    pub fn on_closed(&mut self) {
        if self.phase != ConsumerPhase::Closed {
            self.phase = ConsumerPhase::Closed;
            self.closed_at = Some(Instant::now());
        }
    }

    pub fn is_registered(&self) -> bool {
        self.phase == ConsumerPhase::Registered
    }

    /// How long the consumer stayed registered
    pub fn registered_for(&self) -> Duration {
        match (self.registered_at, self.closed_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }
}

impl Default for ConsumerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumer_lifecycle() {
        let mut state = ConsumerState::new();
        assert_eq!(state.phase, ConsumerPhase::Pending);

        state.on_registered();
        assert!(state.is_registered());
        assert!(state.registered_at.is_some());

        state.on_closed();
        assert_eq!(state.phase, ConsumerPhase::Closed);
        assert!(state.closed_at.is_some());
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut state = ConsumerState::new();
        state.on_registered();
        state.on_closed();

        state.on_registered();
        assert_eq!(state.phase, ConsumerPhase::Closed);
    }

    #[test]
    fn test_refused_consumer_closes_without_registering() {
        let mut state = ConsumerState::new();
        state.on_closed();

        assert_eq!(state.phase, ConsumerPhase::Closed);
        assert!(state.registered_at.is_none());
        assert_eq!(state.registered_for(), Duration::ZERO);
    }
}
