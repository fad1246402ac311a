//! Error types for the collection state machine
//!
//! Session errors are kept small and `Copy`: they are returned on the
//! sample-ingestion hot path and may be dropped on the floor by
//! callers that treat a stale callback as noise (a sensor callback
//! racing a stop is expected, not exceptional).
//!
//! Everything else in the core is local-recoverable by design: an
//! empty window is a skipped emission, a malformed log row is skipped
//! and counted, and publish failures stay inside the relay layer.

use thiserror_no_std::Error;

/// Errors from session state transitions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Operation requires an active collection session
    #[error("no active collection session")]
    NotCollecting,

    /// `start()` called while a session is already running
    #[error("collection session already running")]
    AlreadyCollecting,
}

#[cfg(feature = "defmt")]
impl defmt::Format for SessionError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotCollecting => defmt::write!(fmt, "no active collection session"),
            Self::AlreadyCollecting => defmt::write!(fmt, "collection session already running"),
        }
    }
}
