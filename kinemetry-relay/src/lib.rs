//! Device-to-companion relay for kinemetry telemetry
//!
//! ## Overview
//!
//! This crate composes the core pipeline into the two halves that
//! face the transport:
//!
//! ```text
//! sensor ──► TelemetrySession ──► TelemetryLink ┄┄► TelemetryReceiver ──► Timeline
//!            (aggregate, retain,   (opaque,          (dedup, merge,
//!             snapshot, publish)    lossy)            track session)
//! ```
//!
//! The producer side guards the aggregator and the retention buffer
//! behind one lock so the sensor-callback path and the timer path
//! never interleave mid-drain, and publishes each snapshot after the
//! lock is dropped. The receiver side applies session transitions and
//! snapshot merges in one place, in arrival order.
//!
//! ## Transports
//!
//! Real transports (the wearable data layer, BLE, a socket) are out
//! of scope; they deliver whole payloads, possibly duplicated,
//! possibly reordered, possibly not at all. [`TelemetryLink`] is the
//! seam they implement. The in-process [`LoopbackLink`] ships here
//! for tests, examples and single-process deployments.
//!
//! Payloads are bounded: a snapshot carries at most one transmission
//! window (60 records), so neither side ever needs a growable
//! transport buffer.

#![warn(missing_docs)]

pub mod loopback;
pub mod producer;
pub mod receiver;
pub mod wire;

pub use loopback::{loopback, LoopbackLink, LoopbackReceiver};
pub use producer::TelemetrySession;
pub use receiver::TelemetryReceiver;

use thiserror::Error;

/// Relay-layer errors.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Link has no peer to deliver to
    #[error("link is not connected")]
    NotConnected,

    /// Payload failed to encode or decode
    #[error("payload codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Payload decoded but carried invalid values
    #[error("malformed payload: {0}")]
    Payload(&'static str),
}

/// Abstract device-to-companion link.
///
/// Implementations deliver whole payloads, ordered per channel but
/// with no guarantee across channels and no delivery guarantee at
/// all. Producers treat every publish as fire-and-forget: a failure
/// is logged, retention rides it out, and the next tick publishes a
/// superset snapshot anyway.
pub trait TelemetryLink {
    /// Transport error type.
    type Error;

    /// Publish one snapshot payload.
    fn publish_snapshot(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    /// Publish one session-state payload.
    fn publish_state(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    /// Whether the link currently has a peer.
    fn is_connected(&self) -> bool;
}

/// Delivery counters common to link implementations.
#[derive(Debug, Default, Clone)]
pub struct LinkStats {
    /// Snapshot payloads accepted by the link
    pub snapshots_sent: u64,
    /// State payloads accepted by the link
    pub states_sent: u64,
    /// Publishes the link rejected
    pub publish_failures: u64,
    /// Total payload bytes accepted
    pub bytes_sent: u64,
}
