//! Collection-session state signal
//!
//! The producer publishes a boolean collecting flag on its own
//! channel, independently of telemetry snapshots; the two channels
//! interleave arbitrarily in flight, but each is ordered within
//! itself. [`SessionTracker`] applies the signal last-value-wins on
//! the receiver: repeated values collapse to nothing and only genuine
//! transitions surface, so the caller resets or finalizes exactly
//! once per session boundary.
//!
//! The signal timestamp is carried for display and change-forcing on
//! the transport; it takes no part in ordering, which matters when a
//! session restart follows a clock adjustment.

use crate::time::Timestamp;

/// Producer collection state, as published on the state channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSignal {
    /// Whether the producer is collecting
    pub active: bool,
    /// Publish time of this signal in milliseconds
    pub timestamp: Timestamp,
}

impl SessionSignal {
    /// Create a signal.
    pub const fn new(active: bool, timestamp: Timestamp) -> Self {
        Self { active, timestamp }
    }
}

/// Session boundary crossed by an applied signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    /// Collection began: reset receiver state before further ingest
    Started,
    /// Collection ended: run the finalize hook
    Stopped,
}

/// Receiver-side collapsing of the session-state channel.
pub struct SessionTracker {
    active: bool,
    last_signal_at: Timestamp,
}

impl SessionTracker {
    /// Create a tracker with no session active.
    pub const fn new() -> Self {
        Self {
            active: false,
            last_signal_at: 0,
        }
    }

    /// Whether the producer is currently collecting, as far as the
    /// receiver knows.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Publish time of the most recently applied signal.
    pub const fn last_signal_at(&self) -> Timestamp {
        self.last_signal_at
    }

    /// Apply a signal; returns the transition it caused, if any.
    ///
    /// A signal carrying the value already in effect is idempotent:
    /// the channel is last-value-wins, not a log.
    pub fn apply(&mut self, signal: SessionSignal) -> Option<SessionTransition> {
        self.last_signal_at = signal.timestamp;

        match (self.active, signal.active) {
            (false, true) => {
                self.active = true;
                Some(SessionTransition::Started)
            }
            (true, false) => {
                self.active = false;
                Some(SessionTransition::Stopped)
            }
            _ => None,
        }
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}
