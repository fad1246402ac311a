//! In-process loopback link
//!
//! Runs producer and receiver in one process: the link half
//! implements [`TelemetryLink`], the receiver half hands payloads
//! back out in publish order. Each channel is ordered and byte-exact;
//! disconnecting the link models a transport outage, and tests can
//! drop or re-poll payloads to model loss and duplication.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{LinkStats, RelayError, TelemetryLink};

#[derive(Default)]
struct Channels {
    snapshots: VecDeque<Vec<u8>>,
    states: VecDeque<Vec<u8>>,
    connected: bool,
}

/// Publishing half of the loopback pair.
pub struct LoopbackLink {
    shared: Arc<Mutex<Channels>>,
    stats: LinkStats,
}

/// Consuming half of the loopback pair.
pub struct LoopbackReceiver {
    shared: Arc<Mutex<Channels>>,
}

/// Create a connected loopback pair.
pub fn loopback() -> (LoopbackLink, LoopbackReceiver) {
    let shared = Arc::new(Mutex::new(Channels {
        connected: true,
        ..Channels::default()
    }));

    (
        LoopbackLink {
            shared: Arc::clone(&shared),
            stats: LinkStats::default(),
        },
        LoopbackReceiver { shared },
    )
}

fn lock(shared: &Mutex<Channels>) -> MutexGuard<'_, Channels> {
    shared.lock().expect("loopback channel lock poisoned")
}

impl LoopbackLink {
    /// Connect or disconnect the link (simulated outage).
    pub fn set_connected(&self, connected: bool) {
        lock(&self.shared).connected = connected;
    }

    /// Delivery counters for this link.
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    fn publish(&mut self, payload: &[u8], snapshot: bool) -> Result<(), RelayError> {
        let mut channels = lock(&self.shared);
        if !channels.connected {
            self.stats.publish_failures += 1;
            return Err(RelayError::NotConnected);
        }

        let queue = if snapshot {
            &mut channels.snapshots
        } else {
            &mut channels.states
        };
        queue.push_back(payload.to_vec());

        if snapshot {
            self.stats.snapshots_sent += 1;
        } else {
            self.stats.states_sent += 1;
        }
        self.stats.bytes_sent += payload.len() as u64;
        Ok(())
    }
}

impl TelemetryLink for LoopbackLink {
    type Error = RelayError;

    fn publish_snapshot(&mut self, payload: &[u8]) -> Result<(), RelayError> {
        self.publish(payload, true)
    }

    fn publish_state(&mut self, payload: &[u8]) -> Result<(), RelayError> {
        self.publish(payload, false)
    }

    fn is_connected(&self) -> bool {
        lock(&self.shared).connected
    }
}

impl LoopbackReceiver {
    /// Connect or disconnect the pair from the receiving side
    /// (simulates the peer going out of range).
    pub fn set_connected(&self, connected: bool) {
        lock(&self.shared).connected = connected;
    }

    /// Next snapshot payload, in publish order.
    pub fn poll_snapshot(&self) -> Option<Vec<u8>> {
        lock(&self.shared).snapshots.pop_front()
    }

    /// Next session-state payload, in publish order.
    pub fn poll_state(&self) -> Option<Vec<u8>> {
        lock(&self.shared).states.pop_front()
    }

    /// Snapshot payloads waiting to be polled.
    pub fn pending_snapshots(&self) -> usize {
        lock(&self.shared).snapshots.len()
    }
}
