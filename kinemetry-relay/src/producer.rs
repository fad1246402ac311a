//! Producer-side telemetry session
//!
//! ## Overview
//!
//! [`TelemetrySession`] is the watch-side composition: the window
//! aggregator plus the transmission buffer behind one lock, a link to
//! publish through, and a clock to stamp emissions. The sensor
//! callback path calls [`ingest`](TelemetrySession::ingest); a 1 s
//! timer outside this crate calls [`tick`](TelemetrySession::tick).
//!
//! ## Locking
//!
//! Both shared-state paths take the same lock for their whole step:
//! ingest holds it across the three-axis append, tick holds it across
//! drain-reduce-clear and the buffer push. A drain can therefore
//! never observe (or lose) a half-appended sample. Publishing happens
//! after the lock is dropped, so a slow transport stalls neither the
//! sensor callbacks nor the next tick.
//!
//! ## Publish failures
//!
//! Publishes are fire-and-forget. On failure the payload is simply
//! dropped and the failure logged: the transmission buffer still
//! holds the records, and the next successful publish carries them in
//! its snapshot. Only an outage longer than the retention window
//! loses data, which is the buffer's documented tradeoff.
//!
//! ## Stop semantics
//!
//! [`stop`](TelemetrySession::stop) flushes the samples accumulated
//! since the last tick as one final record, then flips the state
//! under the lock — after it returns no emission can occur, even if
//! a tick was already racing it (the tick either completed before the
//! flip and its record is the accepted final one, or it finds the
//! session idle).

use std::sync::{Mutex, MutexGuard};

use kinemetry_core::{
    Clock, RawSample, ReducedRecord, SessionError, SessionSignal, Timestamp,
    TransmissionBuffer, WindowAggregator, TRANSMISSION_WINDOW,
};

use crate::{wire, TelemetryLink};

struct SessionState {
    aggregator: WindowAggregator,
    buffer: TransmissionBuffer<TRANSMISSION_WINDOW>,
}

/// Watch-side session: aggregation, retention and publication.
pub struct TelemetrySession<L, C>
where
    L: TelemetryLink,
    L::Error: core::fmt::Debug,
    C: Clock,
{
    state: Mutex<SessionState>,
    link: Mutex<L>,
    clock: C,
}

impl<L, C> TelemetrySession<L, C>
where
    L: TelemetryLink,
    L::Error: core::fmt::Debug,
    C: Clock,
{
    /// Create an idle session over `link`, stamping from `clock`.
    pub fn new(link: L, clock: C) -> Self {
        Self {
            state: Mutex::new(SessionState {
                aggregator: WindowAggregator::new(),
                buffer: TransmissionBuffer::new(),
            }),
            link: Mutex::new(link),
            clock,
        }
    }

    /// Whether a collection session is running.
    pub fn is_collecting(&self) -> bool {
        self.lock_state().aggregator.is_collecting()
    }

    /// Samples dropped by the aggregator since the session started.
    pub fn dropped_samples(&self) -> u32 {
        self.lock_state().aggregator.dropped_samples()
    }

    /// Begin collecting. A no-op when already collecting.
    ///
    /// Clears the retention buffer and announces the state change on
    /// the session channel.
    pub fn start(&self) {
        let now = self.clock.now();
        {
            let mut state = self.lock_state();
            if state.aggregator.start(now).is_err() {
                return; // already collecting
            }
            state.buffer.clear();
        }

        self.publish_state(true, now);
    }

    /// Append one sensor reading to the open window.
    ///
    /// Returns [`SessionError::NotCollecting`] outside a session; a
    /// sensor callback racing a stop can safely ignore that.
    pub fn ingest(&self, sample: RawSample) -> Result<(), SessionError> {
        self.lock_state().aggregator.ingest(sample)
    }

    /// Reduce the current window and publish the updated snapshot.
    ///
    /// Called by the 1 s timer. Returns the emitted record, or `None`
    /// when the window was empty (no publish happens then either).
    pub fn tick(&self) -> Option<ReducedRecord> {
        let now = self.clock.now();
        let (record, snapshot) = {
            let mut state = self.lock_state();
            let record = state.aggregator.tick(now)?;
            state.buffer.push(record);
            (record, state.buffer.snapshot())
        };

        self.publish_snapshot(&snapshot, now);
        Some(record)
    }

    /// Stop collecting, flushing any remaining samples first.
    ///
    /// Publishes the final snapshot (when the flush produced a
    /// record) and then the stopped state.
    pub fn stop(&self) -> Result<Option<ReducedRecord>, SessionError> {
        let now = self.clock.now();
        let (last, snapshot) = {
            let mut state = self.lock_state();
            let last = state.aggregator.stop(now)?;
            if let Some(record) = last {
                state.buffer.push(record);
            }
            let snapshot = last.map(|_| state.buffer.snapshot());
            (last, snapshot)
        };

        if let Some(snapshot) = snapshot {
            self.publish_snapshot(&snapshot, now);
        }
        self.publish_state(false, now);
        Ok(last)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }

    fn publish_snapshot(&self, records: &[ReducedRecord], now: Timestamp) {
        let payload = match wire::encode_snapshot(records, now) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("snapshot encode failed: {err}");
                return;
            }
        };

        let mut link = self.link.lock().expect("link lock poisoned");
        if let Err(err) = link.publish_snapshot(&payload) {
            log::warn!("snapshot publish failed, retained in buffer: {err:?}");
        }
    }

    fn publish_state(&self, active: bool, now: Timestamp) {
        let payload = match wire::encode_state(SessionSignal::new(active, now)) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("state encode failed: {err}");
                return;
            }
        };

        let mut link = self.link.lock().expect("link lock poisoned");
        if let Err(err) = link.publish_state(&payload) {
            log::warn!("state publish failed: {err:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::loopback;
    use kinemetry_core::time::FixedClock;

    fn feed(session: &TelemetrySession<crate::LoopbackLink, &FixedClock>, value: f32, count: usize) {
        for i in 0..count {
            session
                .ingest(RawSample::new(i as u64, value, value, value))
                .unwrap();
        }
    }

    #[test]
    fn start_is_idempotent() {
        let (link, receiver) = loopback();
        let clock = FixedClock::new(1000);
        let session = TelemetrySession::new(link, &clock);

        session.start();
        session.start();
        assert!(session.is_collecting());

        // Only one state payload went out
        assert!(receiver.poll_state().is_some());
        assert!(receiver.poll_state().is_none());
    }

    #[test]
    fn empty_tick_publishes_nothing() {
        let (link, receiver) = loopback();
        let clock = FixedClock::new(1000);
        let session = TelemetrySession::new(link, &clock);
        session.start();

        clock.advance(1000);
        assert!(session.tick().is_none());
        assert_eq!(receiver.pending_snapshots(), 0);
    }

    #[test]
    fn tick_publishes_growing_snapshots() {
        let (link, receiver) = loopback();
        let clock = FixedClock::new(1000);
        let session = TelemetrySession::new(link, &clock);
        session.start();

        for _ in 0..3 {
            feed(&session, 1.0, 10);
            clock.advance(1000);
            assert!(session.tick().is_some());
        }

        let mut lengths = Vec::new();
        while let Some(payload) = receiver.poll_snapshot() {
            let (_, records) = crate::wire::decode_snapshot(&payload).unwrap();
            lengths.push(records.len());
        }
        assert_eq!(lengths, vec![1, 2, 3]);
    }

    #[test]
    fn stop_flushes_and_announces() {
        let (link, receiver) = loopback();
        let clock = FixedClock::new(1000);
        let session = TelemetrySession::new(link, &clock);
        session.start();
        let _ = receiver.poll_state();

        feed(&session, 3.0, 20);
        clock.advance(400);
        let last = session.stop().unwrap().unwrap();
        assert_eq!(last.x.values.mean, 3.0);
        assert_eq!(last.timestamp, 1400);
        assert!(!session.is_collecting());

        // Final snapshot carries the flushed record
        let payload = receiver.poll_snapshot().unwrap();
        let (_, records) = crate::wire::decode_snapshot(&payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, 1400);

        // And the stop state followed
        let state = crate::wire::decode_state(&receiver.poll_state().unwrap()).unwrap();
        assert!(!state.active);

        // Ingest after stop is rejected, not silently buffered
        assert_eq!(
            session.ingest(RawSample::new(0, 1.0, 1.0, 1.0)),
            Err(SessionError::NotCollecting)
        );
    }

    #[test]
    fn publish_failure_keeps_session_alive() {
        let (link, receiver) = loopback();
        let clock = FixedClock::new(1000);
        let session = TelemetrySession::new(link, &clock);
        session.start();

        // Outage: ticks keep emitting, publishes fail silently
        session.link.lock().unwrap().set_connected(false);
        for _ in 0..2 {
            feed(&session, 1.0, 5);
            clock.advance(1000);
            assert!(session.tick().is_some());
        }
        assert_eq!(receiver.pending_snapshots(), 0);

        // Recovery: the next snapshot carries the missed records too
        session.link.lock().unwrap().set_connected(true);
        feed(&session, 1.0, 5);
        clock.advance(1000);
        session.tick().unwrap();

        let payload = receiver.poll_snapshot().unwrap();
        let (_, records) = crate::wire::decode_snapshot(&payload).unwrap();
        assert_eq!(records.len(), 3);
    }
}
