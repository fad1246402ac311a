//! End-to-end relay scenarios over the loopback link
//!
//! Producer and receiver run in one process with a hand-driven clock
//! and timer, which makes delivery gaps, duplications and session
//! boundaries exact rather than timing-dependent.

use kinemetry_core::time::FixedClock;
use kinemetry_core::{Axis, Clock, RawSample, StatKind};
use kinemetry_relay::{loopback, LoopbackLink, LoopbackReceiver, TelemetryReceiver, TelemetrySession};

struct Harness<'c> {
    session: TelemetrySession<LoopbackLink, &'c FixedClock>,
    transport: LoopbackReceiver,
    receiver: TelemetryReceiver,
    clock: &'c FixedClock,
}

impl<'c> Harness<'c> {
    fn new(clock: &'c FixedClock) -> Self {
        let (link, transport) = loopback();
        Self {
            session: TelemetrySession::new(link, clock),
            transport,
            receiver: TelemetryReceiver::new(),
            clock,
        }
    }

    /// One second of collection: `count` samples, then a tick.
    fn second(&self, value: f32, count: usize) {
        let base = self.clock.now();
        for i in 0..count {
            let _ = self
                .session
                .ingest(RawSample::new(base + i as u64 * 10, value, value, value));
        }
        self.clock.advance(1000);
        let _ = self.session.tick();
    }

    /// Deliver everything queued on the transport to the receiver.
    fn drain(&mut self) -> usize {
        let mut new_records = 0;
        while let Some(payload) = self.transport.poll_state() {
            self.receiver.apply_state(&payload).unwrap();
        }
        while let Some(payload) = self.transport.poll_snapshot() {
            new_records += self.receiver.ingest_snapshot(&payload).unwrap();
        }
        new_records
    }
}

#[test]
fn live_session_flows_to_the_timeline() {
    let clock = FixedClock::new(1_000_000);
    let mut harness = Harness::new(&clock);

    harness.session.start();
    for second in 1..=5 {
        harness.second(second as f32, 100);
    }

    let new_records = harness.drain();
    assert_eq!(new_records, 5);
    assert!(harness.receiver.is_collecting());

    let timeline = harness.receiver.timeline();
    assert_eq!(timeline.len(), 5);

    let means = timeline.series(Axis::X, StatKind::Mean);
    let values: Vec<f32> = means.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn outage_recovers_from_snapshot_overlap() {
    let clock = FixedClock::new(1_000_000);
    let mut harness = Harness::new(&clock);

    harness.session.start();
    harness.second(1.0, 50);
    harness.drain();

    // Transport goes down for three windows
    harness.transport.set_connected(false);
    for _ in 0..3 {
        harness.second(2.0, 50);
    }
    assert_eq!(harness.drain(), 0);

    // Back up: the next snapshot replays the missed records
    harness.transport.set_connected(true);
    harness.second(3.0, 50);
    assert_eq!(harness.drain(), 4);
    assert_eq!(harness.receiver.timeline().len(), 5);
}

#[test]
fn duplicated_and_reordered_payloads_merge_exactly_once() {
    let clock = FixedClock::new(1_000_000);
    let mut harness = Harness::new(&clock);

    harness.session.start();
    for second in 1..=4 {
        harness.second(second as f32, 20);
    }

    // Collect raw payloads and deliver them shuffled and duplicated
    let mut payloads = Vec::new();
    while let Some(p) = harness.transport.poll_snapshot() {
        payloads.push(p);
    }
    payloads.reverse();
    let duplicates = payloads.clone();

    let mut delivered = 0;
    for payload in payloads.iter().chain(duplicates.iter()) {
        delivered += harness.receiver.ingest_snapshot(payload).unwrap();
    }

    assert_eq!(delivered, 4);
    assert_eq!(harness.receiver.timeline().len(), 4);

    // Chronological order survived the reordering
    let means = harness.receiver.timeline().series(Axis::X, StatKind::Mean);
    let values: Vec<f32> = means.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn restart_after_clock_rollback_is_a_fresh_session() {
    let clock = FixedClock::new(5_000_000);
    let mut harness = Harness::new(&clock);

    // First session far in the future
    harness.session.start();
    harness.second(1.0, 10);
    harness.session.stop().unwrap();
    harness.drain();
    assert!(!harness.receiver.is_collecting());
    let old_watermark = harness.receiver.watermark();

    // Clock rolls back between sessions
    clock.set(10_000);
    harness.session.start();
    harness.second(2.0, 10);

    let new_records = harness.drain();
    assert_eq!(new_records, 1);
    assert!(harness.receiver.watermark() < old_watermark);

    // The restarted session begins with a clean timeline
    assert_eq!(harness.receiver.timeline().len(), 1);
    assert_eq!(
        harness.receiver.timeline().series(Axis::X, StatKind::Mean)[0].value,
        2.0
    );
}

#[test]
fn stop_delivers_the_partial_final_window() {
    let clock = FixedClock::new(1_000_000);
    let mut harness = Harness::new(&clock);

    harness.session.start();
    harness.second(1.0, 100);

    // Half a second of samples, then stop without a tick
    let base = clock.now();
    for i in 0..50 {
        harness
            .session
            .ingest(RawSample::new(base + i * 10, 4.0, 4.0, 4.0))
            .unwrap();
    }
    clock.advance(500);
    let last = harness.session.stop().unwrap().unwrap();
    assert_eq!(last.x.values.mean, 4.0);

    harness.drain();
    assert!(!harness.receiver.is_collecting());
    assert_eq!(harness.receiver.timeline().len(), 2);

    let summary = harness.receiver.summary();
    assert_eq!(summary.mean(Axis::X, StatKind::Mean), 2.5);
}
