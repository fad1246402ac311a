//! Simulated live session over the loopback link
//!
//! Drives a producer session with a hand-advanced clock and a
//! synthetic 100 Hz motion signal, relays snapshots to a receiver,
//! and prints the timeline as it grows.
//!
//! Run with: cargo run --example live_loopback

use kinemetry_core::time::FixedClock;
use kinemetry_core::{Axis, Clock, RawSample, StatKind};
use kinemetry_relay::{loopback, TelemetryReceiver, TelemetrySession};

fn main() {
    let clock = FixedClock::new(1_714_650_000_000);
    let (link, transport) = loopback();
    let session = TelemetrySession::new(link, &clock);
    let mut receiver = TelemetryReceiver::new();

    session.start();

    for second in 0..12u64 {
        // Calm wrist for 8 s, then vigorous shaking
        let amplitude = if second < 8 { 1.0 } else { 7.5 };
        let base = clock.now();
        for i in 0..100u64 {
            let t = (second * 100 + i) as f32 / 100.0;
            let sample = RawSample::new(
                base + i * 10,
                (t * 4.0).sin() * amplitude,
                (t * 2.6).cos() * amplitude,
                9.81 + (t * 9.0).sin() * 0.3,
            );
            let _ = session.ingest(sample);
        }

        clock.advance(1000);
        let _ = session.tick();

        // Companion side: drain whatever the transport delivered
        while let Some(payload) = transport.poll_state() {
            receiver.apply_state(&payload).expect("state payload");
        }
        while let Some(payload) = transport.poll_snapshot() {
            receiver.ingest_snapshot(&payload).expect("snapshot payload");
        }

        if let Some(point) = receiver
            .timeline()
            .series(Axis::X, StatKind::Std)
            .last()
        {
            println!(
                "t+{:>2}s  x std {:>5.2}  band {}",
                point.index,
                point.value,
                point.band.name()
            );
        }
    }

    let _ = session.stop().expect("session was collecting");
    while let Some(payload) = transport.poll_state() {
        receiver.apply_state(&payload).expect("state payload");
    }

    let summary = receiver.summary();
    println!(
        "session over: {} records, avg x std {:.2}, avg z mean {:.2}",
        receiver.timeline().len(),
        summary.mean(Axis::X, StatKind::Std),
        summary.mean(Axis::Z, StatKind::Mean),
    );
}
