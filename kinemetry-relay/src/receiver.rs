//! Companion-side telemetry receiver
//!
//! [`TelemetryReceiver`] is the single apply point for everything
//! that arrives from the producer: session-state payloads and
//! snapshot payloads, in whatever order the transport hands them
//! over. Session resets and snapshot merges run on the same receiver
//! in call order, so a reset is always visible to every later ingest
//! — the sequencing the watermark protocol requires.
//!
//! Merged records feed the [`Timeline`]; a session-stop transition
//! exposes the finalize hook (the per-series summary); a reprocessed
//! metrics log replaces the timeline wholesale, bypassing the
//! watermark entirely.

use kinemetry_core::{
    ReducedRecord, SessionSummary, SessionTracker, SessionTransition, Timeline, Timestamp,
    WatermarkMerger,
};

use crate::{wire, RelayError};

/// Companion-side composition: merger, session tracker and timeline.
pub struct TelemetryReceiver {
    merger: WatermarkMerger,
    tracker: SessionTracker,
    timeline: Timeline,
}

impl TelemetryReceiver {
    /// Create a receiver with no session active.
    pub fn new() -> Self {
        Self {
            merger: WatermarkMerger::new(),
            tracker: SessionTracker::new(),
            timeline: Timeline::new(),
        }
    }

    /// Decode and merge one snapshot payload.
    ///
    /// Returns how many records were new; duplicates and overlaps
    /// merge to zero. Safe to call with the same payload repeatedly.
    pub fn ingest_snapshot(&mut self, payload: &[u8]) -> Result<usize, RelayError> {
        let (_published_at, mut records) = wire::decode_snapshot(payload)?;

        let Self {
            merger, timeline, ..
        } = self;
        let delivered = merger.ingest(&mut records, &mut |record: &ReducedRecord| {
            timeline.append(record)
        });

        if delivered > 0 {
            log::debug!("merged {delivered} new records");
        }
        Ok(delivered)
    }

    /// Apply one session-state payload.
    ///
    /// A start transition clears the timeline and resets the
    /// watermark before any further ingest; a stop transition is
    /// returned so the caller can run its finalize hook (typically
    /// [`summary`](Self::summary)). Stale and repeated signals return
    /// `None` and change nothing.
    pub fn apply_state(&mut self, payload: &[u8]) -> Result<Option<SessionTransition>, RelayError> {
        let signal = wire::decode_state(payload)?;
        let transition = self.tracker.apply(signal);

        if let Some(SessionTransition::Started) = transition {
            self.merger.reset();
            self.timeline.clear();
            log::debug!("session started, receiver state reset");
        }

        Ok(transition)
    }

    /// Replace the timeline from a reprocessed metrics log.
    ///
    /// The full-rebuild path: no merge, no watermark, the previous
    /// contents are discarded.
    pub fn load_metrics(&mut self, records: &[ReducedRecord]) {
        self.timeline.replace_all(records);
    }

    /// The running per-metric series.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Per-series means over the current session.
    pub fn summary(&self) -> SessionSummary {
        self.timeline.summary()
    }

    /// Whether the producer is collecting, per the state channel.
    pub fn is_collecting(&self) -> bool {
        self.tracker.is_active()
    }

    /// Highest record timestamp processed so far.
    pub fn watermark(&self) -> Timestamp {
        self.merger.watermark()
    }
}

impl Default for TelemetryReceiver {
    fn default() -> Self {
        Self::new()
    }
}
