//! Live window aggregation
//!
//! ## Overview
//!
//! [`WindowAggregator`] accumulates raw samples arriving at sensor
//! rate and reduces them to one [`ReducedRecord`] per timer tick.
//! The tick itself is driven from outside the core (a 1 s periodic
//! timer in production, explicit calls in tests); each tick simply
//! reduces whatever accumulated since the last one, so timer jitter
//! shifts window edges without dropping data.
//!
//! ## State machine
//!
//! ```text
//!        start()              stop()
//! Idle ──────────► Collecting ──────► Idle
//!                  │        ▲
//!                  ingest() │ tick()
//!                  └────────┘
//! ```
//!
//! `ingest` outside `Collecting` is an error; `tick` outside it is a
//! silent no-op so a still-running timer cannot resurrect a stopped
//! session.
//!
//! ## Empty windows
//!
//! A tick that finds no samples emits nothing and leaves the buffers
//! untouched: the next emission covers everything accumulated since
//! the last one. This is the deliberate no-data-this-second policy,
//! not a failure.
//!
//! ## Synchronization
//!
//! The aggregator itself is a single-owner state machine with no
//! interior locking. The two concurrent paths that share it in a live
//! session (sensor callbacks and the timer) must wrap it in one lock
//! so that append and drain-and-clear are each atomic; the relay
//! crate's session type does exactly that.

use heapless::Vec;

use crate::errors::SessionError;
use crate::record::ReducedRecord;
use crate::sample::RawSample;
use crate::time::Timestamp;

/// Per-axis accumulation capacity.
///
/// 256 samples is ~2.5 s at the nominal 100 Hz rate, reachable only
/// when ticks stall. Samples past the bound are dropped and counted.
pub const MAX_WINDOW_SAMPLES: usize = 256;

/// Aggregator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    /// No session; samples are rejected
    Idle,
    /// Session running; samples accumulate between ticks
    Collecting,
}

/// Stateful reducer from a raw sample stream to one record per tick.
pub struct WindowAggregator {
    state: AggregatorState,
    x: Vec<f32, MAX_WINDOW_SAMPLES>,
    y: Vec<f32, MAX_WINDOW_SAMPLES>,
    z: Vec<f32, MAX_WINDOW_SAMPLES>,
    window_start: Timestamp,
    dropped: u32,
}

impl WindowAggregator {
    /// Create an idle aggregator.
    pub const fn new() -> Self {
        Self {
            state: AggregatorState::Idle,
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            window_start: 0,
            dropped: 0,
        }
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> AggregatorState {
        self.state
    }

    /// Whether a session is running.
    pub const fn is_collecting(&self) -> bool {
        matches!(self.state, AggregatorState::Collecting)
    }

    /// Samples accumulated since the last emission.
    pub fn sample_count(&self) -> usize {
        self.x.len()
    }

    /// Start of the window currently accumulating.
    pub const fn window_start(&self) -> Timestamp {
        self.window_start
    }

    /// Samples dropped because the window buffers were full.
    pub const fn dropped_samples(&self) -> u32 {
        self.dropped
    }

    /// Begin a collection session.
    ///
    /// Clears all accumulation state and opens a window at `now`.
    pub fn start(&mut self, now: Timestamp) -> Result<(), SessionError> {
        if self.is_collecting() {
            return Err(SessionError::AlreadyCollecting);
        }

        self.x.clear();
        self.y.clear();
        self.z.clear();
        self.window_start = now;
        self.dropped = 0;
        self.state = AggregatorState::Collecting;
        Ok(())
    }

    /// Append one sample to the open window.
    ///
    /// All three axes are appended together, so the per-axis buffers
    /// never disagree on length. A full window drops the sample whole
    /// and counts it instead of truncating one axis.
    pub fn ingest(&mut self, sample: RawSample) -> Result<(), SessionError> {
        if !self.is_collecting() {
            return Err(SessionError::NotCollecting);
        }

        if self.x.push(sample.x).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            return Ok(());
        }
        // x fit, so y and z fit too: the buffers share a capacity and
        // only ever grow in lockstep
        let _ = self.y.push(sample.y);
        let _ = self.z.push(sample.z);
        Ok(())
    }

    /// Reduce the open window, if it holds any samples.
    ///
    /// Emits one record stamped `now` and opens a fresh window, or
    /// returns `None` (leaving accumulation untouched) when nothing
    /// arrived since the last emission. No-op while idle.
    pub fn tick(&mut self, now: Timestamp) -> Option<ReducedRecord> {
        if !self.is_collecting() {
            return None;
        }
        self.emit(now)
    }

    /// End the session with a guaranteed final flush.
    ///
    /// Any samples still buffered become one last record; afterwards
    /// the aggregator is idle and no further emission can occur.
    pub fn stop(&mut self, now: Timestamp) -> Result<Option<ReducedRecord>, SessionError> {
        if !self.is_collecting() {
            return Err(SessionError::NotCollecting);
        }

        let last = self.emit(now);
        self.state = AggregatorState::Idle;
        Ok(last)
    }

    fn emit(&mut self, now: Timestamp) -> Option<ReducedRecord> {
        if self.x.is_empty() {
            return None;
        }

        let record = ReducedRecord::from_axes(now, &self.x, &self.y, &self.z);
        self.x.clear();
        self.y.clear();
        self.z.clear();
        self.window_start = now;
        record
    }
}

impl Default for WindowAggregator {
    fn default() -> Self {
        Self::new()
    }
}
