//! Offline reprocessing of raw logs
//!
//! ## Overview
//!
//! [`ReplayEngine`] applies the live reduction to a complete recorded
//! raw-sample log and regenerates the equivalent sequence of reduced
//! records. Unlike the live path there is no watermark and no merge:
//! the output replaces whatever session state existed, wholesale.
//!
//! ## Window boundaries
//!
//! Live windows are cut by the timer; offline windows are cut by the
//! sample timestamps themselves, at a nominal boundary of
//! [`WINDOW_BOUNDARY_MS`]. A sample whose timestamp is at least one
//! boundary past the window start first triggers an emission of the
//! window accumulated before it and then opens the next window — the
//! boundary-crossing sample belongs to the new window, matching the
//! tick semantics where the sample that triggers rollover starts
//! fresh accumulation.
//!
//! End of input always flushes the final partial window, even when it
//! is shorter than the boundary; a recorded session's trailing second
//! is never discarded.

use std::io;
use std::path::Path;

use crate::logfile::{MetricsWriter, RawLogStream};
use crate::merge::RecordSink;
use crate::record::ReducedRecord;
use crate::stream::{SampleStream, StreamError};
use crate::time::{Clock, Timestamp};

/// Nominal window length for timestamp-cut boundaries.
pub const WINDOW_BOUNDARY_MS: u64 = 1000;

/// Outcome of one replay run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// Samples consumed from the stream
    pub samples: usize,
    /// Records emitted
    pub records: usize,
    /// Malformed rows skipped by the underlying log stream
    pub lines_skipped: usize,
}

impl ReplayReport {
    /// True when the log held no data rows — nothing to process,
    /// which is a normal outcome rather than an error.
    pub const fn is_empty(&self) -> bool {
        self.samples == 0
    }
}

/// Reprocessor from a raw-sample stream to reduced records.
pub struct ReplayEngine<C: Clock> {
    boundary_ms: u64,
    clock: C,
}

impl<C: Clock> ReplayEngine<C> {
    /// Engine with the nominal 1 s boundary.
    pub fn new(clock: C) -> Self {
        Self {
            boundary_ms: WINDOW_BOUNDARY_MS,
            clock,
        }
    }

    /// Override the window boundary (tests, non-standard logs).
    pub fn with_boundary(mut self, boundary_ms: u64) -> Self {
        self.boundary_ms = boundary_ms;
        self
    }

    /// Drive `stream` to exhaustion, delivering one record per window
    /// to `sink`.
    ///
    /// Records are stamped from the engine's clock, like the live
    /// path stamps from the emission clock. Transport errors abort
    /// the run; exhaustion triggers the unconditional final flush.
    pub fn process<S, K>(
        &mut self,
        stream: &mut S,
        sink: &mut K,
    ) -> Result<ReplayReport, StreamError<S::Error>>
    where
        S: SampleStream,
        K: RecordSink,
    {
        let mut x: Vec<f32> = Vec::new();
        let mut y: Vec<f32> = Vec::new();
        let mut z: Vec<f32> = Vec::new();
        let mut window_start: Option<Timestamp> = None;
        let mut report = ReplayReport::default();

        loop {
            let sample = match stream.poll_next() {
                Ok(sample) => sample,
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(StreamError::EndOfStream)) => break,
                Err(nb::Error::Other(err)) => return Err(err),
            };
            report.samples += 1;

            let start = *window_start.get_or_insert(sample.timestamp);
            if sample.timestamp.saturating_sub(start) >= self.boundary_ms {
                if let Some(record) =
                    ReducedRecord::from_axes(self.clock.now(), &x, &y, &z)
                {
                    sink.deliver(&record);
                    report.records += 1;
                }
                x.clear();
                y.clear();
                z.clear();
                window_start = Some(sample.timestamp);
            }

            x.push(sample.x);
            y.push(sample.y);
            z.push(sample.z);
        }

        // Final flush is unconditional: a partial trailing window
        // still becomes a record
        if let Some(record) = ReducedRecord::from_axes(self.clock.now(), &x, &y, &z) {
            sink.deliver(&record);
            report.records += 1;
        }

        Ok(report)
    }
}

/// Reprocess a raw CSV log into a metrics CSV.
///
/// Convenience over [`ReplayEngine::process`] wired to
/// [`RawLogStream`] and [`MetricsWriter`]. Malformed rows are counted
/// in the report; a log with no data rows produces an empty metrics
/// file and an empty report.
pub fn reprocess_file<C: Clock>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    clock: C,
) -> Result<ReplayReport, StreamError<io::Error>> {
    let mut stream = RawLogStream::open(input)?;
    let mut writer = MetricsWriter::create(output).map_err(StreamError::Transport)?;

    let mut write_error: Option<io::Error> = None;
    let mut sink = |record: &ReducedRecord| {
        if write_error.is_none() {
            if let Err(err) = writer.append(record) {
                write_error = Some(err);
            }
        }
    };

    let mut engine = ReplayEngine::new(clock);
    let mut report = engine.process(&mut stream, &mut sink)?;

    if let Some(err) = write_error {
        return Err(StreamError::Transport(err));
    }
    writer.flush().map_err(StreamError::Transport)?;

    report.lines_skipped = stream.stats().parse_errors;
    if report.is_empty() {
        log::warn!("raw log contained no data rows; nothing to process");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::RawSample;
    use crate::stream::MemoryStream;
    use crate::time::FixedClock;

    fn run(samples: &[RawSample]) -> (ReplayReport, Vec<ReducedRecord>) {
        let mut stream = MemoryStream::new(samples);
        let mut engine = ReplayEngine::new(FixedClock::new(99_000));
        let mut out = Vec::new();
        let report = engine
            .process(&mut stream, &mut |r: &ReducedRecord| out.push(*r))
            .unwrap();
        (report, out)
    }

    #[test]
    fn empty_stream_is_empty_report() {
        let (report, out) = run(&[]);
        assert!(report.is_empty());
        assert_eq!(report.records, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn partial_window_is_flushed() {
        let samples: Vec<_> = (0..30u64)
            .map(|i| RawSample::new(i * 10, 1.0, 2.0, 3.0))
            .collect();

        let (report, out) = run(&samples);
        assert_eq!(report.samples, 30);
        assert_eq!(report.records, 1);
        assert_eq!(out[0].x.values.mean, 1.0);
        assert_eq!(out[0].timestamp, 99_000);
    }

    #[test]
    fn boundary_sample_opens_next_window() {
        // Samples at 0..999 ms, then one exactly at the boundary
        let mut samples: Vec<_> = (0..1000u64)
            .map(|i| RawSample::new(i, 1.0, 1.0, 1.0))
            .collect();
        samples.push(RawSample::new(1000, 100.0, 100.0, 100.0));

        let (report, out) = run(&samples);
        assert_eq!(report.records, 2);
        // First window excludes the boundary-crossing sample
        assert_eq!(out[0].x.values.max, 1.0);
        // which instead forms the flushed second window on its own
        assert_eq!(out[1].x.values.mean, 100.0);
    }
}
