//! Receiver-side metric timelines
//!
//! The presentation layer renders one chart per (axis × statistic).
//! [`Timeline`] is the store behind those charts: twelve series of
//! banded points, appended to as the merger delivers live records,
//! replaced wholesale when a reprocessed metrics log arrives, and
//! summarized into per-series means when a session finalizes.
//!
//! Points carry a dense per-session index rather than wall-clock
//! time; the x-axis of the original display is "seconds into the
//! session", reset to zero whenever a session starts.

use crate::band::Band;
use crate::record::ReducedRecord;
use crate::sample::{Axis, StatKind};

/// Number of series: three axes times four statistics.
pub const SERIES_COUNT: usize = 12;

/// One plotted point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelinePoint {
    /// Dense index within the session (seconds since start)
    pub index: u32,
    /// Statistic value
    pub value: f32,
    /// Band of the value, for per-point coloring
    pub band: Band,
}

/// Per-series session means, produced at finalize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    means: [f32; SERIES_COUNT],
}

impl SessionSummary {
    /// Mean of one series over the whole session.
    pub fn mean(&self, axis: Axis, stat: StatKind) -> f32 {
        self.means[series_index(axis, stat)]
    }
}

/// Running store of all twelve metric series.
pub struct Timeline {
    series: [Vec<TimelinePoint>; SERIES_COUNT],
    next_index: u32,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self {
            series: std::array::from_fn(|_| Vec::new()),
            next_index: 0,
        }
    }

    /// Append one record to every series.
    pub fn append(&mut self, record: &ReducedRecord) {
        let index = self.next_index;
        for axis in Axis::ALL {
            let stats = record.axis(axis);
            for stat in StatKind::ALL {
                self.series[series_index(axis, stat)].push(TimelinePoint {
                    index,
                    value: stats.value(stat),
                    band: stats.band(stat),
                });
            }
        }
        self.next_index += 1;
    }

    /// Replace everything with a reprocessed record sequence.
    ///
    /// The full-rebuild path: no merge, no watermark.
    pub fn replace_all(&mut self, records: &[ReducedRecord]) {
        self.clear();
        for record in records {
            self.append(record);
        }
    }

    /// Drop all points and restart indexing (session start).
    pub fn clear(&mut self) {
        for series in self.series.iter_mut() {
            series.clear();
        }
        self.next_index = 0;
    }

    /// Points of one series, in append order.
    pub fn series(&self, axis: Axis, stat: StatKind) -> &[TimelinePoint] {
        &self.series[series_index(axis, stat)]
    }

    /// Records appended this session.
    pub fn len(&self) -> usize {
        self.next_index as usize
    }

    /// Whether no records have been appended.
    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    /// Per-series means for the end-of-session view.
    ///
    /// Empty series summarize to 0.0, matching an empty chart.
    pub fn summary(&self) -> SessionSummary {
        let mut means = [0.0f32; SERIES_COUNT];
        for (slot, series) in means.iter_mut().zip(self.series.iter()) {
            if series.is_empty() {
                continue;
            }
            let sum: f64 = series.iter().map(|p| p.value as f64).sum();
            *slot = (sum / series.len() as f64) as f32;
        }
        SessionSummary { means }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

fn series_index(axis: Axis, stat: StatKind) -> usize {
    axis as usize * StatKind::ALL.len() + stat as usize
}
