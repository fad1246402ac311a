//! Reduced telemetry records
//!
//! A [`ReducedRecord`] is the atomic unit of telemetry, retention and
//! chart input: one window's twelve statistics (four per axis), the
//! band of each, and the emission timestamp. Records are `Copy`,
//! immutable once built, and strictly monotonic in timestamp per
//! producing aggregator.

use crate::band::Band;
use crate::sample::{Axis, StatKind};
use crate::stats::{self, AxisSummary};
use crate::time::Timestamp;

/// Band of each statistic of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisBands {
    /// Band of the mean
    pub mean: Band,
    /// Band of the minimum
    pub min: Band,
    /// Band of the maximum
    pub max: Band,
    /// Band of the standard deviation
    pub std: Band,
}

/// One axis' summary statistics plus the band of each.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisStat {
    /// The four window statistics
    pub values: AxisSummary,
    /// Band classification of each statistic
    pub bands: AxisBands,
}

impl AxisStat {
    /// Classify every statistic of a summary.
    ///
    /// The only way bands enter a record: files never persist them
    /// and the reload path comes back through here.
    pub fn from_summary(values: AxisSummary) -> Self {
        Self {
            bands: AxisBands {
                mean: Band::classify(values.mean),
                min: Band::classify(values.min),
                max: Band::classify(values.max),
                std: Band::classify(values.std),
            },
            values,
        }
    }

    /// Value of one statistic.
    pub const fn value(&self, stat: StatKind) -> f32 {
        match stat {
            StatKind::Mean => self.values.mean,
            StatKind::Min => self.values.min,
            StatKind::Max => self.values.max,
            StatKind::Std => self.values.std,
        }
    }

    /// Band of one statistic.
    pub const fn band(&self, stat: StatKind) -> Band {
        match stat {
            StatKind::Mean => self.bands.mean,
            StatKind::Min => self.bands.min,
            StatKind::Max => self.bands.max,
            StatKind::Std => self.bands.std,
        }
    }
}

/// One second of reduced 3-axis telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReducedRecord {
    /// Emission time in milliseconds since epoch
    pub timestamp: Timestamp,
    /// X-axis statistics
    pub x: AxisStat,
    /// Y-axis statistics
    pub y: AxisStat,
    /// Z-axis statistics
    pub z: AxisStat,
}

impl ReducedRecord {
    /// Reduce three axis buffers into one record stamped `timestamp`.
    ///
    /// Returns `None` when the window is empty (the emission-skip
    /// rule). The three buffers are filled in lockstep by the
    /// aggregator, so either all reduce or none do.
    pub fn from_axes(timestamp: Timestamp, x: &[f32], y: &[f32], z: &[f32]) -> Option<Self> {
        Some(Self {
            timestamp,
            x: AxisStat::from_summary(stats::summarize(x)?),
            y: AxisStat::from_summary(stats::summarize(y)?),
            z: AxisStat::from_summary(stats::summarize(z)?),
        })
    }

    /// Rebuild a record from bare summaries, reclassifying every band.
    ///
    /// Used when loading metrics files, which persist only the floats.
    pub fn from_summaries(
        timestamp: Timestamp,
        x: AxisSummary,
        y: AxisSummary,
        z: AxisSummary,
    ) -> Self {
        Self {
            timestamp,
            x: AxisStat::from_summary(x),
            y: AxisStat::from_summary(y),
            z: AxisStat::from_summary(z),
        }
    }

    /// Statistics of one axis.
    pub const fn axis(&self, axis: Axis) -> &AxisStat {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_values() {
        let stat = AxisStat::from_summary(AxisSummary {
            mean: 5.0,
            min: 0.0,
            max: 10.0,
            std: 5.0,
        });

        assert_eq!(stat.bands.mean, Band::High);
        assert_eq!(stat.bands.min, Band::Mid);
        assert_eq!(stat.bands.max, Band::High);
        assert_eq!(stat.bands.std, Band::High);
    }

    #[test]
    fn empty_axis_skips_record() {
        assert!(ReducedRecord::from_axes(1000, &[], &[], &[]).is_none());
    }

    #[test]
    fn record_from_buffers() {
        let record = ReducedRecord::from_axes(2000, &[1.0, 3.0], &[-5.0, -5.0], &[0.0, 0.0])
            .unwrap();

        assert_eq!(record.timestamp, 2000);
        assert_eq!(record.x.values.mean, 2.0);
        assert_eq!(record.y.bands.mean, Band::Low);
        assert_eq!(record.axis(Axis::Z).values.std, 0.0);
    }

    #[test]
    fn stat_addressing_matches_fields() {
        let record = ReducedRecord::from_axes(1, &[2.0], &[4.0], &[8.0]).unwrap();
        let x = record.axis(Axis::X);
        assert_eq!(x.value(StatKind::Mean), x.values.mean);
        assert_eq!(x.band(StatKind::Max), x.bands.max);
    }
}
