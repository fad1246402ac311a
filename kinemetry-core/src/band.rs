//! Coarse banding of window statistics
//!
//! Every statistic a window produces is classified into one of three
//! bands against fixed thresholds in g-units. The partition drives
//! all downstream labeling and coloring, so the thresholds are
//! reproduced exactly and this module is the only place the
//! comparison lives: the live path, the wire decode path and the
//! metrics-file reload path all classify through [`Band::classify`].

/// Values strictly below this bound classify as [`Band::Low`].
pub const LOW_THRESHOLD: f32 = -4.0;

/// Values strictly above this bound classify as [`Band::High`].
pub const HIGH_THRESHOLD: f32 = 4.0;

/// Coarse classification of a scalar statistic.
///
/// Wire and storage use the `u8` codes 0/1/2; they are part of the
/// external contract and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Band {
    /// Below `LOW_THRESHOLD`
    Low = 0,
    /// Between the thresholds, inclusive
    Mid = 1,
    /// Above `HIGH_THRESHOLD`
    High = 2,
}

impl Band {
    /// Classify a statistic.
    ///
    /// Both comparisons are strict: the boundary values −4.0 and 4.0
    /// are `Mid`, and NaN (which fails both comparisons) falls
    /// through to `Mid` as well.
    pub fn classify(value: f32) -> Self {
        if value < LOW_THRESHOLD {
            Band::Low
        } else if value > HIGH_THRESHOLD {
            Band::High
        } else {
            Band::Mid
        }
    }

    /// Wire code for this band.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Band::Low),
            1 => Some(Band::Mid),
            2 => Some(Band::High),
            _ => None,
        }
    }

    /// Human-readable name.
    pub const fn name(&self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Mid => "mid",
            Band::High => "high",
        }
    }
}
