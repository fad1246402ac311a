//! Per-axis window reduction
//!
//! Reduces one axis' samples for one window to mean, extrema and
//! population standard deviation. Accumulation runs in `f64` and the
//! results are narrowed to `f32` at the end, so a window of a few
//! hundred readings does not lose precision to running `f32` sums.
//!
//! The standard deviation divides by N, not N−1: each window is the
//! entire population of interest, not a sample from a larger one.

use libm::sqrt;

/// Summary statistics for one axis over one window.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisSummary {
    /// Arithmetic mean of the window
    pub mean: f32,
    /// Smallest value in the window
    pub min: f32,
    /// Largest value in the window
    pub max: f32,
    /// Population standard deviation (divide by N)
    pub std: f32,
}

/// Reduce one axis buffer to its summary statistics.
///
/// Returns `None` on an empty slice; the aggregator enforces the
/// emission-skip rule by not emitting a record at all in that case,
/// so a `None` here never turns into a half-filled record.
pub fn summarize(values: &[f32]) -> Option<AxisSummary> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mut sum = 0.0f64;
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;

    for &v in values {
        sum += v as f64;
        min = min.min(v);
        max = max.max(v);
    }

    let mean = sum / n;

    let mut variance = 0.0f64;
    for &v in values {
        let delta = v as f64 - mean;
        variance += delta * delta;
    }

    Some(AxisSummary {
        mean: mean as f32,
        min,
        max,
        std: sqrt(variance / n) as f32,
    })
}
