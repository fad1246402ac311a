//! Property tests for the reducer and the classifier

use kinemetry_core::{summarize, Band};
use proptest::prelude::*;

proptest! {
    /// Extremes always bracket the mean and deviation is non-negative.
    #[test]
    fn extremes_bracket_mean(values in prop::collection::vec(-50.0f32..50.0, 1..200)) {
        let summary = summarize(&values).unwrap();
        prop_assert!(summary.min <= summary.mean);
        prop_assert!(summary.mean <= summary.max);
        prop_assert!(summary.std >= 0.0);
    }

    /// A constant window has zero deviation and collapsed extremes.
    #[test]
    fn constant_window_collapses(v in -20.0f32..20.0, len in 1usize..100) {
        let values = vec![v; len];
        let summary = summarize(&values).unwrap();
        prop_assert_eq!(summary.min, v);
        prop_assert_eq!(summary.max, v);
        prop_assert!(summary.std.abs() < 1e-4);
    }

    /// Every float, including NaN and the infinities, lands in
    /// exactly the band its comparisons dictate.
    #[test]
    fn band_partition_is_total(v in prop::num::f32::ANY) {
        let band = Band::classify(v);
        if v < -4.0 {
            prop_assert_eq!(band, Band::Low);
        } else if v > 4.0 {
            prop_assert_eq!(band, Band::High);
        } else {
            prop_assert_eq!(band, Band::Mid);
        }
    }

    /// Band wire codes survive the round trip.
    #[test]
    fn band_codes_round_trip(v in prop::num::f32::NORMAL) {
        let band = Band::classify(v);
        prop_assert_eq!(Band::from_code(band.code()), Some(band));
    }
}
