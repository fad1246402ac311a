//! Windowed accelerometer telemetry core
//!
//! Reduces a high-rate 3-axis accelerometer stream on a wearable to
//! one summary record per second, retains a one-minute transmission
//! window to ride out delivery gaps, and merges possibly-overlapping
//! snapshot deliveries behind a monotonic watermark on the companion
//! side. An offline engine reprocesses recorded raw logs into the
//! same record shape.
//!
//! Key constraints:
//! - Reduction and retention run on the watch; no heap in those paths
//! - Publishes are fire-and-forget; a slow transport never skews the
//!   window timer
//! - Every band classification in the system goes through one
//!   function
//!
//! ```
//! use kinemetry_core::{RawSample, WindowAggregator};
//!
//! let mut aggregator = WindowAggregator::new();
//! aggregator.start(0).unwrap();
//!
//! for i in 0..100 {
//!     aggregator.ingest(RawSample::new(i * 10, 0.1, -0.2, 9.8)).unwrap();
//! }
//!
//! // The 1 s timer drives emission; here we tick by hand
//! let record = aggregator.tick(1000).unwrap();
//! assert_eq!(record.x.values.mean, 0.1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod band;
pub mod errors;
pub mod merge;
pub mod record;
pub mod ring;
pub mod sample;
pub mod session;
pub mod stats;
pub mod stream;
pub mod time;
pub mod window;

#[cfg(feature = "std")]
pub mod logfile;
#[cfg(feature = "std")]
pub mod profile;
#[cfg(feature = "std")]
pub mod replay;
#[cfg(feature = "std")]
pub mod timeline;

// Public API
pub use band::Band;
pub use errors::SessionError;
pub use merge::{RecordSink, WatermarkMerger, WATERMARK_SENTINEL};
pub use record::{AxisBands, AxisStat, ReducedRecord};
pub use ring::{TransmissionBuffer, TRANSMISSION_WINDOW};
pub use sample::{Axis, RawSample, StatKind};
pub use session::{SessionSignal, SessionTracker, SessionTransition};
pub use stats::{summarize, AxisSummary};
pub use time::{Clock, Timestamp};
pub use window::{AggregatorState, WindowAggregator};

#[cfg(feature = "std")]
pub use profile::UserProfile;
#[cfg(feature = "std")]
pub use replay::{ReplayEngine, ReplayReport};
#[cfg(feature = "std")]
pub use time::SystemClock;
#[cfg(feature = "std")]
pub use timeline::{SessionSummary, Timeline};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
