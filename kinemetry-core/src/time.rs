//! Clock abstraction for record stamping
//!
//! Emitted records carry the emission-time clock, not sample
//! timestamps, so every component that emits takes a [`Clock`] (or an
//! explicit `now`) instead of reading time on its own. Production
//! code uses [`SystemClock`]; tests and simulations use
//! [`FixedClock`] and advance it by hand.

/// Timestamp in milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Source of timestamps for emitted records.
pub trait Clock {
    /// Current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall-clock time source (requires `std`).
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Manually advanced time source for tests and simulations.
///
/// Interior mutability lets a session hold `&FixedClock` while the
/// test driving it keeps advancing the same clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    timestamp: core::cell::Cell<Timestamp>,
}

impl FixedClock {
    /// Create a clock pinned at `timestamp`.
    pub const fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: core::cell::Cell::new(timestamp),
        }
    }

    /// Move the clock to an absolute timestamp.
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Advance the clock by `ms` milliseconds.
    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get() + ms);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }
}
