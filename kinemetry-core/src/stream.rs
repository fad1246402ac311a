//! Non-blocking raw-sample streams
//!
//! Sources of recorded samples for offline reprocessing implement
//! [`SampleStream`]: a non-blocking `poll_next` in the `nb` style, so
//! the same consumer loop drives an in-memory fixture and a
//! buffered file reader. End of input is an error variant rather
//! than an `Option` so transport failures and exhaustion flow
//! through one channel.

use crate::sample::RawSample;

/// Errors from a sample stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError<E> {
    /// Transport-level error (e.g. I/O failure)
    Transport(E),
    /// Data could not be interpreted
    Format(&'static str),
    /// Input exhausted
    EndOfStream,
}

/// Pull-based source of raw samples.
pub trait SampleStream {
    /// Transport error type.
    type Error;

    /// Poll for the next sample.
    ///
    /// Returns `nb::Error::WouldBlock` when no sample is ready yet
    /// and `StreamError::EndOfStream` once the source is exhausted.
    fn poll_next(&mut self) -> nb::Result<RawSample, StreamError<Self::Error>>;

    /// Bounds on remaining samples, `(lower, upper)`.
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}

/// Stream over a slice of samples, for tests and simulations.
pub struct MemoryStream<'a> {
    samples: &'a [RawSample],
    position: usize,
}

impl<'a> MemoryStream<'a> {
    /// Stream the given samples in order.
    pub const fn new(samples: &'a [RawSample]) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    /// Rewind to the first sample.
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

impl SampleStream for MemoryStream<'_> {
    type Error = core::convert::Infallible;

    fn poll_next(&mut self) -> nb::Result<RawSample, StreamError<Self::Error>> {
        match self.samples.get(self.position) {
            Some(sample) => {
                self.position += 1;
                Ok(*sample)
            }
            None => Err(nb::Error::Other(StreamError::EndOfStream)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.samples.len() - self.position;
        (remaining, Some(remaining))
    }
}
