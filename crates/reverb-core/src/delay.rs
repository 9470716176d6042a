//! Delay line: a circular buffer with fractional-delay read access.
//!
//! This is the one primitive every other component in this crate is built
//! from: the pre-delay, the early-reflection and diffusion all-passes, the
//! FDN delay bank, and the cross-feed processor's two cross paths are all
//! `DelayLine`s configured with different lengths and read/write discipline.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// A single exclusively-owned circular delay buffer with linear-interpolated
/// fractional reads.
///
/// `read` and `write` are separate operations on purpose: the FDN's
/// per-sample loop needs to read every line's current output *before*
/// writing any of them, so a combined read-and-advance primitive would
/// force either a second buffer or a write-then-read ordering that halves
/// the effective delay length. Use [`DelayLine::read_write`] when a
/// combined immediate-effect call is what you want (the pre-delay and
/// all-pass filters use it that way).
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Create a delay line with the given maximum capacity in samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "delay line capacity must be > 0");
        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// Create a delay line sized from a sample rate and maximum delay time.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        let max_samples = (sample_rate * max_seconds) as usize + 1;
        Self::new(max_samples)
    }

    /// Peek a delayed sample without mutating the buffer.
    ///
    /// `delay_samples` may be fractional; delay requests beyond capacity are
    /// clamped to `capacity - 1` and a request of 0 is promoted to a delay
    /// of at least 0 samples (the most recent write).
    #[inline]
    #[must_use]
    pub fn read(&self, delay_samples: f32) -> f32 {
        debug_assert!(delay_samples >= 0.0);

        let buffer_len = self.buffer.len();
        let delay_clamped = delay_samples.max(0.0).min((buffer_len - 1) as f32);

        let delay_int = delay_clamped as usize;
        let delay_frac = delay_clamped - delay_int as f32;

        let last_written = if self.write_pos == 0 {
            buffer_len - 1
        } else {
            self.write_pos - 1
        };

        let read_pos = if last_written >= delay_int {
            last_written - delay_int
        } else {
            buffer_len + last_written - delay_int
        };

        let next_pos = if read_pos == 0 {
            buffer_len - 1
        } else {
            read_pos - 1
        };

        let sample0 = self.buffer[read_pos];
        let sample1 = self.buffer[next_pos];
        sample0 + (sample1 - sample0) * delay_frac
    }

    /// Write a sample and advance the cursor. Does not read.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Peek the delayed sample, then write a new one. Equivalent to
    /// `read(d)` followed by `write(x)`, provided for the common case where
    /// a component reads and writes its own line in the same step (pre-delay,
    /// all-pass filters, cross-feed taps).
    #[inline]
    pub fn read_write(&mut self, sample: f32, delay_samples: f32) -> f32 {
        let output = self.read(delay_samples);
        self.write(sample);
        output
    }

    /// Zero the buffer and reset the write cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Maximum delay this line can represent, in samples.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Clamp a requested integer delay length to the valid range
    /// `[1, capacity - 1]` (a zero-length
    /// request is silently promoted to 1).
    #[must_use]
    pub fn clamp_delay(&self, requested: usize) -> usize {
        requested.max(1).min(self.buffer.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_read_write() {
        let mut d = DelayLine::new(10);
        for i in 1..=5 {
            d.write(i as f32);
        }
        d.write(6.0);
        assert_eq!(d.read(3.0), 3.0);
    }

    #[test]
    fn read_does_not_mutate() {
        let mut d = DelayLine::new(10);
        for i in 1..=5 {
            d.write(i as f32);
        }
        let a = d.read(2.0);
        let b = d.read(2.0);
        assert_eq!(a, b);
    }

    #[test]
    fn interpolates_fractional_delay() {
        let mut d = DelayLine::new(10);
        d.write(0.0);
        d.write(1.0);
        d.write(2.0);
        d.write(3.0);
        let out = d.read(1.5);
        assert!((out - 1.5).abs() < 0.01, "expected ~1.5, got {out}");
    }

    #[test]
    fn wraps_around_buffer() {
        let mut d = DelayLine::new(4);
        d.write(1.0);
        d.write(2.0);
        d.write(3.0);
        d.write(4.0);
        d.write(5.0);
        assert_eq!(d.read(3.0), 2.0);
    }

    #[test]
    fn clear_resets_state() {
        let mut d = DelayLine::new(8);
        d.write(1.0);
        d.write(1.0);
        d.clear();
        assert_eq!(d.read(0.0), 0.0);
    }

    #[test]
    fn clamp_delay_promotes_zero_to_one() {
        let d = DelayLine::new(100);
        assert_eq!(d.clamp_delay(0), 1);
        assert_eq!(d.clamp_delay(500), 99);
        assert_eq!(d.clamp_delay(50), 50);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_panics() {
        let _ = DelayLine::new(0);
    }
}
