//! Schroeder all-pass filter: flat magnitude response, used for early
//! reflections and diffusion ahead of the FDN delay bank.

use crate::delay::DelayLine;
use crate::math::flush_denormal;

/// A fixed-length Schroeder all-pass filter.
///
/// Difference equation: `y[n] = -g*x[n] + buf[n-d]`, with `x[n] + g*y[n]`
/// written back into the delay. Unity magnitude response at every
/// frequency; only the phase response depends on `g` and the delay length.
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    delay: DelayLine,
    delay_samples: usize,
    feedback: f32,
}

impl AllpassFilter {
    /// Create an all-pass with the given integer delay length (samples) and
    /// feedback/feedforward gain, clamped to `[0, 0.95]` to keep the filter
    /// stable.
    pub fn new(delay_samples: usize, feedback: f32) -> Self {
        let delay_samples = delay_samples.max(1);
        Self {
            delay: DelayLine::new(delay_samples + 1),
            delay_samples,
            feedback: feedback.clamp(0.0, 0.95),
        }
    }

    /// Current feedback gain.
    #[must_use]
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Set the feedback gain, clamped to `[0, 0.95]`.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.95);
    }

    /// Process one sample through the all-pass.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.delay.read(self.delay_samples as f32);
        let output = -self.feedback * input + delayed;
        let write_value = flush_denormal(input + self.feedback * output);
        self.delay.write(write_value);
        output
    }

    /// Zero all internal state.
    pub fn clear(&mut self) {
        self.delay.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_passes_through_after_transient() {
        let mut ap = AllpassFilter::new(16, 0.5);
        let mut last = 0.0;
        for _ in 0..500 {
            last = ap.process(1.0);
        }
        assert!((last - 1.0).abs() < 1e-3, "DC should settle near 1.0, got {last}");
    }

    #[test]
    fn unity_magnitude_on_impulse_energy() {
        let mut ap = AllpassFilter::new(32, 0.6);
        let mut energy_in = 0.0f32;
        let mut energy_out = 0.0f32;
        let input: Vec<f32> = (0..2000)
            .map(|i| if i == 0 { 1.0 } else { 0.0 })
            .collect();
        for &x in &input {
            let y = ap.process(x);
            energy_in += x * x;
            energy_out += y * y;
        }
        assert!(
            (energy_out - energy_in).abs() < 0.05,
            "all-pass should conserve energy: in={energy_in} out={energy_out}"
        );
    }

    #[test]
    fn clear_resets_state() {
        let mut ap = AllpassFilter::new(8, 0.5);
        for _ in 0..20 {
            ap.process(1.0);
        }
        ap.clear();
        let y = ap.process(0.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn feedback_clamped_to_range() {
        let mut ap = AllpassFilter::new(8, 2.0);
        assert_eq!(ap.feedback(), 0.95);
        ap.set_feedback(-5.0);
        assert_eq!(ap.feedback(), 0.0);
    }

    #[test]
    fn no_denormals_after_silence() {
        let mut ap = AllpassFilter::new(16, 0.7);
        ap.process(1.0);
        for _ in 0..20_000 {
            let out = ap.process(0.0);
            assert!(out == 0.0 || out.abs() > f32::MIN_POSITIVE);
        }
    }
}
