//! Stereo cross-feed processor: pre-reverb L/R mixing with a
//! delayed cross-signal, optional phase inversion, and mid/side width.
//!
//! Owns its own two delay lines (not shared with the FDN or pre-delay),
//! owned independently from every other delay line in the engine.

use crate::delay::DelayLine;
use crate::math::flush_denormal;

const MAX_CROSS_DELAY_MS: f32 = 50.0;

/// Clamp a requested cross-feed delay to `[0, 50]` ms.
#[must_use]
pub fn clamp_cross_delay_ms(ms: f32) -> f32 {
    ms.clamp(0.0, MAX_CROSS_DELAY_MS)
}

/// Stereo cross-feed processor with its own L->R and R->L delay lines.
#[derive(Debug, Clone)]
pub struct CrossFeedProcessor {
    l_to_r: DelayLine,
    r_to_l: DelayLine,
    delay_samples: f32,
    cross_feed_amount: f32,
    stereo_width: f32,
    phase_invert: bool,
    bypass: bool,
    sample_rate: f32,
}

impl CrossFeedProcessor {
    #[must_use]
    pub fn new(sample_rate: f32) -> Self {
        let capacity = ((sample_rate * MAX_CROSS_DELAY_MS / 1000.0) as usize + 2).max(2);
        Self {
            l_to_r: DelayLine::new(capacity),
            r_to_l: DelayLine::new(capacity),
            delay_samples: 0.0,
            cross_feed_amount: 0.0,
            stereo_width: 1.0,
            phase_invert: false,
            bypass: true,
            sample_rate,
        }
    }

    /// Reconfigure the cross-delay length. No flush required — the
    /// previously delayed samples simply decay out naturally.
    pub fn set_cross_delay_ms(&mut self, ms: f32) {
        let ms = clamp_cross_delay_ms(ms);
        self.delay_samples = (ms / 1000.0) * self.sample_rate;
    }

    pub fn set_cross_feed_amount(&mut self, amount: f32) {
        self.cross_feed_amount = amount.clamp(0.0, 1.0);
    }

    pub fn set_stereo_width(&mut self, width: f32) {
        self.stereo_width = width.clamp(0.0, 2.0);
    }

    pub fn set_phase_invert(&mut self, invert: bool) {
        self.phase_invert = invert;
    }

    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        let capacity = ((sample_rate * MAX_CROSS_DELAY_MS / 1000.0) as usize + 2).max(2);
        self.l_to_r = DelayLine::new(capacity);
        self.r_to_l = DelayLine::new(capacity);
    }

    /// Process one stereo frame in place, per the seven-step algorithm in
    /// seven-step cross-feed algorithm. When bypassed, only the mid/side width stage runs.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        if self.bypass {
            let mid = 0.5 * (left + right);
            let side = 0.5 * (left - right) * self.stereo_width;
            return (mid + side, mid - side);
        }

        let delayed_l = self.l_to_r.read(self.delay_samples);
        let delayed_r = self.r_to_l.read(self.delay_samples);

        let cross_l_to_r = delayed_l * self.cross_feed_amount;
        let invert = if self.phase_invert { -1.0 } else { 1.0 };
        let cross_r_to_l = delayed_r * self.cross_feed_amount * invert;

        let mixed_l = left + cross_r_to_l;
        let mixed_r = right + cross_l_to_r;

        let mid = 0.5 * (mixed_l + mixed_r);
        let side = 0.5 * (mixed_l - mixed_r) * self.stereo_width;

        self.l_to_r.write(flush_denormal(left));
        self.r_to_l.write(flush_denormal(right));

        (mid + side, mid - side)
    }

    /// Zero both delay lines.
    pub fn clear(&mut self) {
        self.l_to_r.clear();
        self.r_to_l.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bypass_applies_only_mid_side() {
        let mut cf = CrossFeedProcessor::new(48000.0);
        cf.set_bypass(true);
        cf.set_stereo_width(0.0);
        let (l, r) = cf.process(1.0, -1.0);
        assert!((l - 0.0).abs() < 1e-6);
        assert!((r - 0.0).abs() < 1e-6);
    }

    #[test]
    fn mono_convergence_with_full_crossfeed() {
        let mut cf = CrossFeedProcessor::new(48000.0);
        cf.set_bypass(false);
        cf.set_cross_feed_amount(1.0);
        cf.set_stereo_width(0.0);
        cf.set_phase_invert(false);
        cf.set_cross_delay_ms(1.0);

        let mut last_diff = 1.0f32;
        for _ in 0..200 {
            let (l, r) = cf.process(1.0, 0.5);
            last_diff = (l - r).abs();
        }
        assert!(last_diff < 1e-3, "expected L/R convergence, diff={last_diff}");
    }

    #[test]
    fn cross_delay_clamped_to_50ms() {
        assert_eq!(clamp_cross_delay_ms(-5.0), 0.0);
        assert_eq!(clamp_cross_delay_ms(500.0), 50.0);
    }

    #[test]
    fn clear_resets_delay_lines() {
        let mut cf = CrossFeedProcessor::new(48000.0);
        cf.set_bypass(false);
        cf.set_cross_feed_amount(1.0);
        for _ in 0..100 {
            cf.process(1.0, 1.0);
        }
        cf.clear();
        let (l, r) = cf.process(0.0, 0.0);
        assert_eq!(l, 0.0);
        assert_eq!(r, 0.0);
    }
}
