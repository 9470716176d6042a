//! Per-delay-line damping filter: a Butterworth HF lowpass in series with a
//! Butterworth LF highpass, modeling frequency-dependent absorption in the
//! recirculating network.
//!
//! This is deliberately **not** a single one-pole filter — an earlier
//! revision of the source this crate is based on used one, but the
//! authoritative implementation runs two biquads in series, and that's
//! what's preserved here. Even with both damping parameters at zero the
//! chain still applies a wide-band pass; it is not an identity filter.

use crate::biquad::{highpass_coefficients, lowpass_coefficients, Biquad, BUTTERWORTH_Q};

const HF_CUTOFF_MAX: f32 = 8000.0;
const HF_CUTOFF_MIN: f32 = 100.0;
const LF_CUTOFF_BASE: f32 = 50.0;
const LF_CUTOFF_SPAN: f32 = 200.0;
const LF_CUTOFF_MIN: f32 = 50.0;
const LF_CUTOFF_MAX: f32 = 250.0;

/// Map `hfDamping in [0,1]` to the HF lowpass cutoff frequency in Hz.
#[must_use]
pub fn hf_cutoff_hz(hf_damping: f32) -> f32 {
    let hf_damping = hf_damping.clamp(0.0, 1.0);
    (HF_CUTOFF_MAX * (1.0 - hf_damping)).clamp(HF_CUTOFF_MIN, HF_CUTOFF_MAX)
}

/// Map `lfDamping in [0,1]` to the LF highpass cutoff frequency in Hz.
#[must_use]
pub fn lf_cutoff_hz(lf_damping: f32) -> f32 {
    let lf_damping = lf_damping.clamp(0.0, 1.0);
    (LF_CUTOFF_BASE + LF_CUTOFF_SPAN * (1.0 - lf_damping)).clamp(LF_CUTOFF_MIN, LF_CUTOFF_MAX)
}

/// Two-stage damping filter: HF lowpass, then LF highpass, both Butterworth.
#[derive(Debug, Clone, Copy)]
pub struct DampingFilter {
    hf_lowpass: Biquad,
    lf_highpass: Biquad,
}

impl DampingFilter {
    /// Create a damping filter configured for the given damping amounts and
    /// sample rate.
    #[must_use]
    pub fn new(hf_damping: f32, lf_damping: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            hf_lowpass: Biquad::new(),
            lf_highpass: Biquad::new(),
        };
        filter.set_damping(hf_damping, lf_damping, sample_rate);
        filter
    }

    /// Recompute both biquads for new damping amounts / sample rate.
    pub fn set_damping(&mut self, hf_damping: f32, lf_damping: f32, sample_rate: f32) {
        let (b0, b1, b2, a0, a1, a2) =
            lowpass_coefficients(hf_cutoff_hz(hf_damping), BUTTERWORTH_Q, sample_rate);
        self.hf_lowpass.set_coefficients(b0, b1, b2, a0, a1, a2);

        let (b0, b1, b2, a0, a1, a2) =
            highpass_coefficients(lf_cutoff_hz(lf_damping), BUTTERWORTH_Q, sample_rate);
        self.lf_highpass.set_coefficients(b0, b1, b2, a0, a1, a2);
    }

    /// Run the HF lowpass then the LF highpass in series.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let hf = self.hf_lowpass.process(input);
        self.lf_highpass.process(hf)
    }

    /// Zero both biquads' state (coefficients untouched).
    pub fn clear(&mut self) {
        self.hf_lowpass.clear();
        self.lf_highpass.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_mapping_bounds() {
        assert_eq!(hf_cutoff_hz(0.0), 8000.0);
        assert_eq!(hf_cutoff_hz(1.0), HF_CUTOFF_MIN);
        assert_eq!(lf_cutoff_hz(0.0), 250.0);
        assert_eq!(lf_cutoff_hz(1.0), LF_CUTOFF_MIN);
    }

    #[test]
    fn zero_damping_is_not_identity() {
        let mut df = DampingFilter::new(0.0, 0.0, 48000.0);
        let mut sum_diff = 0.0f32;
        for i in 0..2000 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let y = df.process(x);
            sum_diff += (y - x).abs();
        }
        assert!(sum_diff > 0.0, "damping chain must not be a pure passthrough");
    }

    #[test]
    fn high_hf_damping_attenuates_highs_by_20db() {
        let sample_rate = 48000.0;
        let mut open = DampingFilter::new(0.0, 0.0, sample_rate);
        let mut damped = DampingFilter::new(1.0, 0.0, sample_rate);

        // Drive with a signal concentrated above 1 kHz (Nyquist-ish square).
        let mut energy_open = 0.0f32;
        let mut energy_damped = 0.0f32;
        for i in 0..4000 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            energy_open += open.process(x).powi(2);
            energy_damped += damped.process(x).powi(2);
        }
        let ratio_db = 10.0 * (energy_damped / energy_open.max(1e-12)).log10();
        assert!(
            ratio_db <= -20.0,
            "expected >= 20 dB attenuation above 1kHz, got {ratio_db} dB"
        );
    }

    #[test]
    fn clear_resets_state() {
        let mut df = DampingFilter::new(0.5, 0.5, 48000.0);
        for _ in 0..50 {
            df.process(1.0);
        }
        df.clear();
        let y = df.process(0.0);
        assert_eq!(y, 0.0);
    }
}
