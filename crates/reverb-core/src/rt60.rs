//! RT60 measurement harness: an offline impulse-response
//! generator and energy-envelope analyzer used for calibration tests.
//!
//! Not part of the hot path — this allocates freely and is only ever
//! called from test code or the `reverb-cli` harness, never from
//! `process_block`.

extern crate alloc;
use alloc::collections::VecDeque;
use alloc::vec::Vec;

const ENVELOPE_WINDOW: usize = 512;
const DECAY_THRESHOLD_DB: f32 = -60.0;

/// Compute a running-RMS energy envelope over `samples` with a
/// [`ENVELOPE_WINDOW`]-sample window.
#[must_use]
pub fn energy_envelope(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let mut envelope = Vec::with_capacity(samples.len());
    let mut window_sum_sq = 0.0f32;
    let mut window: VecDeque<f32> = VecDeque::with_capacity(ENVELOPE_WINDOW);

    for &sample in samples {
        window.push_back(sample);
        window_sum_sq += sample * sample;
        if window.len() > ENVELOPE_WINDOW {
            if let Some(evicted) = window.pop_front() {
                window_sum_sq -= evicted * evicted;
            }
        }
        let rms = (window_sum_sq / window.len() as f32).sqrt();
        envelope.push(rms);
    }
    envelope
}

/// Measure RT60 from an impulse-response energy envelope: the time (in
/// seconds) at which the envelope first falls 60 dB below its peak.
///
/// Returns `None` if the tail never decays that far within the capture
/// window.
#[must_use]
pub fn measure_rt60(envelope: &[f32], sample_rate: f32) -> Option<f32> {
    let peak = envelope.iter().cloned().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return None;
    }
    let threshold = peak * 10f32.powf(DECAY_THRESHOLD_DB / 20.0);

    // Skip the initial rise: find the peak index first, then search forward
    // for the first sample to cross below threshold.
    let peak_index = envelope
        .iter()
        .position(|&x| x == peak)
        .unwrap_or(0);

    envelope[peak_index..]
        .iter()
        .position(|&x| x <= threshold)
        .map(|offset| (peak_index + offset) as f32 / sample_rate)
}

/// Generate a unit impulse followed by `duration_seconds` of silence, and
/// return the processed output via the supplied closure (one sample in,
/// one sample out). `process_one` should be a mono processing callback,
/// e.g. an FDN's per-sample entry point.
pub fn capture_impulse_response<F: FnMut(f32) -> f32>(
    sample_rate: f32,
    duration_seconds: f32,
    mut process_one: F,
) -> Vec<f32> {
    let total_samples = (sample_rate * duration_seconds) as usize;
    let mut output = Vec::with_capacity(total_samples);
    for i in 0..total_samples {
        let input = if i == 0 { 1.0 } else { 0.0 };
        output.push(process_one(input));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_decays_for_exponential_tail() {
        let sample_rate = 48000.0;
        let samples: Vec<f32> = (0..sample_rate as usize * 2)
            .map(|i| (-(i as f32) / (sample_rate * 0.3)).exp())
            .collect();
        let envelope = energy_envelope(&samples);
        let rt60 = measure_rt60(&envelope, sample_rate);
        assert!(rt60.is_some());
        // exp(-t/tau) reaches -60dB (factor 1e-3) at t = tau * ln(1000) ~= 0.3*6.9 = 2.07s
        let measured = rt60.unwrap();
        assert!(
            (measured - 2.07).abs() < 0.3,
            "expected ~2.07s, got {measured}"
        );
    }

    #[test]
    fn no_decay_returns_none_when_flat() {
        let samples = vec![1.0f32; 1000];
        let envelope = energy_envelope(&samples);
        assert!(measure_rt60(&envelope, 48000.0).is_none());
    }

    #[test]
    fn capture_impulse_response_is_unit_impulse_then_silence() {
        let captured = capture_impulse_response(48000.0, 0.001, |x| x);
        assert_eq!(captured[0], 1.0);
        assert!(captured[1..].iter().all(|&x| x == 0.0));
    }
}
