//! FDN Reverb — the central component: pre-delay, early reflections,
//! diffusion, delay bank, Householder feedback matrix, and per-line
//! damping, driven one sample at a time.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::allpass::AllpassFilter;
use crate::damping::DampingFilter;
use crate::delay::DelayLine;
use crate::math::flush_denormal;
use crate::matrix::FeedbackMatrix;

/// Default feedback-line count.
pub const DEFAULT_LINE_COUNT: usize = 8;
/// Minimum feedback-line count.
pub const MIN_LINE_COUNT: usize = 4;
/// Maximum feedback-line count.
pub const MAX_LINE_COUNT: usize = 12;

/// Maximum delay buffer capacity: one second at 96 kHz.
pub const MAX_DELAY_SAMPLES: usize = 96_000;

/// Delay-bank prime table, spanning ~30-100ms at 48kHz.
pub const PRIME_DELAYS: [usize; 20] = [
    1447, 1549, 1693, 1789, 1907, 2063, 2179, 2311, 2467, 2633, 2801, 2969, 3137, 3307, 3491,
    3677, 3863, 4051, 4241, 4801,
];

/// Early-reflection all-pass prime table, spanning ~5-25ms at 48kHz.
pub const ER_PRIMES: [usize; 8] = [241, 317, 431, 563, 701, 857, 997, 1151];

/// Diffusion all-pass prime table.
pub const DIFFUSION_PRIMES: [usize; 8] = [89, 109, 127, 149, 167, 191, 211, 233];

const ER_GAIN_START: f32 = 0.75;
const ER_GAIN_STEP: f32 = 0.05;
const DIFFUSION_GAIN_START: f32 = 0.70;
const DIFFUSION_GAIN_STEP: f32 = 0.03;

const MAX_PRE_DELAY_MS: f32 = 200.0;
const MIN_DELAY_LENGTH: usize = 200;
const ER_MIN_LENGTH: usize = 10;
const ER_MAX_LENGTH: usize = 2400;

fn maxdecay_for_size(room_size: f32) -> f32 {
    if room_size <= 0.3 {
        8.0
    } else if room_size <= 0.7 {
        8.0 - (room_size - 0.3) * (2.0 / 0.4)
    } else {
        6.0 - (room_size - 0.7) * (3.0 / 0.3)
    }
}

/// One channel's worth of the FDN Reverb: pre-delay, early reflections,
/// diffusion, the delay bank, the feedback matrix, and per-line damping.
///
/// Stereo processing is built from two independent instances of
/// this type, one per channel, so that their delay-line buffers and filter
/// states never interact.
#[derive(Debug, Clone)]
pub struct FdnCore {
    n: usize,
    sample_rate: f32,

    pre_delay: DelayLine,
    pre_delay_samples: f32,

    early_reflections: Vec<AllpassFilter>,
    diffusion: Vec<AllpassFilter>,

    delay_lines: Vec<DelayLine>,
    lengths: Vec<f32>,
    damping: Vec<DampingFilter>,
    matrix: FeedbackMatrix,

    room_size: f32,
    decay_time: f32,
    hf_damping: f32,
    lf_damping: f32,
    density: f32,

    scratch_reads: Vec<f32>,
    scratch_matrix: Vec<f32>,
}

impl FdnCore {
    /// Construct a new FDN channel with `n` feedback lines (clamped to
    /// `[4, 12]`) at the given sample rate, with the initial parameter set.
    #[must_use]
    pub fn new(
        sample_rate: f32,
        n: usize,
        room_size: f32,
        decay_time: f32,
        hf_damping: f32,
        lf_damping: f32,
        density: f32,
    ) -> Self {
        let n = n.clamp(MIN_LINE_COUNT, MAX_LINE_COUNT);

        let delay_lines = (0..n).map(|_| DelayLine::new(MAX_DELAY_SAMPLES)).collect();
        let damping = (0..n)
            .map(|_| DampingFilter::new(hf_damping, lf_damping, sample_rate))
            .collect();

        let mut core = Self {
            n,
            sample_rate,
            pre_delay: DelayLine::new(((sample_rate * MAX_PRE_DELAY_MS / 1000.0) as usize) + 2),
            pre_delay_samples: 0.0,
            early_reflections: Vec::new(),
            diffusion: Vec::new(),
            delay_lines,
            lengths: vec![0.0; n],
            damping,
            matrix: FeedbackMatrix::new(n, 0.9),
            room_size,
            decay_time,
            hf_damping,
            lf_damping,
            density: density.clamp(0.0, 1.0),
            scratch_reads: vec![0.0; n],
            scratch_matrix: vec![0.0; n],
        };
        core.rebuild_allpass_chains();
        core.update_delay_lengths();
        core.update_matrix_gain();
        core
    }

    /// Number of feedback lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.n
    }

    /// Set the pre-delay time in milliseconds, clamped to `[0, 200]`.
    pub fn set_pre_delay_ms(&mut self, ms: f32) {
        let ms = ms.clamp(0.0, MAX_PRE_DELAY_MS);
        self.pre_delay_samples = self.pre_delay.clamp_delay(
            ((ms / 1000.0) * self.sample_rate) as usize,
        ) as f32;
    }

    /// Update `roomSize`, returning `true` if the change is large enough
    /// (`> 0.05`) to require a buffer flush.
    pub fn set_room_size(&mut self, room_size: f32) -> bool {
        let room_size = room_size.clamp(0.0, 1.0);
        let delta = (room_size - self.room_size).abs();
        if delta < 1e-6 {
            return false;
        }
        let needs_flush = delta > 0.05;
        self.room_size = room_size;
        self.update_delay_lengths();
        self.rebuild_allpass_chains();
        self.update_matrix_gain();

        #[cfg(feature = "tracing")]
        if needs_flush {
            tracing::debug!(
                room_size,
                delta,
                "room size change exceeds flush threshold, delay lengths and all-pass chains rebuilt"
            );
        }

        needs_flush
    }

    /// Update the target decay time (RT60). Never triggers a flush.
    pub fn set_decay_time(&mut self, decay_time: f32) {
        self.decay_time = decay_time.clamp(0.1, 10.0);
        self.update_matrix_gain();
    }

    /// Update the diffusion density. Rescales the existing diffusion
    /// all-pass gains in place; never touches delay lengths, so it never
    /// requires a flush.
    pub fn set_density(&mut self, density: f32) {
        self.density = density.clamp(0.0, 1.0);
        for (i, ap) in self.diffusion.iter_mut().enumerate() {
            let gain = (DIFFUSION_GAIN_START - DIFFUSION_GAIN_STEP * i as f32).max(0.0);
            ap.set_feedback(gain * self.density);
        }
    }

    /// Update HF/LF damping amounts.
    pub fn set_damping(&mut self, hf_damping: f32, lf_damping: f32) {
        self.hf_damping = hf_damping.clamp(0.0, 1.0);
        self.lf_damping = lf_damping.clamp(0.0, 1.0);
        for d in &mut self.damping {
            d.set_damping(self.hf_damping, self.lf_damping, self.sample_rate);
        }
        self.update_matrix_gain();
    }

    /// Reallocate for a new sample rate and recompute all derived state.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.pre_delay = DelayLine::new(((sample_rate * MAX_PRE_DELAY_MS / 1000.0) as usize) + 2);
        for line in &mut self.delay_lines {
            *line = DelayLine::new(MAX_DELAY_SAMPLES);
        }
        for d in &mut self.damping {
            d.set_damping(self.hf_damping, self.lf_damping, sample_rate);
        }
        self.rebuild_allpass_chains();
        self.update_delay_lengths();
        self.update_matrix_gain();

        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, "FDN delay lines reallocated for new sample rate");
    }

    /// Zero every piece of internal state: pre-delay, ER/diffusion chains,
    /// delay bank, and damping filters.
    pub fn flush(&mut self) {
        self.pre_delay.clear();
        for ap in &mut self.early_reflections {
            ap.clear();
        }
        for ap in &mut self.diffusion {
            ap.clear();
        }
        for line in &mut self.delay_lines {
            line.clear();
        }
        for d in &mut self.damping {
            d.clear();
        }
    }

    /// Run one sample through the per-sample FDN loop, returning the
    /// channel's mono FDN output.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let a = self.pre_delay.read_write(input, self.pre_delay_samples);

        let mut b = a;
        for ap in &mut self.early_reflections {
            b = ap.process(b);
        }

        let mut c = b;
        for ap in &mut self.diffusion {
            c = ap.process(c);
        }

        for i in 0..self.n {
            self.scratch_reads[i] = self.delay_lines[i].read(self.lengths[i]);
        }
        self.matrix.apply(&self.scratch_reads, &mut self.scratch_matrix);

        let mut out = 0.0f32;
        for i in 0..self.n {
            let damped = self.damping[i].process(self.scratch_matrix[i]);
            let write_value = flush_denormal(c * 0.3 + damped);
            self.delay_lines[i].write(write_value);
            out += damped;
        }

        out * 0.3
    }

    /// Unscaled feedback matrix orthogonality error, exposed for testing.
    #[must_use]
    pub fn matrix_orthogonality_error(&self) -> f32 {
        self.matrix.orthogonality_error()
    }

    fn rebuild_allpass_chains(&mut self) {
        let scale = (self.sample_rate / 48000.0) * (0.3 + 0.7 * self.room_size);

        self.early_reflections = ER_PRIMES
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let len = ((p as f32 * scale).round() as usize).clamp(ER_MIN_LENGTH, ER_MAX_LENGTH);
                let gain = (ER_GAIN_START - ER_GAIN_STEP * i as f32).max(0.0);
                AllpassFilter::new(len, gain)
            })
            .collect();

        self.diffusion = DIFFUSION_PRIMES
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let len = ((p as f32 * scale).round() as usize).clamp(ER_MIN_LENGTH, ER_MAX_LENGTH);
                let gain = (DIFFUSION_GAIN_START - DIFFUSION_GAIN_STEP * i as f32).max(0.0);
                AllpassFilter::new(len, gain * self.density)
            })
            .collect();
    }

    fn update_delay_lengths(&mut self) {
        let scale = (self.sample_rate / 48000.0) * (0.5 + 1.5 * self.room_size);
        let max_len = (MAX_DELAY_SAMPLES - 1) as f32;

        for i in 0..self.n {
            let mut len = (PRIME_DELAYS[i] as f32 * scale)
                .round()
                .clamp(MIN_DELAY_LENGTH as f32, max_len);
            if i > 0 {
                len += (i % 3) as f32 - 1.0;
            }
            self.lengths[i] = len.clamp(1.0, max_len);
        }
    }

    fn update_matrix_gain(&mut self) {
        let avg_delay: f32 = self.lengths.iter().sum::<f32>() / self.n as f32;
        let delta_t = avg_delay / self.sample_rate;

        let rt60_limited = self.decay_time.min(maxdecay_for_size(self.room_size));
        let rt60_effective = rt60_limited.max(0.05);

        let g_theoretical = 10f32.powf(-3.0 * delta_t / rt60_effective);
        let g_freq_weighted =
            g_theoretical * (1.0 - 0.25 * self.hf_damping) * (1.0 - 0.15 * self.lf_damping);
        let g_stability = (0.98 - 0.03 * self.room_size).min(0.97);
        let g_matrix = g_freq_weighted.min(g_stability);

        self.matrix.set_gain(g_matrix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_defaults_to_eight_lines() {
        let fdn = FdnCore::new(48000.0, DEFAULT_LINE_COUNT, 0.5, 1.5, 0.3, 0.3, 0.7);
        assert_eq!(fdn.line_count(), 8);
    }

    #[test]
    fn line_count_clamped_to_range() {
        let fdn = FdnCore::new(48000.0, 2, 0.5, 1.5, 0.3, 0.3, 0.7);
        assert_eq!(fdn.line_count(), MIN_LINE_COUNT);
        let fdn = FdnCore::new(48000.0, 100, 0.5, 1.5, 0.3, 0.3, 0.7);
        assert_eq!(fdn.line_count(), MAX_LINE_COUNT);
    }

    #[test]
    fn orthogonal_after_room_size_and_decay_changes() {
        let mut fdn = FdnCore::new(48000.0, 8, 0.2, 1.0, 0.0, 0.0, 0.7);
        assert!(fdn.matrix_orthogonality_error() < 1e-4);
        fdn.set_room_size(0.9);
        assert!(fdn.matrix_orthogonality_error() < 1e-4);
        fdn.set_decay_time(5.0);
        assert!(fdn.matrix_orthogonality_error() < 1e-4);
    }

    #[test]
    fn stable_under_sustained_noise() {
        let mut fdn = FdnCore::new(48000.0, 8, 1.0, 10.0, 0.0, 0.0, 0.7);
        let mut state = 0x1234_5678u32;
        let mut sum_sq = 0.0f32;
        let samples = 48000 * 2;
        for _ in 0..samples {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let noise = ((state as f32 / u32::MAX as f32) - 0.5) * 0.2;
            let out = fdn.process(noise);
            assert!(out.is_finite(), "output went non-finite");
            sum_sq += out * out;
        }
        let rms = (sum_sq / samples as f32).sqrt();
        assert!(rms < 1.0, "RMS ran away: {rms}");
    }

    #[test]
    fn flush_zeroes_output_for_zero_input() {
        let mut fdn = FdnCore::new(48000.0, 8, 0.2, 2.0, 0.0, 0.0, 0.7);
        for i in 0..1000 {
            fdn.process(if i == 0 { 1.0 } else { 0.0 });
        }
        fdn.flush();
        for _ in 0..100 {
            assert_eq!(fdn.process(0.0), 0.0);
        }
    }

    #[test]
    fn delay_lengths_are_distinct() {
        let fdn = FdnCore::new(48000.0, 8, 0.5, 1.5, 0.3, 0.3, 0.7);
        for i in 0..fdn.lengths.len() {
            for j in (i + 1)..fdn.lengths.len() {
                assert_ne!(fdn.lengths[i], fdn.lengths[j], "lengths[{i}] == lengths[{j}]");
            }
        }
    }
}
