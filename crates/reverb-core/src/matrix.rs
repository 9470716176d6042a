//! Orthogonal Householder feedback matrix.
//!
//! `H = I - 2*v*v^T` for a unit vector `v` drawn from a fixed seed. The
//! fixed seed is load-bearing: two independent implementations that agree
//! on the generator produce bit-identical decay signatures.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use libm::{cosf, logf, sinf, sqrtf};

#[cfg(feature = "std")]
#[inline]
fn sqrtf(x: f32) -> f32 {
    x.sqrt()
}
#[cfg(feature = "std")]
#[inline]
fn logf(x: f32) -> f32 {
    x.ln()
}
#[cfg(feature = "std")]
#[inline]
fn cosf(x: f32) -> f32 {
    x.cos()
}
#[cfg(feature = "std")]
#[inline]
fn sinf(x: f32) -> f32 {
    x.sin()
}

/// The seed controlling Householder-vector generation: it must be deterministic and
/// reproducible across runs, and two independent implementations of this
/// of this matrix must agree bit-for-bit if they use the same generator.
pub const FEEDBACK_MATRIX_SEED: u64 = 42;

/// Small deterministic PRNG (SplitMix64), used only to seed the Householder
/// vector. Not exposed publicly — determinism is the contract, not the
/// generator's statistical quality, and a hand-rolled generator keeps this
/// crate's only hard determinism requirement self-contained rather than
/// depending on another crate's default (OS-seeded, non-deterministic) RNG.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform sample in `(0, 1]`, avoiding an exact 0 (needed by Box-Muller's log).
    fn next_open01(&mut self) -> f32 {
        let bits = (self.next_u64() >> 40) as u32; // 24 significant bits
        ((bits as f32) + 1.0) / (16_777_217.0)
    }
}

/// Draw `n` standard-normal samples using the Box-Muller transform over a
/// [`SplitMix64`] seeded with [`FEEDBACK_MATRIX_SEED`].
fn standard_normal_vector(n: usize) -> Vec<f32> {
    let mut rng = SplitMix64::new(FEEDBACK_MATRIX_SEED);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let u1 = rng.next_open01();
        let u2 = rng.next_open01();
        let radius = sqrtf(-2.0 * logf(u1));
        let theta = 2.0 * core::f32::consts::PI * u2;
        out.push(radius * cosf(theta));
        if out.len() < n {
            // Box-Muller naturally produces a pair; use both without
            // burning extra uniform draws.
            out.push(radius * sinf(theta));
        }
    }
    out.truncate(n);
    out
}

/// An N x N orthogonal Householder feedback matrix, row-major, scaled by a
/// single RT60-derived gain.
#[derive(Debug, Clone)]
pub struct FeedbackMatrix {
    size: usize,
    /// Unscaled `H`, kept around so orthogonality can be re-verified
    /// without recomputing the Householder vector.
    unscaled: Vec<f32>,
    scaled: Vec<f32>,
}

impl FeedbackMatrix {
    /// Build a fresh Householder matrix of the given size and scale it by
    /// `gain`.
    #[must_use]
    pub fn new(size: usize, gain: f32) -> Self {
        let mut v = standard_normal_vector(size);
        let norm = sqrtf(v.iter().map(|x| x * x).sum::<f32>());
        let norm = if norm > 0.0 { norm } else { 1.0 };
        for x in &mut v {
            *x /= norm;
        }

        let mut unscaled = vec![0.0; size * size];
        for i in 0..size {
            for j in 0..size {
                let delta = if i == j { 1.0 } else { 0.0 };
                unscaled[i * size + j] = delta - 2.0 * v[i] * v[j];
            }
        }

        let mut matrix = Self {
            size,
            unscaled,
            scaled: vec![0.0; size * size],
        };
        matrix.set_gain(gain);

        #[cfg(feature = "tracing")]
        tracing::debug!(size, seed = FEEDBACK_MATRIX_SEED, "Householder feedback matrix regenerated");

        matrix
    }

    /// Rescale the matrix by a new gain without regenerating the
    /// Householder vector (used when only RT60/room-size-derived gain
    /// changes, not N itself).
    pub fn set_gain(&mut self, gain: f32) {
        for (dst, src) in self.scaled.iter_mut().zip(self.unscaled.iter()) {
            *dst = src * gain;
        }
    }

    /// N.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// `scaled * inputs`, writing into `outputs`. Both slices must have
    /// length `size()`.
    #[inline]
    pub fn apply(&self, inputs: &[f32], outputs: &mut [f32]) {
        debug_assert_eq!(inputs.len(), self.size);
        debug_assert_eq!(outputs.len(), self.size);
        for i in 0..self.size {
            let row = &self.scaled[i * self.size..(i + 1) * self.size];
            outputs[i] = row.iter().zip(inputs.iter()).map(|(h, x)| h * x).sum();
        }
    }

    /// `max_ij |H*H^T - I|` for the *unscaled* matrix, i.e. orthogonality
    /// independent of the RT60 gain.
    #[must_use]
    pub fn orthogonality_error(&self) -> f32 {
        let n = self.size;
        let mut max_err = 0.0f32;
        for i in 0..n {
            for j in 0..n {
                let mut dot = 0.0f32;
                for k in 0..n {
                    dot += self.unscaled[i * n + k] * self.unscaled[j * n + k];
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                max_err = max_err.max((dot - expected).abs());
            }
        }
        max_err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonal_within_tolerance() {
        for n in [4, 8, 12] {
            let m = FeedbackMatrix::new(n, 0.9);
            assert!(
                m.orthogonality_error() < 1e-4,
                "N={n} orthogonality error {}",
                m.orthogonality_error()
            );
        }
    }

    #[test]
    fn deterministic_across_instances() {
        let a = FeedbackMatrix::new(8, 0.9);
        let b = FeedbackMatrix::new(8, 0.9);
        assert_eq!(a.unscaled, b.unscaled);
    }

    #[test]
    fn apply_preserves_energy_at_unit_gain() {
        let m = FeedbackMatrix::new(8, 1.0);
        let input = [1.0, -1.0, 0.5, -0.5, 0.25, -0.25, 0.1, -0.1];
        let mut output = [0.0; 8];
        m.apply(&input, &mut output);
        let e_in: f32 = input.iter().map(|x| x * x).sum();
        let e_out: f32 = output.iter().map(|x| x * x).sum();
        assert!((e_in - e_out).abs() < 1e-3, "in={e_in} out={e_out}");
    }

    #[test]
    fn set_gain_rescales_without_regenerating() {
        let mut m = FeedbackMatrix::new(4, 1.0);
        let before = m.unscaled.clone();
        m.set_gain(0.5);
        assert_eq!(m.unscaled, before);
        assert_eq!(m.scaled[0], before[0] * 0.5);
    }
}
