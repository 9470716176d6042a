//! One-pole parameter smoother.
//!
//! Setters called from a control thread only ever publish a `target`; the
//! audio thread advances `current` toward it by one pole per sample. This
//! is the only place a parameter's audible value actually changes.

#[cfg(not(feature = "std"))]
use libm::expf;

#[cfg(feature = "std")]
#[inline]
fn expf(x: f32) -> f32 {
    x.exp()
}

/// Default smoothing time constant used for most engine parameters.
pub const STANDARD_SMOOTHING_MS: f32 = 50.0;

/// Slower smoothing time constant, used where a parameter benefits from a gentler
/// ramp (room-size-adjacent parameters that also trigger structural
/// recomputation benefit from settling slowly).
pub const SLOW_SMOOTHING_MS: f32 = 100.0;

/// A one-pole exponential smoother over a single scalar parameter.
#[derive(Debug, Clone, Copy)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create a smoother with no ramping: `current` snaps to `target`
    /// immediately on every `advance`.
    #[must_use]
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 0.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a smoother with an explicit smoothing time constant.
    #[must_use]
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate,
            smoothing_time_ms,
        };
        param.recalculate_coeff();
        param
    }

    /// Convenience constructor using [`STANDARD_SMOOTHING_MS`] (~50 ms).
    #[must_use]
    pub fn standard(initial: f32, sample_rate: f32) -> Self {
        Self::with_config(initial, sample_rate, STANDARD_SMOOTHING_MS)
    }

    /// Convenience constructor using [`SLOW_SMOOTHING_MS`] (~100 ms).
    #[must_use]
    pub fn slow(initial: f32, sample_rate: f32) -> Self {
        Self::with_config(initial, sample_rate, SLOW_SMOOTHING_MS)
    }

    /// Publish a new target. Does not change `current` directly; the audio
    /// thread's next `advance()` call begins ramping toward it.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Snap both `current` and `target` to a value immediately (used by
    /// `reset` and by construction-time initialization).
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    /// Update the sample rate and recompute the smoothing coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Advance `current` one sample toward `target`, returning the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current (smoothed) value without advancing.
    #[must_use]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Published target value.
    #[must_use]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Snap `current` to `target` immediately (used on reset / flush).
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
            return;
        }
        let samples = (self.smoothing_time_ms / 1000.0) * self.sample_rate;
        self.coeff = 1.0 - expf(-1.0 / samples);
    }
}
