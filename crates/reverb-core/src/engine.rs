//! Public reverb engine facade: the `initialize` / `process_block` / preset
//! and per-parameter setters a host actually calls, built on top of the
//! FDN core, cross-feed processor, and atomic parameter set.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::crossfeed::CrossFeedProcessor;
use crate::error::EngineError;
use crate::fdn::{FdnCore, DEFAULT_LINE_COUNT};
use crate::math::{scrub_nonfinite, wet_dry_mix};
use crate::params::{EngineParameters, Preset};
use crate::smoothing::SmoothedParam;

/// Minimum accepted sample rate, in Hz.
pub const MIN_SAMPLE_RATE: f32 = 8_000.0;
/// Maximum accepted sample rate, in Hz.
pub const MAX_SAMPLE_RATE: f32 = 192_000.0;

/// How many input channels a block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Mono,
    Stereo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Uninitialized,
    Initialized,
}

struct Smoothers {
    wet_dry_mix: SmoothedParam,
    decay_time: SmoothedParam,
    pre_delay_ms: SmoothedParam,
    cross_feed: SmoothedParam,
    density: SmoothedParam,
    hf_damping: SmoothedParam,
    lf_damping: SmoothedParam,
    stereo_width: SmoothedParam,
}

impl Smoothers {
    fn new(sample_rate: f32, params: &EngineParameters) -> Self {
        Self {
            wet_dry_mix: SmoothedParam::standard(params.wet_dry_mix.load(), sample_rate),
            decay_time: SmoothedParam::slow(params.decay_time.load(), sample_rate),
            pre_delay_ms: SmoothedParam::standard(params.pre_delay_ms.load(), sample_rate),
            cross_feed: SmoothedParam::standard(params.cross_feed.load(), sample_rate),
            density: SmoothedParam::standard(params.density.load(), sample_rate),
            hf_damping: SmoothedParam::standard(params.hf_damping.load(), sample_rate),
            lf_damping: SmoothedParam::standard(params.lf_damping.load(), sample_rate),
            stereo_width: SmoothedParam::standard(params.stereo_width.load(), sample_rate),
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.wet_dry_mix.set_sample_rate(sample_rate);
        self.decay_time.set_sample_rate(sample_rate);
        self.pre_delay_ms.set_sample_rate(sample_rate);
        self.cross_feed.set_sample_rate(sample_rate);
        self.density.set_sample_rate(sample_rate);
        self.hf_damping.set_sample_rate(sample_rate);
        self.lf_damping.set_sample_rate(sample_rate);
        self.stereo_width.set_sample_rate(sample_rate);
    }

    fn snap_all(&mut self) {
        self.wet_dry_mix.snap_to_target();
        self.decay_time.snap_to_target();
        self.pre_delay_ms.snap_to_target();
        self.cross_feed.snap_to_target();
        self.density.snap_to_target();
        self.hf_damping.snap_to_target();
        self.lf_damping.snap_to_target();
        self.stereo_width.snap_to_target();
    }

    fn pull_targets_from(&mut self, params: &EngineParameters) {
        self.wet_dry_mix.set_target(params.wet_dry_mix.load());
        self.decay_time.set_target(params.decay_time.load());
        self.pre_delay_ms.set_target(params.pre_delay_ms.load());
        self.cross_feed.set_target(params.cross_feed.load());
        self.density.set_target(params.density.load());
        self.hf_damping.set_target(params.hf_damping.load());
        self.lf_damping.set_target(params.lf_damping.load());
        self.stereo_width.set_target(params.stereo_width.load());
    }
}

/// The top-level reverb engine a host embeds: owns both FDN channels, the
/// cross-feed processor, and the atomically-published parameter set.
pub struct ReverbEngine {
    state: EngineState,
    sample_rate: f32,
    channel_mode: ChannelMode,

    params: EngineParameters,
    smoothers: Smoothers,

    fdn_left: FdnCore,
    fdn_right: FdnCore,
    cross_feed: CrossFeedProcessor,

    needs_buffer_flush: AtomicBool,
    bypass_gain: SmoothedParam,
    current_audio_level_bits: AtomicU32,
}

impl ReverbEngine {
    /// Construct an engine in the [`EngineState::Uninitialized`] state; call
    /// [`ReverbEngine::initialize`] before processing audio.
    #[must_use]
    pub fn new() -> Self {
        let sample_rate = 48000.0;
        let params = EngineParameters::from_preset(Preset::Clean);
        let smoothers = Smoothers::new(sample_rate, &params);
        Self {
            state: EngineState::Uninitialized,
            sample_rate,
            channel_mode: ChannelMode::Stereo,
            fdn_left: FdnCore::new(sample_rate, DEFAULT_LINE_COUNT, 0.0, 0.1, 0.0, 0.0, 0.0),
            fdn_right: FdnCore::new(sample_rate, DEFAULT_LINE_COUNT, 0.0, 0.1, 0.0, 0.0, 0.0),
            cross_feed: CrossFeedProcessor::new(sample_rate),
            needs_buffer_flush: AtomicBool::new(false),
            bypass_gain: SmoothedParam::standard(1.0, sample_rate),
            current_audio_level_bits: AtomicU32::new(0.0f32.to_bits()),
            params,
            smoothers,
        }
    }

    /// Public, boolean-returning initialization entry point. Internally
    /// delegates to [`ReverbEngine::try_initialize`] and collapses any
    /// [`EngineError`] to `false`.
    pub fn initialize(&mut self, sample_rate: f32, max_block_size: usize, channels: u8) -> bool {
        self.try_initialize(sample_rate, max_block_size, channels).is_ok()
    }

    fn try_initialize(
        &mut self,
        sample_rate: f32,
        max_block_size: usize,
        channels: u8,
    ) -> Result<(), EngineError> {
        if !sample_rate.is_finite() || !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(EngineError::InvalidSampleRate);
        }
        if max_block_size == 0 {
            return Err(EngineError::ZeroBlockSize);
        }
        let channel_mode = match channels {
            1 => ChannelMode::Mono,
            2 => ChannelMode::Stereo,
            _ => return Err(EngineError::InvalidChannelCount),
        };

        self.sample_rate = sample_rate;
        self.channel_mode = channel_mode;
        self.params.apply_preset(Preset::Clean);
        self.smoothers = Smoothers::new(sample_rate, &self.params);
        self.smoothers.snap_all();

        self.fdn_left.set_sample_rate(sample_rate);
        self.fdn_right.set_sample_rate(sample_rate);
        self.cross_feed.set_sample_rate(sample_rate);
        self.bypass_gain = SmoothedParam::standard(1.0, sample_rate);
        self.apply_smoothed_targets_immediately();

        self.state = EngineState::Initialized;

        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, max_block_size, channels, "reverb engine initialized");

        Ok(())
    }

    /// Attempt to switch the engine's channel mode. Refused while the
    /// engine is initialized without an explicit [`ReverbEngine::reset`]
    /// first, so a host can't silently change channel topology mid-stream.
    pub fn set_channel_mode(&mut self, channels: u8) -> bool {
        if self.state == EngineState::Initialized {
            return false;
        }
        self.channel_mode = match channels {
            1 => ChannelMode::Mono,
            2 => ChannelMode::Stereo,
            _ => return false,
        };
        true
    }

    /// Reset all internal state (delay lines, filters, smoothers) without
    /// changing configured parameters.
    pub fn reset(&mut self) {
        self.fdn_left.flush();
        self.fdn_right.flush();
        self.cross_feed.clear();
        self.smoothers.snap_all();
        self.bypass_gain.snap_to_target();
        self.needs_buffer_flush.store(false, Ordering::Relaxed);
        self.current_audio_level_bits.store(0.0f32.to_bits(), Ordering::Relaxed);
    }

    /// Apply a named preset.
    pub fn set_preset(&mut self, preset: Preset) {
        self.params.apply_preset(preset);
    }

    pub fn set_wet_dry_mix(&self, percent: f32) {
        self.params.wet_dry_mix.store(crate::params::clamp::wet_dry_mix(percent));
    }

    pub fn set_decay_time(&self, seconds: f32) {
        self.params.decay_time.store(crate::params::clamp::decay_time(seconds));
    }

    pub fn set_pre_delay_ms(&self, ms: f32) {
        self.params.pre_delay_ms.store(crate::params::clamp::pre_delay_ms(ms));
    }

    pub fn set_cross_feed(&self, amount: f32) {
        self.params.cross_feed.store(crate::params::clamp::cross_feed(amount));
    }

    pub fn set_room_size(&self, size: f32) {
        self.params.room_size.store(crate::params::clamp::room_size(size));
    }

    pub fn set_density(&self, density: f32) {
        self.params.density.store(crate::params::clamp::density(density));
    }

    pub fn set_hf_damping(&self, damping: f32) {
        self.params.hf_damping.store(crate::params::clamp::hf_damping(damping));
    }

    pub fn set_lf_damping(&self, damping: f32) {
        self.params.lf_damping.store(crate::params::clamp::lf_damping(damping));
    }

    pub fn set_stereo_width(&self, width: f32) {
        self.params.stereo_width.store(crate::params::clamp::stereo_width(width));
    }

    pub fn set_phase_invert(&self, invert: bool) {
        self.params.phase_invert.store(invert, Ordering::Relaxed);
    }

    /// Engage or release bypass. Transitions are smoothed, not instant, so
    /// toggling bypass mid-stream doesn't click.
    pub fn set_bypass(&self, bypass: bool) {
        self.params.bypass.store(bypass, Ordering::Relaxed);
    }

    /// Instantaneous wet-signal RMS-ish level, published for UI metering.
    #[must_use]
    pub fn current_audio_level(&self) -> f32 {
        f32::from_bits(self.current_audio_level_bits.load(Ordering::Relaxed))
    }

    /// Process an interleaved or planar mono/stereo block in place.
    ///
    /// `left` carries the sole channel in [`ChannelMode::Mono`]; `right` is
    /// read and written only in [`ChannelMode::Stereo`].
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        if self.state != EngineState::Initialized {
            return;
        }

        self.smoothers.pull_targets_from(&self.params);
        self.bypass_gain.set_target(if self.params.bypass.load(Ordering::Relaxed) {
            0.0
        } else {
            1.0
        });

        let stereo = matches!(self.channel_mode, ChannelMode::Stereo);
        let frames = left.len();
        let mut level_accum = 0.0f32;

        // Structural (control-rate) parameters are advanced sample-by-sample
        // to keep their ramp timing correct, but only *applied* to the FDN
        // and cross-feed once per block: each application can rebuild
        // delay-line buffers, and a block (tens to hundreds of samples) is
        // far shorter than any of these parameters' smoothing time
        // constants, so the audible difference is inaudible while the cost
        // drops from per-sample to per-block.
        //
        // `room_size` is the exception: it is never smoothed. A change big
        // enough to require a buffer flush must be detected off the raw
        // published value the very first block it's seen, not off a
        // slowly-ramping ramp value that might not cross the flush
        // threshold for many blocks (making the flush, and the silent
        // first sample after it, dependent on host block size).
        let mut decay = self.smoothers.decay_time.get();
        let mut pre_delay = self.smoothers.pre_delay_ms.get();
        let mut cross = self.smoothers.cross_feed.get();
        let mut density = self.smoothers.density.get();
        let mut hf = self.smoothers.hf_damping.get();
        let mut lf = self.smoothers.lf_damping.get();
        let mut width = self.smoothers.stereo_width.get();
        for _ in 0..frames {
            decay = self.smoothers.decay_time.advance();
            pre_delay = self.smoothers.pre_delay_ms.advance();
            cross = self.smoothers.cross_feed.advance();
            density = self.smoothers.density.advance();
            hf = self.smoothers.hf_damping.advance();
            lf = self.smoothers.lf_damping.advance();
            width = self.smoothers.stereo_width.advance();
        }

        let room = crate::params::clamp::room_size(self.params.room_size.load());
        let flush_needed = self.fdn_left.set_room_size(room);
        self.fdn_right.set_room_size(room);
        if flush_needed {
            self.needs_buffer_flush.store(true, Ordering::Relaxed);
        }
        if self.needs_buffer_flush.swap(false, Ordering::Relaxed) {
            self.fdn_left.flush();
            self.fdn_right.flush();

            #[cfg(feature = "tracing")]
            tracing::debug!(room_size = room, "flushing FDN buffers after room size change");
        }

        self.fdn_left.set_decay_time(decay);
        self.fdn_right.set_decay_time(decay);
        self.fdn_left.set_density(density);
        self.fdn_right.set_density(density);
        self.fdn_left.set_damping(hf, lf);
        self.fdn_right.set_damping(hf, lf);
        self.fdn_left.set_pre_delay_ms(pre_delay);
        self.fdn_right.set_pre_delay_ms(pre_delay);

        self.cross_feed.set_cross_feed_amount(cross);
        self.cross_feed.set_stereo_width(width);
        self.cross_feed.set_phase_invert(self.params.phase_invert.load(Ordering::Relaxed));
        self.cross_feed.set_bypass(!stereo);

        for i in 0..frames {
            let dry_l = scrub_nonfinite(left[i]);
            let dry_r = if stereo { scrub_nonfinite(right[i]) } else { dry_l };

            let wet_dry = self.smoothers.wet_dry_mix.advance() / 100.0;
            let bypass_gain = self.bypass_gain.advance();

            let (fed_l, fed_r) = self.cross_feed.process(dry_l, dry_r);

            let wet_l = self.fdn_left.process(fed_l);
            let wet_r = if stereo { self.fdn_right.process(fed_r) } else { wet_l };

            let out_l = wet_dry_mix(dry_l, wet_l, wet_dry) * bypass_gain + dry_l * (1.0 - bypass_gain);
            let out_r = wet_dry_mix(dry_r, wet_r, wet_dry) * bypass_gain + dry_r * (1.0 - bypass_gain);

            left[i] = scrub_nonfinite(out_l);
            if stereo {
                right[i] = scrub_nonfinite(out_r);
            }

            level_accum += wet_l * wet_l;
        }

        if frames > 0 {
            let rms = (level_accum / frames as f32).sqrt();
            self.current_audio_level_bits.store(rms.to_bits(), Ordering::Relaxed);
        }
    }

    fn apply_smoothed_targets_immediately(&mut self) {
        self.smoothers.pull_targets_from(&self.params);
        self.smoothers.snap_all();
        let room = crate::params::clamp::room_size(self.params.room_size.load());
        self.fdn_left.set_room_size(room);
        self.fdn_right.set_room_size(room);
        self.fdn_left.set_decay_time(self.smoothers.decay_time.get());
        self.fdn_right.set_decay_time(self.smoothers.decay_time.get());
        self.fdn_left.set_density(self.smoothers.density.get());
        self.fdn_right.set_density(self.smoothers.density.get());
        self.fdn_left.set_damping(self.smoothers.hf_damping.get(), self.smoothers.lf_damping.get());
        self.fdn_right.set_damping(self.smoothers.hf_damping.get(), self.smoothers.lf_damping.get());
        self.fdn_left.set_pre_delay_ms(self.smoothers.pre_delay_ms.get());
        self.fdn_right.set_pre_delay_ms(self.smoothers.pre_delay_ms.get());
        self.fdn_left.flush();
        self.fdn_right.flush();
        self.needs_buffer_flush.store(false, Ordering::Relaxed);
    }
}

impl Default for ReverbEngine {
    fn default() -> Self {
        Self::new()
    }
}
