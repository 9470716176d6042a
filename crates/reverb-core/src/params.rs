//! Engine parameters, atomically published from control threads and read
//! by the audio thread.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// A single `f32` parameter published through an `AtomicU32` bit pattern,
/// loaded/stored with relaxed ordering.
#[derive(Debug)]
pub struct AtomicParam {
    bits: AtomicU32,
}

impl AtomicParam {
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }
}

macro_rules! clamp_range {
    ($name:ident, $min:expr, $max:expr) => {
        #[inline]
        #[must_use]
        pub fn $name(value: f32) -> f32 {
            value.clamp($min, $max)
        }
    };
}

/// Parameter-range clamping functions, one per engine parameter.
pub mod clamp {
    clamp_range!(wet_dry_mix, 0.0, 100.0);
    clamp_range!(decay_time, 0.1, 10.0);
    clamp_range!(pre_delay_ms, 0.0, 200.0);
    clamp_range!(cross_feed, 0.0, 1.0);
    clamp_range!(room_size, 0.0, 1.0);
    clamp_range!(density, 0.0, 1.0);
    clamp_range!(hf_damping, 0.0, 1.0);
    clamp_range!(lf_damping, 0.0, 1.0);
    clamp_range!(stereo_width, 0.0, 2.0);
}

/// Atomically published engine parameters.
///
/// The audio thread's smoothers read `target()`-equivalents from these via
/// [`AtomicParam::load`] at the top of each block; setters on any thread
/// call [`AtomicParam::store`] after clamping.
#[derive(Debug)]
pub struct EngineParameters {
    pub wet_dry_mix: AtomicParam,
    pub decay_time: AtomicParam,
    pub pre_delay_ms: AtomicParam,
    pub cross_feed: AtomicParam,
    pub room_size: AtomicParam,
    pub density: AtomicParam,
    pub hf_damping: AtomicParam,
    pub lf_damping: AtomicParam,
    pub stereo_width: AtomicParam,
    pub phase_invert: AtomicBool,
    pub bypass: AtomicBool,
}

/// Initial LF damping, not part of the preset table (left at the engine's
/// current value across preset switches).
const DEFAULT_LF_DAMPING: f32 = 0.2;
/// Initial stereo width: unity, i.e. neither narrowed nor widened.
const DEFAULT_STEREO_WIDTH: f32 = 1.0;

impl EngineParameters {
    #[must_use]
    pub fn from_preset(preset: Preset) -> Self {
        let values = preset.values();
        Self {
            wet_dry_mix: AtomicParam::new(values.wet_dry_mix),
            decay_time: AtomicParam::new(values.decay_time),
            pre_delay_ms: AtomicParam::new(values.pre_delay_ms),
            cross_feed: AtomicParam::new(values.cross_feed),
            room_size: AtomicParam::new(values.room_size),
            density: AtomicParam::new(values.density),
            hf_damping: AtomicParam::new(values.hf_damping),
            lf_damping: AtomicParam::new(DEFAULT_LF_DAMPING),
            stereo_width: AtomicParam::new(DEFAULT_STEREO_WIDTH),
            phase_invert: AtomicBool::new(false),
            bypass: AtomicBool::new(values.bypass),
        }
    }

    /// Overwrite every field with a preset's values (Custom is a no-op on
    /// values but still clears bypass). `lf_damping` and
    /// `stereo_width` are left untouched, matching [`PresetValues`].
    pub fn apply_preset(&self, preset: Preset) {
        if preset == Preset::Custom {
            self.bypass.store(false, Ordering::Relaxed);
            return;
        }
        let values = preset.values();
        self.wet_dry_mix.store(values.wet_dry_mix);
        self.decay_time.store(values.decay_time);
        self.pre_delay_ms.store(values.pre_delay_ms);
        self.cross_feed.store(values.cross_feed);
        self.room_size.store(values.room_size);
        self.density.store(values.density);
        self.hf_damping.store(values.hf_damping);
        self.bypass.store(values.bypass, Ordering::Relaxed);
    }
}

/// Named reverb presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Clean,
    VocalBooth,
    Studio,
    Cathedral,
    Custom,
}

/// The subset of [`EngineParameters`] a preset overwrites (lf_damping and
/// stereo_width are not part of the preset table and are left at the
/// engine's current value).
#[derive(Debug, Clone, Copy)]
pub struct PresetValues {
    pub wet_dry_mix: f32,
    pub decay_time: f32,
    pub pre_delay_ms: f32,
    pub cross_feed: f32,
    pub room_size: f32,
    pub density: f32,
    pub hf_damping: f32,
    pub bypass: bool,
}

impl Preset {
    /// The fixed preset table, applied verbatim.
    #[must_use]
    pub fn values(self) -> PresetValues {
        match self {
            Preset::Clean => PresetValues {
                wet_dry_mix: 0.0,
                decay_time: 0.1,
                pre_delay_ms: 0.0,
                cross_feed: 0.0,
                room_size: 0.0,
                density: 0.0,
                hf_damping: 0.0,
                bypass: true,
            },
            Preset::VocalBooth => PresetValues {
                wet_dry_mix: 18.0,
                decay_time: 0.9,
                pre_delay_ms: 8.0,
                cross_feed: 0.3,
                room_size: 0.35,
                density: 0.70,
                hf_damping: 0.30,
                bypass: false,
            },
            Preset::Studio => PresetValues {
                wet_dry_mix: 40.0,
                decay_time: 1.7,
                pre_delay_ms: 15.0,
                cross_feed: 0.5,
                room_size: 0.60,
                density: 0.85,
                hf_damping: 0.45,
                bypass: false,
            },
            Preset::Cathedral => PresetValues {
                wet_dry_mix: 65.0,
                decay_time: 2.8,
                pre_delay_ms: 25.0,
                cross_feed: 0.7,
                room_size: 0.85,
                density: 0.60,
                hf_damping: 0.60,
                bypass: false,
            },
            Preset::Custom => PresetValues {
                wet_dry_mix: 0.0,
                decay_time: 0.1,
                pre_delay_ms: 0.0,
                cross_feed: 0.0,
                room_size: 0.0,
                density: 0.0,
                hf_damping: 0.0,
                bypass: false,
            },
        }
    }
}
