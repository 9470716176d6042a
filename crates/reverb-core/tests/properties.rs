//! Property-based tests covering randomized parameter ranges: feedback
//! matrix orthogonality, FDN stability under sustained noise, and engine
//! parameter clamping.

use proptest::prelude::*;
use reverb_core::matrix::FeedbackMatrix;
use reverb_core::params::{clamp, EngineParameters, Preset};
use reverb_core::FdnCore;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any line count in range and any gain, a freshly built feedback
    /// matrix's *unscaled* Householder matrix stays orthogonal to a tight
    /// tolerance, independent of the gain it's scaled by.
    #[test]
    fn matrix_orthogonality_holds_across_size_and_gain(
        size in 4usize..=12usize,
        gain in 0.0f32..1.5f32,
    ) {
        let matrix = FeedbackMatrix::new(size, gain);
        prop_assert!(
            matrix.orthogonality_error() < 1e-3,
            "size={} gain={} orthogonality error={}",
            size, gain, matrix.orthogonality_error()
        );
    }

    /// For any room size, decay time, and damping combination in their
    /// documented ranges, the FDN stays finite and bounded under sustained
    /// bounded noise.
    #[test]
    fn fdn_stays_stable_across_randomized_parameters(
        room_size in 0.0f32..=1.0f32,
        decay_time in 0.1f32..=10.0f32,
        hf_damping in 0.0f32..=1.0f32,
        lf_damping in 0.0f32..=1.0f32,
        density in 0.0f32..=1.0f32,
        seed in 1u32..=u32::MAX,
    ) {
        let mut fdn = FdnCore::new(48000.0, 8, room_size, decay_time, hf_damping, lf_damping, density);
        let mut state = seed;
        let mut sum_sq = 0.0f32;
        let samples = 4800;
        for _ in 0..samples {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let noise = ((state as f32 / u32::MAX as f32) - 0.5) * 0.2;
            let out = fdn.process(noise);
            prop_assert!(out.is_finite(), "FDN output went non-finite");
            sum_sq += out * out;
        }
        let rms = (sum_sq / samples as f32).sqrt();
        prop_assert!(rms < 2.0, "RMS ran away: {rms}");
    }

    /// Every `EngineParameters` setter clamps an arbitrary out-of-range
    /// `f32` into its documented range.
    #[test]
    fn engine_parameter_setters_always_clamp(
        wet_dry_mix in -1e6f32..1e6f32,
        decay_time in -1e6f32..1e6f32,
        pre_delay_ms in -1e6f32..1e6f32,
        cross_feed in -1e6f32..1e6f32,
        room_size in -1e6f32..1e6f32,
        density in -1e6f32..1e6f32,
        hf_damping in -1e6f32..1e6f32,
        lf_damping in -1e6f32..1e6f32,
        stereo_width in -1e6f32..1e6f32,
    ) {
        let params = EngineParameters::from_preset(Preset::Clean);

        params.wet_dry_mix.store(clamp::wet_dry_mix(wet_dry_mix));
        params.decay_time.store(clamp::decay_time(decay_time));
        params.pre_delay_ms.store(clamp::pre_delay_ms(pre_delay_ms));
        params.cross_feed.store(clamp::cross_feed(cross_feed));
        params.room_size.store(clamp::room_size(room_size));
        params.density.store(clamp::density(density));
        params.hf_damping.store(clamp::hf_damping(hf_damping));
        params.lf_damping.store(clamp::lf_damping(lf_damping));
        params.stereo_width.store(clamp::stereo_width(stereo_width));

        prop_assert!((0.0..=100.0).contains(&params.wet_dry_mix.load()));
        prop_assert!((0.1..=10.0).contains(&params.decay_time.load()));
        prop_assert!((0.0..=200.0).contains(&params.pre_delay_ms.load()));
        prop_assert!((0.0..=1.0).contains(&params.cross_feed.load()));
        prop_assert!((0.0..=1.0).contains(&params.room_size.load()));
        prop_assert!((0.0..=1.0).contains(&params.density.load()));
        prop_assert!((0.0..=1.0).contains(&params.hf_damping.load()));
        prop_assert!((0.0..=1.0).contains(&params.lf_damping.load()));
        prop_assert!((0.0..=2.0).contains(&params.stereo_width.load()));
    }
}
