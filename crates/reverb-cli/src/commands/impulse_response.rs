//! Render an impulse response through the reverb engine and report its RT60.

use std::path::PathBuf;

use clap::Args;
use reverb_core::rt60::{capture_impulse_response, energy_envelope, measure_rt60};
use reverb_core::ReverbEngine;

use super::parse_preset;

/// Render an impulse response to a WAV file and report its measured RT60.
#[derive(Args)]
pub struct ImpulseResponseArgs {
    /// Output WAV path.
    pub output: PathBuf,

    /// Preset to render (clean, vocalbooth, studio, cathedral).
    #[arg(long, default_value = "cathedral")]
    pub preset: String,

    /// Sample rate in Hz.
    #[arg(long, default_value_t = 48000.0)]
    pub sample_rate: f32,

    /// Capture length in seconds.
    #[arg(long, default_value_t = 4.0)]
    pub duration: f32,
}

/// Run the impulse-response command.
pub fn run(args: ImpulseResponseArgs) -> anyhow::Result<()> {
    let preset = parse_preset(&args.preset)?;

    let mut engine = ReverbEngine::new();
    if !engine.initialize(args.sample_rate, 1, 1) {
        anyhow::bail!("failed to initialize reverb engine at {} Hz", args.sample_rate);
    }
    engine.set_preset(preset);

    // Let the slow room-size/decay-time smoothers settle to their targets
    // before capturing the response.
    let settle_samples = (args.sample_rate * 0.5) as usize;
    for _ in 0..settle_samples {
        let mut l = [0.0f32];
        let mut r: [f32; 0] = [];
        engine.process_block(&mut l, &mut r);
    }

    let captured = capture_impulse_response(args.sample_rate, args.duration, |input| {
        let mut l = [input];
        let mut r: [f32; 0] = [];
        engine.process_block(&mut l, &mut r);
        l[0]
    });

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: args.sample_rate as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&args.output, spec)?;
    for &sample in &captured {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    let envelope = energy_envelope(&captured);
    match measure_rt60(&envelope, args.sample_rate) {
        Some(rt60) => println!("RT60: {rt60:.3}s (written to {})", args.output.display()),
        None => println!(
            "RT60: tail never decayed 60dB within {:.1}s (written to {})",
            args.duration,
            args.output.display()
        ),
    }

    Ok(())
}
