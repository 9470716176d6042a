//! Process a WAV file through the reverb engine and write the result.

use std::path::PathBuf;

use clap::Args;
use reverb_core::ReverbEngine;

use super::parse_preset;

const BLOCK_SIZE: usize = 512;

/// Process a WAV file through the reverb engine.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV path.
    pub input: PathBuf,

    /// Output WAV path.
    pub output: PathBuf,

    /// Preset to apply (clean, vocalbooth, studio, cathedral).
    #[arg(long, default_value = "studio")]
    pub preset: String,

    /// Override the preset's wet/dry mix, in percent.
    #[arg(long)]
    pub wet_dry_mix: Option<f32>,

    /// Override the preset's decay time, in seconds.
    #[arg(long)]
    pub decay_time: Option<f32>,
}

/// Run the process command.
pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let preset = parse_preset(&args.preset)?;

    let mut reader = hound::WavReader::open(&args.input)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels != 1 && channels != 2 {
        anyhow::bail!("only mono or stereo input is supported, got {channels} channels");
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<_, _>>()?
        }
    };

    let frames = samples.len() / channels;
    let mut left: Vec<f32> = Vec::with_capacity(frames);
    let mut right: Vec<f32> = Vec::with_capacity(frames);
    if channels == 2 {
        for chunk in samples.chunks_exact(2) {
            left.push(chunk[0]);
            right.push(chunk[1]);
        }
    } else {
        left = samples;
    }

    let mut engine = ReverbEngine::new();
    if !engine.initialize(spec.sample_rate as f32, BLOCK_SIZE, channels as u8) {
        anyhow::bail!("failed to initialize reverb engine at {} Hz", spec.sample_rate);
    }
    engine.set_preset(preset);
    if let Some(mix) = args.wet_dry_mix {
        engine.set_wet_dry_mix(mix);
    }
    if let Some(decay) = args.decay_time {
        engine.set_decay_time(decay);
    }

    for chunk_start in (0..frames).step_by(BLOCK_SIZE) {
        let end = (chunk_start + BLOCK_SIZE).min(frames);
        let mut l_block = left[chunk_start..end].to_vec();
        let mut r_block = if channels == 2 {
            right[chunk_start..end].to_vec()
        } else {
            Vec::new()
        };
        engine.process_block(&mut l_block, &mut r_block);
        left[chunk_start..end].copy_from_slice(&l_block);
        if channels == 2 {
            right[chunk_start..end].copy_from_slice(&r_block);
        }
    }

    let out_spec = hound::WavSpec {
        channels: channels as u16,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&args.output, out_spec)?;
    for i in 0..frames {
        writer.write_sample(left[i])?;
        if channels == 2 {
            writer.write_sample(right[i])?;
        }
    }
    writer.finalize()?;

    println!(
        "Processed {} frames ({} channel{}) -> {}",
        frames,
        channels,
        if channels == 1 { "" } else { "s" },
        args.output.display()
    );

    Ok(())
}
