//! List the built-in presets and their parameter values.

use clap::Args;
use reverb_core::Preset;

/// List available presets and their parameter tables.
#[derive(Args)]
pub struct PresetsArgs {}

/// Run the presets command.
pub fn run(_args: PresetsArgs) -> anyhow::Result<()> {
    for preset in [
        Preset::Clean,
        Preset::VocalBooth,
        Preset::Studio,
        Preset::Cathedral,
        Preset::Custom,
    ] {
        let values = preset.values();
        println!("{preset:?}");
        println!("  wet/dry:     {:.1}%", values.wet_dry_mix);
        println!("  decay time:  {:.2}s", values.decay_time);
        println!("  pre-delay:   {:.1}ms", values.pre_delay_ms);
        println!("  cross-feed:  {:.2}", values.cross_feed);
        println!("  room size:   {:.2}", values.room_size);
        println!("  density:     {:.2}", values.density);
        println!("  hf damping:  {:.2}", values.hf_damping);
        println!("  bypassed:    {}", values.bypass);
        println!();
    }
    Ok(())
}
