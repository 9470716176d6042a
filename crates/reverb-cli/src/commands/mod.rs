pub mod impulse_response;
pub mod presets;
pub mod process;

use reverb_core::Preset;

/// Parse a preset name from the CLI into a [`Preset`], case-insensitively.
pub fn parse_preset(name: &str) -> anyhow::Result<Preset> {
    match name.to_ascii_lowercase().as_str() {
        "clean" => Ok(Preset::Clean),
        "vocalbooth" | "vocal-booth" | "vocal_booth" => Ok(Preset::VocalBooth),
        "studio" => Ok(Preset::Studio),
        "cathedral" => Ok(Preset::Cathedral),
        "custom" => Ok(Preset::Custom),
        other => anyhow::bail!(
            "unknown preset '{other}', expected one of: clean, vocalbooth, studio, cathedral, custom"
        ),
    }
}
