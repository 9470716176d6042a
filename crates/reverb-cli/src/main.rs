//! Command-line harness for the reverb-core DSP engine.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "reverb-cli")]
#[command(author, version, about = "Reverb engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an impulse response to a WAV file and report its RT60.
    ImpulseResponse(commands::impulse_response::ImpulseResponseArgs),

    /// Process a WAV file through the reverb engine.
    Process(commands::process::ProcessArgs),

    /// List the built-in presets and their parameter values.
    Presets(commands::presets::PresetsArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ImpulseResponse(args) => commands::impulse_response::run(args),
        Commands::Process(args) => commands::process::run(args),
        Commands::Presets(args) => commands::presets::run(args),
    }
}
