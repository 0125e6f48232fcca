//! polysynth CLI: render or play an event script.
//!
//! Usage:
//!   poly-cli voice 0 freq 1000 amp 255 ascale 8 en 1 time 32000
//!   poly-cli --events song.bin --wav out.wav
//!   poly-cli --raw out.raw voice 0 freq 440 amp 100 en 1 time 16000

use anyhow::{bail, Context, Result};
use clap::Parser;
use poly_master::{write_raw, Controller, SynthConfig};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "poly-cli", about = "Fixed-point multi-voice synthesizer")]
struct Args {
    /// Output sample rate in Hz.
    #[arg(long, default_value_t = 32_000)]
    sample_rate: u32,

    /// Number of voices.
    #[arg(long, default_value_t = 8)]
    channels: usize,

    /// Binary event file to play instead of script tokens.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Render to a 16-bit mono WAV file.
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Render to headerless little-endian samples, amplified.
    #[arg(long)]
    raw: Option<PathBuf>,

    /// Longest render, in seconds.
    #[arg(long, default_value_t = 300)]
    max_seconds: u32,

    /// Script tokens, e.g. `voice 0 freq 440 amp 255 en 1 time 32000`.
    #[arg(allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = SynthConfig::new(args.sample_rate, args.channels)
        .context("invalid engine configuration")?;
    let mut ctrl = Controller::new(config);

    match &args.events {
        Some(path) => {
            let data =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            ctrl.load_binary(&data)
                .with_context(|| format!("failed to parse {}", path.display()))?;
        }
        None => ctrl.load_script(&args.tokens).context("failed to parse script")?,
    }

    if ctrl.events().is_empty() {
        bail!("nothing to play: pass script tokens or --events FILE");
    }
    tracing::info!(
        events = ctrl.events().len(),
        sample_rate = config.sample_rate(),
        channels = config.channels(),
        "loaded"
    );

    if args.wav.is_none() && args.raw.is_none() {
        return play_audio(&mut ctrl);
    }

    let max_samples = config.sample_rate() as usize * args.max_seconds as usize;
    let samples = ctrl.render_samples(max_samples).context("render failed")?;
    tracing::info!(samples = samples.len(), "rendered");

    if let Some(path) = &args.wav {
        let wav = poly_master::samples_to_wav(&samples, config.sample_rate());
        fs::write(path, &wav).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote {} ({} bytes)", path.display(), wav.len());
    }

    if let Some(path) = &args.raw {
        let file = fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        write_raw(&mut w, &samples)
            .and_then(|_| w.flush())
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote {} ({} samples)", path.display(), samples.len());
    }

    Ok(())
}

fn play_audio(ctrl: &mut Controller) -> Result<()> {
    ctrl.play();
    println!("Playing...");

    let configured_rate = ctrl.config().sample_rate();
    while ctrl.is_playing() {
        if let Some(played) = ctrl.samples_played() {
            let sample_rate = ctrl.playback_sample_rate().unwrap_or(configured_rate);
            print!("\r{:8.2}s", played as f64 / sample_rate as f64);
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    println!("\rDone.          ");
    Ok(())
}
