//! driftseq - terminal front end for the drift step sequencer
//!
//! Run with: cargo run -- --clock-hz 6 --steps 12
//! Offline:  cargo run -- --headless 4

mod app;
mod clock;
mod headless;
mod monitor;
mod ui;

use std::{fs, path::Path, path::PathBuf, sync::Mutex};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing::{info, Level};

use app::App;
use drift_seq::{Preferences, SequencerConfig};

#[derive(Parser, Debug)]
#[command(name = "driftseq")]
#[command(
    about = "Noise-field step sequencer with drift and Euclidean filtering",
    long_about = None
)]
struct Cli {
    /// Number of steps (2-16)
    #[arg(long, default_value = "8")]
    steps: usize,

    /// Host clock rate in Hz driving the trigger input
    #[arg(long, default_value = "4.0")]
    clock_hz: f64,

    /// Output amplitude (0-5)
    #[arg(long, default_value = "1.0")]
    amplitude: f32,

    /// Filter control (-1 to 1)
    #[arg(long, default_value = "0.5")]
    filter: f32,

    /// Preferences file, loaded at start and saved on quit
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Render this many seconds offline and print lane events instead of opening the UI
    #[arg(long, value_name = "SECONDS")]
    headless: Option<f32>,

    /// Sample rate for headless rendering
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Write logs to this file (the UI owns the terminal)
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    init_logging(&cli)?;

    let prefs = match &cli.prefs {
        Some(path) => load_prefs(path)?,
        None => Preferences::default(),
    };
    let config = SequencerConfig {
        steps: cli.steps,
        amplitude: cli.amplitude,
        filter_value: cli.filter,
        ..SequencerConfig::default()
    }
    .clamped();

    if let Some(seconds) = cli.headless {
        headless::render(config, prefs, cli.clock_hz, cli.sample_rate, seconds, |event| {
            headless::print_event(event, cli.sample_rate)
        });
        return Ok(());
    }

    let prefs = App::new(config, prefs, cli.clock_hz).run()?;

    if let Some(path) = &cli.prefs {
        save_prefs(path, &prefs)?;
    }
    Ok(())
}

fn init_logging(cli: &Cli) -> EyreResult<()> {
    if let Some(path) = &cli.log {
        let file = fs::File::create(path)
            .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if cli.headless.is_some() {
        tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn load_prefs(path: &Path) -> EyreResult<Preferences> {
    if !path.exists() {
        info!(path = %path.display(), "no preferences file yet, using defaults");
        return Ok(Preferences::default());
    }
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read preferences {}", path.display()))?;
    let prefs = Preferences::from_json_str(&text)
        .wrap_err_with(|| format!("failed to load preferences {}", path.display()))?;
    info!(path = %path.display(), ?prefs, "loaded preferences");
    Ok(prefs)
}

fn save_prefs(path: &Path, prefs: &Preferences) -> EyreResult<()> {
    let text = prefs.to_json_string()?;
    fs::write(path, text)
        .wrap_err_with(|| format!("failed to write preferences {}", path.display()))?;
    info!(path = %path.display(), "saved preferences");
    Ok(())
}
