//! gesture_volume — interactive entry point.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gesture_volume::app::{run, AppConfig};
use gesture_volume::audio::AudioBackend;
use gesture_volume::tracking::DetectorConfig;

/// Set the system volume by pinching thumb and index finger
#[derive(Parser)]
#[command(name = "gesture_volume", version, about)]
struct Cli {
    /// Audio output to control
    #[arg(long, value_enum, env = "GESTURE_VOLUME_AUDIO", default_value = "wpctl")]
    audio: AudioBackend,

    /// Frame width in pixels
    #[arg(long, env = "GESTURE_VOLUME_WIDTH", default_value_t = 640)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, env = "GESTURE_VOLUME_HEIGHT", default_value_t = 480)]
    height: u32,

    /// Hands kept per frame (only the first one drives the volume)
    #[arg(long, env = "GESTURE_VOLUME_MAX_HANDS", default_value_t = 1)]
    max_hands: usize,

    /// Minimum detection confidence, 0.0–1.0
    #[arg(long, env = "GESTURE_VOLUME_MIN_CONFIDENCE", default_value_t = 0.7)]
    min_confidence: f32,

    /// Detect from scratch every frame instead of tracking across frames
    #[arg(long)]
    static_image_mode: bool,

    /// Bottom of the null sink's range
    #[arg(long, env = "GESTURE_VOLUME_NULL_MIN", default_value_t = -65.25, allow_hyphen_values = true)]
    null_min: f64,

    /// Top of the null sink's range
    #[arg(long, env = "GESTURE_VOLUME_NULL_MAX", default_value_t = 0.0, allow_hyphen_values = true)]
    null_max: f64,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info",
        1 => "info,gesture_volume=debug,pinch_core=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    #[cfg(feature = "leap")]
    tracing::info!("mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    tracing::info!("mode: mouse simulation (use --features leap for hardware)");

    match start(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn start(cli: Cli) -> anyhow::Result<()> {
    let cfg = app_config(cli)?;
    run(cfg).context("volume control stopped")
}

fn app_config(cli: Cli) -> anyhow::Result<AppConfig> {
    anyhow::ensure!(cli.max_hands >= 1, "--max-hands must be at least 1");
    anyhow::ensure!(
        (0.0..=1.0).contains(&cli.min_confidence),
        "--min-confidence must be within 0.0–1.0, got {}", cli.min_confidence
    );

    Ok(AppConfig {
        width:      cli.width,
        height:     cli.height,
        detector:   DetectorConfig {
            max_hands:         cli.max_hands,
            min_confidence:    cli.min_confidence,
            static_image_mode: cli.static_image_mode,
        },
        audio:      cli.audio,
        null_range: (cli.null_min, cli.null_max),
    })
}
