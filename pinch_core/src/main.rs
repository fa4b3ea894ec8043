//! pinch_trace — run a sequence of raw pinch distances through the control
//! core and print what each frame did.
//!
//! ```text
//! pinch_trace 200 200 200 - 10 10 10 250
//! ```
//!
//! A `-` stands for a frame where no hand was detected.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pinch_core::{RecordingSink, VolumeController, VolumeRange};

#[derive(Parser)]
#[command(name = "pinch_trace", version, about = "Trace pinch distances through smoothing, mute and volume mapping")]
struct Cli {
    /// Raw pinch distances in pixels, one per frame (`-` = no hand)
    #[arg(required = true, allow_hyphen_values = true)]
    distances: Vec<String>,

    /// Bottom of the sink's volume range
    #[arg(long, default_value_t = -65.25, allow_hyphen_values = true)]
    min: f64,

    /// Top of the sink's volume range
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    max: f64,

    /// Show mute transitions and per-frame internals (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "pinch_core=debug",
        _ => "pinch_core=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let (frames, range) = match settings(&cli) {
        Ok(s)  => s,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return ExitCode::FAILURE;
        }
    };

    let mut sink = RecordingSink::new(range);
    let mut ctl  = VolumeController::new(range);

    println!();
    println!("  range [{}, {}]", range.min(), range.max());
    println!("  ┌───────┬──────────┬──────────┬─────────┬────────────┬────────┐");
    println!("  │ frame │      raw │ smoothed │ state   │    applied │ label  │");
    println!("  ├───────┼──────────┼──────────┼─────────┼────────────┼────────┤");

    for (i, frame) in frames.iter().enumerate() {
        let Some(raw) = *frame else {
            println!("  │ {:>5} │ {:>8} │ {:>8.2} │ {:<7} │ {:>10} │ {:<6} │",
                i, "-", ctl.smoothed_distance(), state_name(&ctl), "-", ctl.feedback().label());
            continue;
        };

        let out = match ctl.apply_distance(raw, &mut sink) {
            Ok(o)  => o,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        };
        let applied = out.applied.map_or_else(|| "-".to_string(), |l| format!("{l:.3}"));
        let marker  = if out.transition.is_some() { " *" } else { "" };
        println!("  │ {:>5} │ {:>8.2} │ {:>8.2} │ {:<7} │ {:>10} │ {:<6} │{}",
            i, out.raw, out.smoothed, state_name(&ctl), applied, ctl.feedback().label(), marker);
    }

    println!("  └───────┴──────────┴──────────┴─────────┴────────────┴────────┘");
    println!("  {} set_volume call(s)   (* = mute state changed)", sink.applied.len());
    println!();
    ExitCode::SUCCESS
}

/// Validated frames and volume range, or the message to report.
fn settings(cli: &Cli) -> Result<(Vec<Option<f64>>, VolumeRange), String> {
    let frames = parse_frames(&cli.distances).map_err(|bad| format!("not a distance: {bad:?}"))?;
    let range  = VolumeRange::new(cli.min, cli.max).map_err(|e| e.to_string())?;
    Ok((frames, range))
}

fn parse_frames(args: &[String]) -> Result<Vec<Option<f64>>, String> {
    args.iter()
        .map(|a| match a.trim() {
            "-" => Ok(None),
            s   => s.parse::<f64>()
                .ok()
                .filter(|d| d.is_finite() && *d >= 0.0)
                .map(Some)
                .ok_or_else(|| a.clone()),
        })
        .collect()
}

fn state_name(ctl: &VolumeController) -> &'static str {
    if ctl.mute_state().is_muted() { "muted" } else { "unmuted" }
}
