//! System audio output backends.
//!
//! Each backend implements [`pinch_core::AudioSink`]. Opening one is the only
//! place the output device is probed; if that fails the application does not
//! start.

use std::process::Command;

use pinch_core::{AudioSink, CoreError, VolumeRange};

use crate::error::{Error, Result};

// ════════════════════════════════════════════════════════════════════════════
// AudioBackend — which sink to open
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum AudioBackend {
    /// PipeWire default sink through the `wpctl` tool.
    Wpctl,
    /// Log levels without touching any device.
    Null,
}

/// Open the chosen backend. `null_range` is only used by [`AudioBackend::Null`].
pub fn open_sink(backend: AudioBackend, null_range: VolumeRange) -> Result<Box<dyn AudioSink>> {
    match backend {
        AudioBackend::Wpctl => Ok(Box::new(WpctlSink::connect()?)),
        AudioBackend::Null  => {
            tracing::warn!("null audio sink: volume changes are logged only");
            Ok(Box::new(NullSink::new(null_range)))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// WpctlSink — PipeWire via wpctl
// ════════════════════════════════════════════════════════════════════════════

const DEFAULT_SINK: &str = "@DEFAULT_AUDIO_SINK@";

/// Linear gain, 0.0 silent to 1.0 nominal. wpctl accepts more (boost) but
/// the gesture never asks for it.
const WPCTL_MIN: f64 = 0.0;
const WPCTL_MAX: f64 = 1.0;

pub struct WpctlSink {
    /// Last argument handed to `wpctl set-volume`, to skip identical calls.
    last_sent: Option<String>,
}

impl WpctlSink {
    /// Probe the default sink; fails if `wpctl` is missing or no sink exists.
    pub fn connect() -> Result<Self> {
        let output = Command::new("wpctl")
            .args(["get-volume", DEFAULT_SINK])
            .output()
            .map_err(|e| Error::Audio(format!("failed to execute wpctl: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Audio(format!(
                "wpctl get-volume failed ({}): {}", output.status, stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (volume, muted) = parse_volume_output(&stdout)
            .ok_or_else(|| Error::Audio(format!("unrecognised wpctl output: {:?}", stdout.trim())))?;
        tracing::info!(volume, muted, "connected to PipeWire default sink");

        Ok(WpctlSink { last_sent: None })
    }
}

impl AudioSink for WpctlSink {
    fn volume_range(&self) -> pinch_core::Result<VolumeRange> {
        VolumeRange::new(WPCTL_MIN, WPCTL_MAX)
    }

    fn set_volume(&mut self, level: f64) -> pinch_core::Result<()> {
        let arg = format!("{:.3}", level.clamp(WPCTL_MIN, WPCTL_MAX));
        if self.last_sent.as_deref() == Some(arg.as_str()) {
            return Ok(());
        }

        let output = Command::new("wpctl")
            .args(["set-volume", DEFAULT_SINK, &arg])
            .output()
            .map_err(|e| CoreError::Sink(format!("failed to execute wpctl: {e}")))?;

        if !output.status.success() {
            return Err(CoreError::Sink(format!("wpctl set-volume failed with status: {}", output.status)));
        }

        tracing::trace!(level = %arg, "wpctl set-volume");
        self.last_sent = Some(arg);
        Ok(())
    }
}

/// Parse `wpctl get-volume` output: `"Volume: 0.45"` or `"Volume: 0.45 [MUTED]"`.
fn parse_volume_output(output: &str) -> Option<(f64, bool)> {
    let mut parts = output.split_whitespace();
    if parts.next()? != "Volume:" {
        return None;
    }
    let volume = parts.next()?.parse::<f64>().ok()?;
    let muted  = output.contains("[MUTED]");
    Some((volume, muted))
}

// ════════════════════════════════════════════════════════════════════════════
// NullSink — dry run
// ════════════════════════════════════════════════════════════════════════════

pub struct NullSink {
    range: VolumeRange,
    last:  Option<f64>,
}

impl NullSink {
    pub fn new(range: VolumeRange) -> Self {
        NullSink { range, last: None }
    }

    pub fn last(&self) -> Option<f64> { self.last }
}

impl AudioSink for NullSink {
    fn volume_range(&self) -> pinch_core::Result<VolumeRange> { Ok(self.range) }

    fn set_volume(&mut self, level: f64) -> pinch_core::Result<()> {
        tracing::debug!(level, "null sink: set volume");
        self.last = Some(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_volume() {
        assert_eq!(parse_volume_output("Volume: 0.45\n"), Some((0.45, false)));
    }

    #[test]
    fn parse_muted_volume() {
        assert_eq!(parse_volume_output("Volume: 1.00 [MUTED]"), Some((1.0, true)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_volume_output(""), None);
        assert_eq!(parse_volume_output("Volume:"), None);
        assert_eq!(parse_volume_output("Volume: loud"), None);
        assert_eq!(parse_volume_output("Error: no sink"), None);
    }

    #[test]
    fn null_sink_reports_configured_range() {
        let range = VolumeRange::new(-65.25, 0.0).unwrap();
        let mut s = NullSink::new(range);
        assert_eq!(s.volume_range().unwrap(), range);
        s.set_volume(-12.0).unwrap();
        assert_eq!(s.last(), Some(-12.0));
    }

    #[test]
    fn open_null_backend() {
        let range = VolumeRange::new(0.0, 100.0).unwrap();
        let sink = open_sink(AudioBackend::Null, range).unwrap();
        assert_eq!(sink.volume_range().unwrap(), range);
    }
}
