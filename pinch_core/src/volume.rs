//! Volume range, distance → level mapping, and the audio sink seam.

use crate::{CoreError, Result, DISTANCE_CEILING_PX, DISTANCE_FLOOR_PX};

// ════════════════════════════════════════════════════════════════════════════
// VolumeRange
// ════════════════════════════════════════════════════════════════════════════

/// The `(min, max)` levels an audio endpoint accepts.
///
/// Units are whatever the endpoint speaks (linear gain, dB, …); the range is
/// only treated as an ordered scalar interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeRange {
    min: f64,
    max: f64,
}

impl VolumeRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(CoreError::InvalidRange { min, max });
        }
        Ok(VolumeRange { min, max })
    }

    pub fn min(&self) -> f64 { self.min }
    pub fn max(&self) -> f64 { self.max }

    /// Linearly map a pinch distance from `[DISTANCE_FLOOR_PX,
    /// DISTANCE_CEILING_PX]` onto `[min, max]`, clamping outside the domain.
    pub fn map_distance(&self, distance: f64) -> f64 {
        interp(distance, (DISTANCE_FLOOR_PX, DISTANCE_CEILING_PX), (self.min, self.max))
    }

    /// Position of `level` within the range, `0.0` at `min` and `1.0` at `max`.
    pub fn fraction(&self, level: f64) -> f64 {
        (level - self.min) / (self.max - self.min)
    }
}

/// Piecewise-linear interpolation with flat extension past both ends.
fn interp(x: f64, (x0, x1): (f64, f64), (y0, y1): (f64, f64)) -> f64 {
    if x <= x0 {
        y0
    } else if x >= x1 {
        y1
    } else {
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AudioSink — the output endpoint
// ════════════════════════════════════════════════════════════════════════════

/// An audio output whose master level can be set.
///
/// Both calls block; implementations talk to the OS synchronously.
pub trait AudioSink {
    /// Supported level range. Queried once at startup.
    fn volume_range(&self) -> Result<VolumeRange>;

    /// Apply `level`, which lies within [`AudioSink::volume_range`].
    fn set_volume(&mut self, level: f64) -> Result<()>;
}

// ── recording backend (dry runs, traces, tests) ───────────────────────────

/// Sink that remembers every level it was asked to apply.
#[derive(Debug)]
pub struct RecordingSink {
    range:       VolumeRange,
    pub applied: Vec<f64>,
}

impl RecordingSink {
    pub fn new(range: VolumeRange) -> Self {
        RecordingSink { range, applied: Vec::new() }
    }

    pub fn last(&self) -> Option<f64> { self.applied.last().copied() }
}

impl AudioSink for RecordingSink {
    fn volume_range(&self) -> Result<VolumeRange> { Ok(self.range) }

    fn set_volume(&mut self, level: f64) -> Result<()> {
        self.applied.push(level);
        Ok(())
    }
}
