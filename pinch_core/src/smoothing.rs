//! First-order low-pass filter over per-frame pinch distances.

use crate::SMOOTHING_ALPHA;

/// Exponentially-weighted moving average with a single scalar of state.
///
/// Starts at 0 and is never reset; frames without a hand simply don't call
/// [`Smoother::update`], so the value holds.
#[derive(Debug)]
pub struct Smoother {
    alpha: f64,
    value: f64,
}

impl Default for Smoother {
    fn default() -> Self { Self::new() }
}

impl Smoother {
    pub fn new() -> Self {
        Self::with_alpha(SMOOTHING_ALPHA)
    }

    /// `alpha` is clamped to `[0, 1]`; 0 disables smoothing, 1 freezes the value.
    pub fn with_alpha(alpha: f64) -> Self {
        Smoother { alpha: alpha.clamp(0.0, 1.0), value: 0.0 }
    }

    /// Fold in one raw sample and return the new smoothed value.
    pub fn update(&mut self, raw: f64) -> f64 {
        self.value = self.alpha * self.value + (1.0 - self.alpha) * raw;
        self.value
    }

    pub fn value(&self) -> f64 { self.value }
    pub fn alpha(&self) -> f64 { self.alpha }
}
