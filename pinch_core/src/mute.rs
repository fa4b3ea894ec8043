//! Two-state mute hysteresis.

use crate::DISTANCE_FLOOR_PX;

// ════════════════════════════════════════════════════════════════════════════
// MuteState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MuteState {
    #[default]
    Unmuted,
    Muted,
}

impl MuteState {
    pub fn is_muted(self) -> bool { self == MuteState::Muted }
}

// ════════════════════════════════════════════════════════════════════════════
// MuteSwitch
// ════════════════════════════════════════════════════════════════════════════

/// Mutes when the smoothed distance drops under the threshold and unmutes
/// once it is back at or above it. Holds otherwise; there is no timeout.
#[derive(Debug)]
pub struct MuteSwitch {
    state:     MuteState,
    threshold: f64,
}

impl Default for MuteSwitch {
    fn default() -> Self { Self::new() }
}

impl MuteSwitch {
    pub fn new() -> Self {
        Self::with_threshold(DISTANCE_FLOOR_PX)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        MuteSwitch { state: MuteState::Unmuted, threshold }
    }

    /// Evaluate one smoothed distance. Returns the new state if it changed.
    pub fn update(&mut self, smoothed: f64) -> Option<MuteState> {
        let next = match self.state {
            MuteState::Unmuted if smoothed < self.threshold  => MuteState::Muted,
            MuteState::Muted   if smoothed >= self.threshold => MuteState::Unmuted,
            held => held,
        };
        if next == self.state {
            return None;
        }
        self.state = next;
        Some(next)
    }

    pub fn state(&self) -> MuteState { self.state }
}
