//! # pinch_core
//!
//! The gesture-to-volume control core: turns the thumb-tip / index-tip
//! distance of a tracked hand into a system volume level.
//!
//! ## Pipeline (one step per frame with a detected hand)
//!
//! | Stage | Type | Output |
//! |---|---|---|
//! | Metric extraction | [`pinch_distance`] | raw pixel distance |
//! | Temporal smoothing | [`Smoother`] | `0.8·prev + 0.2·raw` |
//! | Mute hysteresis | [`MuteSwitch`] | `Muted` below 30 px, `Unmuted` at or above |
//! | Volume mapping | [`VolumeRange::map_distance`] | `[30, 200]` px → `[min, max]` |
//! | Application | [`AudioSink::set_volume`] | skipped while muted |
//!
//! Frames without a hand leave every piece of state untouched.
//!
//! ## Quick start
//!
//! ```rust
//! use pinch_core::{RecordingSink, VolumeController, VolumeRange};
//!
//! let mut sink = RecordingSink::new(VolumeRange::new(-65.25, 0.0).unwrap());
//! let mut ctl  = VolumeController::from_sink(&sink).unwrap();
//!
//! // Three frames of a wide-open pinch.
//! for _ in 0..3 {
//!     ctl.apply_distance(200.0, &mut sink).unwrap();
//! }
//! assert!((ctl.smoothed_distance() - 97.6).abs() < 1e-9);
//! assert_eq!(sink.applied.len(), 3);
//! assert!(sink.applied.windows(2).all(|w| w[0] < w[1]));
//! ```

pub mod controller;
pub mod landmarks;
pub mod mute;
pub mod smoothing;
pub mod volume;

pub use controller::{Feedback, FrameOutcome, VolumeController};
pub use landmarks::{
    first_hand_distance, pinch_distance, HandLandmarks, Landmark,
    HAND_CONNECTIONS, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP, WRIST,
};
pub use mute::{MuteState, MuteSwitch};
pub use smoothing::Smoother;
pub use volume::{AudioSink, RecordingSink, VolumeRange};

use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Design constants
// ════════════════════════════════════════════════════════════════════════════

/// Weight of the previous smoothed value in the moving average.
pub const SMOOTHING_ALPHA: f64 = 0.8;

/// Pinch distance (px) below which the controller mutes.
///
/// Also the bottom of the distance domain mapped onto the volume range, so
/// the mute zone begins exactly where the quietest level would.
pub const DISTANCE_FLOOR_PX: f64 = 30.0;

/// Pinch distance (px) mapped onto the maximum volume.
pub const DISTANCE_CEILING_PX: f64 = 200.0;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the control core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A hand was built from the wrong number of keypoints.
    #[error("expected {expected} hand landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    /// The sink reported a range that cannot be interpolated onto.
    #[error("invalid volume range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    /// The audio sink failed to report or apply a level.
    #[error("audio sink error: {0}")]
    Sink(String),
}
