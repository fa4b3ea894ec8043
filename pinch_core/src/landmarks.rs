//! Hand keypoints and the pinch-distance metric.
//!
//! A hand is 21 normalized `(x, y)` points in the usual palm-landmark order:
//! wrist first, then four points per digit from the base to the tip.

use crate::{CoreError, Result};

// ════════════════════════════════════════════════════════════════════════════
// Keypoint indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP:   usize = 16;
pub const PINKY_TIP:  usize = 20;

/// Bone segments between keypoints, for drawing the hand skeleton.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    // thumb
    (0, 1), (1, 2), (2, 3), (3, 4),
    // index
    (0, 5), (5, 6), (6, 7), (7, 8),
    // middle
    (5, 9), (9, 10), (10, 11), (11, 12),
    // ring
    (9, 13), (13, 14), (14, 15), (15, 16),
    // pinky and palm edge
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One normalized keypoint; `x` and `y` are fractions of frame width/height.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y }
    }

    /// Scale to whole pixel coordinates, truncating toward zero.
    pub fn to_pixel(self, width: u32, height: u32) -> (i32, i32) {
        (
            (self.x * width as f32) as i32,
            (self.y * height as f32) as i32,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandLandmarks
// ════════════════════════════════════════════════════════════════════════════

/// The fixed-length keypoint set of one detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        HandLandmarks { points }
    }

    /// Build from a detector's output, which must hold exactly
    /// [`LANDMARK_COUNT`] points.
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        let points: [Landmark; LANDMARK_COUNT] = points.try_into().map_err(|_| {
            CoreError::LandmarkCount { expected: LANDMARK_COUNT, actual: points.len() }
        })?;
        Ok(HandLandmarks { points })
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] { &self.points }
    pub fn thumb_tip(&self) -> Landmark { self.points[THUMB_TIP] }
    pub fn index_tip(&self) -> Landmark { self.points[INDEX_TIP] }
}

// ════════════════════════════════════════════════════════════════════════════
// Pinch metric
// ════════════════════════════════════════════════════════════════════════════

/// Euclidean pixel distance between the thumb tip and index fingertip of
/// `hand` on a `width`×`height` frame.
pub fn pinch_distance(hand: &HandLandmarks, width: u32, height: u32) -> f64 {
    let (x1, y1) = hand.thumb_tip().to_pixel(width, height);
    let (x2, y2) = hand.index_tip().to_pixel(width, height);
    f64::from(x2 - x1).hypot(f64::from(y2 - y1))
}

/// Pinch distance of the first hand in detection order, if any.
///
/// Further hands are ignored, never averaged in.
pub fn first_hand_distance(hands: &[HandLandmarks], width: u32, height: u32) -> Option<f64> {
    hands.first().map(|hand| pinch_distance(hand, width, height))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
