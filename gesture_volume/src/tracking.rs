//! Hand landmark sources — both from LeapMotion hardware and mouse simulation.
//!
//! The public interface is [`LandmarkSource::detect`], called once per frame
//! on the control loop's thread. Consumers don't need to know whether hands
//! came from real hardware or from the simulator; both yield 21 normalized
//! keypoints per hand, filtered afterwards by [`select_hands`].

use pinch_core::{HandLandmarks, Landmark, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};

use crate::capture::Frame;
use crate::error::Result;

// ════════════════════════════════════════════════════════════════════════════
// DetectorConfig
// ════════════════════════════════════════════════════════════════════════════

/// Settings every landmark source is run with.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Hands kept per frame, in detection order.
    pub max_hands:         usize,
    /// Hands reported below this confidence are dropped.
    pub min_confidence:    f32,
    /// `false` lets a source track hands across frames instead of detecting
    /// from scratch every time.
    pub static_image_mode: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            max_hands:         1,
            min_confidence:    0.7,
            static_image_mode: false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectedHand / select_hands
// ════════════════════════════════════════════════════════════════════════════

/// A hand as reported by a source, before filtering.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedHand {
    pub landmarks:  HandLandmarks,
    pub confidence: f32,
}

/// Drop low-confidence hands and keep at most `max_hands`, preserving order.
pub fn select_hands(detected: Vec<DetectedHand>, cfg: &DetectorConfig) -> Vec<HandLandmarks> {
    detected
        .into_iter()
        .filter(|h| h.confidence >= cfg.min_confidence)
        .take(cfg.max_hands)
        .map(|h| h.landmarks)
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Window input forwarded to sources that simulate a hand from it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimInput {
    /// Cursor position in window pixels, `None` when outside the window.
    pub cursor:  Option<(f32, f32)>,
    /// Left mouse button held.
    pub pressed: bool,
}

/// Anything that can find hands in a frame.
pub trait LandmarkSource {
    /// Hands visible in `frame`, most confident first. Blocks.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedHand>>;

    /// Window input for this frame. Hardware sources ignore it.
    fn feed_sim_input(&mut self, _input: &SimInput) {}
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource — mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source driven by a mouse drag in the display window.
///
/// Pressing the left button pins the thumb tip where the press started; the
/// index fingertip follows the cursor until release. The rest of the hand is
/// laid out around those two points so the skeleton overlay looks plausible.
#[derive(Debug, Default)]
pub struct SimLandmarkSource {
    anchor: Option<(f32, f32)>,
    cursor: Option<(f32, f32)>,
}

impl SimLandmarkSource {
    pub fn new() -> Self { Self::default() }
}

impl LandmarkSource for SimLandmarkSource {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedHand>> {
        let (Some(anchor), Some(cursor)) = (self.anchor, self.cursor) else {
            return Ok(Vec::new());
        };
        let (w, h) = (frame.width.max(1) as f32, frame.height.max(1) as f32);
        let thumb = Landmark::new(anchor.0 / w, anchor.1 / h);
        let index = Landmark::new(cursor.0 / w, cursor.1 / h);
        Ok(vec![DetectedHand { landmarks: synth_hand(thumb, index), confidence: 1.0 }])
    }

    fn feed_sim_input(&mut self, input: &SimInput) {
        match (input.pressed, input.cursor) {
            (true, Some(pos)) => {
                self.anchor.get_or_insert(pos);
                self.cursor = Some(pos);
            }
            _ => {
                self.anchor = None;
                self.cursor = None;
            }
        }
    }
}

/// Lay out a full 21-point hand whose thumb and index tips sit at the given
/// positions. The wrist hangs below the pinch and the remaining fingers are
/// curled into the palm.
fn synth_hand(thumb: Landmark, index: Landmark) -> HandLandmarks {
    const PALM_DROP:     f32 = 0.25;
    const FINGER_GAP:    f32 = 0.03;
    const INDEX_JOINTS:  [f32; 4] = [0.4, 0.6, 0.8, 1.0];
    const CURL_PROFILE:  [f32; 4] = [0.0, 0.04, 0.06, 0.03];

    let wrist = Landmark::new((thumb.x + index.x) / 2.0, (thumb.y + index.y) / 2.0 + PALM_DROP);
    let lerp  = |a: Landmark, b: Landmark, t: f32| {
        Landmark::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    };

    let mut pts = [wrist; LANDMARK_COUNT];
    for j in 0..4 {
        pts[1 + j] = lerp(wrist, thumb, (j + 1) as f32 / 4.0);
        pts[5 + j] = lerp(wrist, index, INDEX_JOINTS[j]);
    }

    // Unit vector wrist → index tip, and its normal pointing away from the thumb.
    let (dx, dy) = (index.x - wrist.x, index.y - wrist.y);
    let len = (dx * dx + dy * dy).sqrt().max(1e-6);
    let dir = (dx / len, dy / len);
    let mut normal = (-dir.1, dir.0);
    if (thumb.x - wrist.x) * normal.0 + (thumb.y - wrist.y) * normal.1 > 0.0 {
        normal = (-normal.0, -normal.1);
    }

    let knuckle = pts[5];
    for finger in 1..4 {
        let off = FINGER_GAP * finger as f32;
        let base = Landmark::new(knuckle.x + normal.0 * off, knuckle.y + normal.1 * off);
        for (j, reach) in CURL_PROFILE.iter().enumerate() {
            pts[5 + finger * 4 + j] = Landmark::new(base.x + dir.0 * reach, base.y + dir.1 * reach);
        }
    }

    for p in pts.iter_mut() {
        p.x = p.x.clamp(0.0, 1.0);
        p.y = p.y.clamp(0.0, 1.0);
    }
    pts[THUMB_TIP] = thumb;
    pts[INDEX_TIP] = index;
    HandLandmarks::new(pts)
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Joint positions (mm, device-relative) are projected onto the x/y plane of
/// the interaction box and normalized to `[0, 1]`, y pointing down like an
/// image. The connection closes when the source is dropped.
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource {
    connection: leaprs::Connection,
    latest:     HandLatch,
}

#[cfg(feature = "leap")]
impl LeapLandmarkSource {
    pub fn open() -> Result<Self> {
        use crate::error::Error;
        use leaprs::{Connection, ConnectionConfig};

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| Error::Tracking(format!("LeapC connection: {e:?}")))?;
        connection.open()
            .map_err(|e| Error::Tracking(format!("LeapMotion device: {e:?}")))?;
        tracing::info!("LeapMotion connection open");
        Ok(LeapLandmarkSource { connection, latest: HandLatch::default() })
    }
}

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<DetectedHand>> {
        use leaprs::Event;

        // Drain queued messages; the last tracking frame wins.
        let mut tracked: Option<Vec<DetectedHand>> = None;
        while let Ok(msg) = self.connection.poll(2) {
            if let Event::Tracking(frame) = msg.event() {
                tracked = Some(frame.hands().filter_map(|h| project_hand(&h)).collect());
            }
        }
        match tracked {
            Some(hands) => self.latest.track(hands),
            None        => self.latest.idle(),
        }
        Ok(self.latest.hands().to_vec())
    }
}

/// Polls in a row without a tracking frame before the last hands are
/// dropped. The device streams frames (empty or not) continuously while
/// connected, so a long silence means it went away.
#[cfg(any(test, feature = "leap"))]
const STALE_AFTER_POLLS: u32 = 30;

/// Hands from the most recent tracking frame, until they go stale.
#[cfg(any(test, feature = "leap"))]
#[derive(Debug, Default)]
struct HandLatch {
    hands: Vec<DetectedHand>,
    idle:  u32,
}

#[cfg(any(test, feature = "leap"))]
impl HandLatch {
    fn track(&mut self, hands: Vec<DetectedHand>) {
        self.hands = hands;
        self.idle  = 0;
    }

    fn idle(&mut self) {
        self.idle = self.idle.saturating_add(1);
        if self.idle == STALE_AFTER_POLLS && !self.hands.is_empty() {
            tracing::warn!("no tracking frames from LeapMotion, dropping last hand");
        }
        if self.idle >= STALE_AFTER_POLLS {
            self.hands.clear();
        }
    }

    fn hands(&self) -> &[DetectedHand] { &self.hands }
}

#[cfg(feature = "leap")]
fn project_hand(hand: &leaprs::Hand) -> Option<DetectedHand> {
    // Interaction volume above the device, in mm.
    const X_MIN: f32 = -200.0;
    const Y_MIN: f32 = 50.0;
    const SPAN:  f32 = 400.0;

    let norm = |x: f32, y: f32| Landmark::new(
        ((x - X_MIN) / SPAN).clamp(0.0, 1.0),
        (1.0 - (y - Y_MIN) / SPAN).clamp(0.0, 1.0),
    );

    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 { return None; }

    // Wrist ≈ base of the middle metacarpal.
    let wrist = digits[2].metacarpal().prev_joint();
    let mut pts = Vec::with_capacity(LANDMARK_COUNT);
    pts.push(norm(wrist.x, wrist.y));
    for d in &digits[..5] {
        for j in [
            d.proximal().prev_joint(),
            d.intermediate().prev_joint(),
            d.distal().prev_joint(),
            d.distal().next_joint(),
        ] {
            pts.push(norm(j.x, j.y));
        }
    }

    let landmarks = HandLandmarks::from_slice(&pts).ok()?;
    Some(DetectedHand { landmarks, confidence: 1.0 })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
