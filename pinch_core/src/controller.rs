//! The per-process control state and its frame step.
//!
//! `VolumeController` owns everything that outlives a frame: the smoothed
//! distance, the mute switch, the sink's volume range and the last level it
//! computed. It is deliberately not `Clone`; one tracking source drives one
//! controller.

use crate::landmarks::{first_hand_distance, HandLandmarks};
use crate::mute::{MuteState, MuteSwitch};
use crate::smoothing::Smoother;
use crate::volume::{AudioSink, VolumeRange};
use crate::Result;

// ════════════════════════════════════════════════════════════════════════════
// FrameOutcome / Feedback
// ════════════════════════════════════════════════════════════════════════════

/// What one frame with a detected hand did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutcome {
    pub raw:        f64,
    pub smoothed:   f64,
    pub mute:       MuteState,
    /// Set when this frame flipped the mute state.
    pub transition: Option<MuteState>,
    /// Level handed to the sink, `None` while muted.
    pub applied:    Option<f64>,
}

/// Everything the feedback bar needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Feedback {
    /// Last applied level as a fraction of the range, 0.0–1.0.
    pub fraction: f64,
    pub mute:     MuteState,
}

impl Feedback {
    /// `"MUTED"` or the whole-number percentage, e.g. `"42%"`.
    pub fn label(&self) -> String {
        if self.mute.is_muted() {
            "MUTED".to_string()
        } else {
            format!("{}%", (self.fraction * 100.0) as i32)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// VolumeController
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct VolumeController {
    smoother:    Smoother,
    mute:        MuteSwitch,
    range:       VolumeRange,
    last_target: Option<f64>,
}

impl VolumeController {
    pub fn new(range: VolumeRange) -> Self {
        VolumeController {
            smoother:    Smoother::new(),
            mute:        MuteSwitch::new(),
            range,
            last_target: None,
        }
    }

    /// Query the sink's range once and build a controller around it.
    pub fn from_sink<S: AudioSink + ?Sized>(sink: &S) -> Result<Self> {
        let range = sink.volume_range()?;
        tracing::info!(min = range.min(), max = range.max(), "volume range");
        Ok(Self::new(range))
    }

    /// Run one frame. The first hand is used; with no hands the frame is a
    /// no-op and `Ok(None)` is returned.
    pub fn process<S: AudioSink + ?Sized>(
        &mut self,
        hands:  &[HandLandmarks],
        width:  u32,
        height: u32,
        sink:   &mut S,
    ) -> Result<Option<FrameOutcome>> {
        match first_hand_distance(hands, width, height) {
            Some(raw) => self.apply_distance(raw, sink).map(Some),
            None      => Ok(None),
        }
    }

    /// Feed one raw pinch distance through smoothing, mute and mapping.
    ///
    /// The mute switch is evaluated before mapping, so a frame that unmutes
    /// also applies its level.
    pub fn apply_distance<S: AudioSink + ?Sized>(&mut self, raw: f64, sink: &mut S) -> Result<FrameOutcome> {
        let smoothed   = self.smoother.update(raw);
        let transition = self.mute.update(smoothed);
        if let Some(state) = transition {
            tracing::debug!(?state, smoothed, "mute state changed");
        }

        let mute = self.mute.state();
        let applied = if mute.is_muted() {
            None
        } else {
            let level = self.range.map_distance(smoothed);
            sink.set_volume(level)?;
            self.last_target = Some(level);
            Some(level)
        };

        tracing::trace!(raw, smoothed, ?applied, "frame processed");
        Ok(FrameOutcome { raw, smoothed, mute, transition, applied })
    }

    pub fn smoothed_distance(&self) -> f64       { self.smoother.value() }
    pub fn mute_state(&self)        -> MuteState { self.mute.state() }
    pub fn range(&self)             -> VolumeRange { self.range }
    pub fn last_target(&self)       -> Option<f64> { self.last_target }

    /// Fraction of the range last applied. Not updated while muted, so it
    /// shows the level in force when muting began; 0 before any level.
    pub fn display_fraction(&self) -> f64 {
        self.last_target.map_or(0.0, |level| self.range.fraction(level))
    }

    pub fn feedback(&self) -> Feedback {
        Feedback { fraction: self.display_fraction(), mute: self.mute_state() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};
    use crate::volume::RecordingSink;
    use crate::CoreError;

    const EPS: f64 = 1e-9;

    fn sink() -> RecordingSink {
        RecordingSink::new(VolumeRange::new(-65.25, 0.0).unwrap())
    }

    /// A hand whose pinch spans `px` pixels horizontally on a 640-wide frame.
    fn hand_spanning(px: u32) -> HandLandmarks {
        let mut points = [Landmark::new(0.5, 0.8); LANDMARK_COUNT];
        points[THUMB_TIP] = Landmark::new(0.0, 0.5);
        points[INDEX_TIP] = Landmark::new(px as f32 / 640.0, 0.5);
        HandLandmarks::new(points)
    }

    struct FailingSink;
    impl AudioSink for FailingSink {
        fn volume_range(&self) -> Result<VolumeRange> { VolumeRange::new(0.0, 1.0) }
        fn set_volume(&mut self, _level: f64) -> Result<()> {
            Err(CoreError::Sink("device gone".into()))
        }
    }

    #[test]
    fn small_pinch_mutes_after_one_update() {
        for d in 0..=30 {
            let mut s = sink();
            let mut c = VolumeController::from_sink(&s).unwrap();
            let out = c.apply_distance(d as f64, &mut s).unwrap();
            assert_eq!(out.mute, MuteState::Muted, "raw {d}");
            assert_eq!(out.transition, Some(MuteState::Muted));
            assert!(s.applied.is_empty());
        }
    }

    #[test]
    fn wide_pinch_sequence() {
        let mut s = sink();
        let mut c = VolumeController::from_sink(&s).unwrap();
        let smoothed: Vec<f64> = (0..3)
            .map(|_| c.apply_distance(200.0, &mut s).unwrap().smoothed)
            .collect();
        for (got, want) in smoothed.iter().zip([40.0, 72.0, 97.6]) {
            assert!((got - want).abs() < EPS);
        }
        assert_eq!(s.applied.len(), 3);
        assert!(s.applied.windows(2).all(|w| w[0] < w[1]));
        assert!(s.applied.iter().all(|&l| l < 0.0));
    }

    #[test]
    fn muted_frames_never_set_volume() {
        let mut s = sink();
        let mut c = VolumeController::from_sink(&s).unwrap();
        c.apply_distance(0.0, &mut s).unwrap();
        assert!(c.mute_state().is_muted());

        // Raw values above the threshold, but the smoothed value stays under it.
        for raw in [100.0, 40.0, 50.0] {
            let out = c.apply_distance(raw, &mut s).unwrap();
            assert!(out.smoothed < 30.0);
            assert_eq!(out.applied, None);
        }
        assert!(s.applied.is_empty());

        // Crossing back over re-enters Unmuted and applies in the same frame.
        let mut out = c.apply_distance(200.0, &mut s).unwrap();
        while out.mute.is_muted() {
            out = c.apply_distance(200.0, &mut s).unwrap();
        }
        assert_eq!(out.transition, Some(MuteState::Unmuted));
        assert_eq!(s.applied.len(), 1);
        assert_eq!(out.applied, s.last());
    }

    #[test]
    fn no_hand_frame_changes_nothing() {
        let mut s = sink();
        let mut c = VolumeController::from_sink(&s).unwrap();
        c.process(&[hand_spanning(200)], 640, 480, &mut s).unwrap();
        let before = (c.smoothed_distance(), c.mute_state(), c.last_target());
        let calls  = s.applied.len();

        assert_eq!(c.process(&[], 640, 480, &mut s).unwrap(), None);
        assert_eq!((c.smoothed_distance(), c.mute_state(), c.last_target()), before);
        assert_eq!(s.applied.len(), calls);
    }

    #[test]
    fn process_uses_first_hand_only() {
        let mut s = sink();
        let mut c = VolumeController::from_sink(&s).unwrap();
        let out = c
            .process(&[hand_spanning(150), hand_spanning(0)], 640, 480, &mut s)
            .unwrap()
            .unwrap();
        assert_eq!(out.raw, 150.0);
    }

    #[test]
    fn display_fraction_freezes_while_muted() {
        let mut s = sink();
        let mut c = VolumeController::from_sink(&s).unwrap();
        assert_eq!(c.display_fraction(), 0.0);

        for _ in 0..50 { c.apply_distance(200.0, &mut s).unwrap(); }
        assert!(c.display_fraction() > 0.99);

        // Close the pinch until the switch flips.
        while !c.mute_state().is_muted() {
            c.apply_distance(0.0, &mut s).unwrap();
        }
        let frozen = c.display_fraction();
        assert!(frozen > 0.0);

        for raw in [0.0, 10.0, 40.0] {
            c.apply_distance(raw, &mut s).unwrap();
            assert!(c.mute_state().is_muted());
            assert_eq!(c.display_fraction(), frozen);
        }
        assert_eq!(c.feedback().label(), "MUTED");
    }

    #[test]
    fn feedback_label_truncates_percentage() {
        let f = Feedback { fraction: 0.429, mute: MuteState::Unmuted };
        assert_eq!(f.label(), "42%");
        let f = Feedback { fraction: 1.0, mute: MuteState::Unmuted };
        assert_eq!(f.label(), "100%");
    }

    #[test]
    fn sink_failure_propagates() {
        let mut s = FailingSink;
        let mut c = VolumeController::from_sink(&s).unwrap();
        let err = c.apply_distance(200.0, &mut s).unwrap_err();
        assert_eq!(err, CoreError::Sink("device gone".into()));
        assert_eq!(c.last_target(), None);
    }
}
