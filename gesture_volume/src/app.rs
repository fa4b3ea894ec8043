//! Top-level control loop.
//!
//! `AppState` owns the [`VolumeController`] and the audio sink for the life
//! of the process. [`run_loop`] drives one frame per iteration, strictly in
//! order: input → acquire → detect → control → present. Everything runs on
//! the calling thread; a slow iteration just means the next frame pulled is
//! a later one.

use pinch_core::{AudioSink, Feedback, FrameOutcome, HandLandmarks, MuteState, VolumeController, VolumeRange};

use crate::audio::{open_sink, AudioBackend};
use crate::capture::{CanvasSource, Frame, FrameSource};
use crate::error::Result;
use crate::tracking::{select_hands, DetectedHand, DetectorConfig, LandmarkSource};
use crate::visualizer::{Screen, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Frame (and window) size in pixels.
    pub width:      u32,
    pub height:     u32,
    pub detector:   DetectorConfig,
    pub audio:      AudioBackend,
    /// Range reported by the null sink.
    pub null_range: (f64, f64),
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width:      640,
            height:     480,
            detector:   DetectorConfig::default(),
            audio:      AudioBackend::Wpctl,
            null_range: (-65.25, 0.0),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

/// Result of one processed frame, ready for display.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Hands kept after filtering, first one drives the volume.
    pub hands:    Vec<HandLandmarks>,
    pub outcome:  Option<FrameOutcome>,
    /// Present only when a hand was found this frame.
    pub feedback: Option<Feedback>,
}

pub struct AppState {
    controller: VolumeController,
    sink:       Box<dyn AudioSink>,
    detector:   DetectorConfig,
    frames:     u64,
    pub status: String,
}

impl AppState {
    /// Query the sink's range and set up the controller. A sink that cannot
    /// report a usable range is fatal.
    pub fn new(sink: Box<dyn AudioSink>, detector: DetectorConfig) -> Result<Self> {
        let controller = VolumeController::from_sink(sink.as_ref())?;
        Ok(AppState {
            controller,
            sink,
            detector,
            frames: 0,
            status: "Ready - pinch to set volume".to_string(),
        })
    }

    /// Run the control core over one frame's detections.
    pub fn process_frame(&mut self, frame: &Frame, detected: Vec<DetectedHand>) -> Result<FrameReport> {
        self.frames += 1;
        let hands = select_hands(detected, &self.detector);
        let outcome = self.controller.process(&hands, frame.width, frame.height, self.sink.as_mut())?;

        match outcome {
            Some(out) => {
                if let Some(state) = out.transition {
                    let smoothed = out.smoothed;
                    match state {
                        MuteState::Muted   => tracing::info!(smoothed, "muted"),
                        MuteState::Unmuted => tracing::info!(smoothed, "unmuted"),
                    }
                }
                self.status = match out.applied {
                    Some(level) => format!(
                        "pinch {:.0}px  smoothed {:.1}px  level {:.3}", out.raw, out.smoothed, level
                    ),
                    None => format!("pinch {:.0}px  smoothed {:.1}px  MUTED", out.raw, out.smoothed),
                };
            }
            None => {
                self.status = "no hand".to_string();
            }
        }

        let feedback = outcome.map(|_| self.controller.feedback());
        Ok(FrameReport { hands, outcome, feedback })
    }

    pub fn controller(&self) -> &VolumeController { &self.controller }
    pub fn frames(&self) -> u64 { self.frames }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`. It opens the audio sink
/// (fatal on failure), the landmark source (mouse simulation by default,
/// hardware with `--features leap`) and the window, then drives
/// [`run_loop`] until the user quits. The window and the tracking device are
/// released when they go out of scope, on every exit path.
pub fn run(cfg: AppConfig) -> Result<()> {
    let null_range = VolumeRange::new(cfg.null_range.0, cfg.null_range.1)?;
    let sink = open_sink(cfg.audio, null_range)?;
    let mut app = AppState::new(sink, cfg.detector.clone())?;

    let mut tracker = open_tracker()?;
    tracing::info!(
        max_hands = cfg.detector.max_hands,
        min_confidence = cfg.detector.min_confidence,
        static_image_mode = cfg.detector.static_image_mode,
        "landmark source ready"
    );

    let mut frames = CanvasSource::new(cfg.width, cfg.height);
    let mut vis = Visualizer::new(cfg.width as usize, cfg.height as usize)?;

    let n = run_loop(&mut app, &mut vis, &mut frames, tracker.as_mut())?;
    tracing::info!(frames = n, "quit");
    Ok(())
}

/// Iterate until the screen reports a quit. Returns the number of frames
/// processed. Any capture, tracking, audio or display error ends the loop.
pub fn run_loop<S, F>(
    app:     &mut AppState,
    screen:  &mut S,
    frames:  &mut F,
    tracker: &mut dyn LandmarkSource,
) -> Result<u64>
where
    S: Screen + ?Sized,
    F: FrameSource + ?Sized,
{
    let start = app.frames();
    while let Some(input) = screen.poll_input() {
        tracker.feed_sim_input(&input);

        let frame = match frames.acquire() {
            Ok(f)  => f,
            Err(e) => {
                tracing::error!(error = %e, "failed to capture frame");
                return Err(e);
            }
        };

        let detected = tracker.detect(&frame)?;
        let report = app.process_frame(&frame, detected)?;
        screen.present(&frame, &report.hands, report.feedback.as_ref(), &app.status)?;
    }
    Ok(app.frames() - start)
}

#[cfg(not(feature = "leap"))]
fn open_tracker() -> Result<Box<dyn LandmarkSource>> {
    tracing::info!("mouse simulation: drag with the left button to pinch");
    Ok(Box::new(crate::tracking::SimLandmarkSource::new()))
}

#[cfg(feature = "leap")]
fn open_tracker() -> Result<Box<dyn LandmarkSource>> {
    Ok(Box::new(crate::tracking::LeapLandmarkSource::open()?))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use pinch_core::{CoreError, Landmark, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};

    use crate::error::Error;
    use crate::tracking::{SimInput, SimLandmarkSource};

    /// Sink whose calls stay visible after it is boxed into the app.
    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<f64>>>);

    impl AudioSink for SharedSink {
        fn volume_range(&self) -> pinch_core::Result<VolumeRange> { VolumeRange::new(0.0, 1.0) }
        fn set_volume(&mut self, level: f64) -> pinch_core::Result<()> {
            self.0.borrow_mut().push(level);
            Ok(())
        }
    }

    struct BrokenSink;
    impl AudioSink for BrokenSink {
        fn volume_range(&self) -> pinch_core::Result<VolumeRange> {
            Err(CoreError::Sink("no output device".into()))
        }
        fn set_volume(&mut self, _level: f64) -> pinch_core::Result<()> { Ok(()) }
    }

    /// Replays scripted input, then quits; counts presented frames.
    struct ScriptedScreen {
        inputs:    VecDeque<SimInput>,
        presented: usize,
        bars:      usize,
    }

    impl ScriptedScreen {
        fn new(inputs: Vec<SimInput>) -> Self {
            ScriptedScreen { inputs: inputs.into(), presented: 0, bars: 0 }
        }
    }

    impl Screen for ScriptedScreen {
        fn poll_input(&mut self) -> Option<SimInput> { self.inputs.pop_front() }
        fn present(&mut self, _f: &Frame, _h: &[HandLandmarks], fb: Option<&Feedback>, _s: &str) -> Result<()> {
            self.presented += 1;
            self.bars += usize::from(fb.is_some());
            Ok(())
        }
    }

    struct DeadCamera;
    impl FrameSource for DeadCamera {
        fn acquire(&mut self) -> Result<Frame> { Err(Error::Capture("device unplugged".into())) }
    }

    fn app() -> (AppState, Rc<RefCell<Vec<f64>>>) {
        let sink = SharedSink::default();
        let calls = sink.0.clone();
        (AppState::new(Box::new(sink), DetectorConfig::default()).unwrap(), calls)
    }

    fn frame() -> Frame { Frame::solid(640, 480, 0) }

    fn hand(span_px: f32, confidence: f32) -> DetectedHand {
        let mut pts = [Landmark::new(0.5, 0.8); LANDMARK_COUNT];
        pts[THUMB_TIP] = Landmark::new(0.0, 0.5);
        pts[INDEX_TIP] = Landmark::new(span_px / 640.0, 0.5);
        DetectedHand { landmarks: HandLandmarks::new(pts), confidence }
    }

    fn drag(x: f32) -> SimInput { SimInput { cursor: Some((x, 240.0)), pressed: true } }

    #[test]
    fn hand_frame_sets_volume() {
        let (mut app, calls) = app();
        let report = app.process_frame(&frame(), vec![hand(200.0, 0.9)]).unwrap();
        assert_eq!(report.hands.len(), 1);
        assert!(report.feedback.is_some());
        assert_eq!(calls.borrow().len(), 1);
        assert!(app.status.starts_with("pinch 200px"));
    }

    #[test]
    fn no_hand_frame_is_silent() {
        let (mut app, calls) = app();
        app.process_frame(&frame(), vec![hand(200.0, 0.9)]).unwrap();
        let before = app.controller().smoothed_distance();

        let report = app.process_frame(&frame(), Vec::new()).unwrap();
        assert_eq!(report.outcome, None);
        assert_eq!(report.feedback, None);
        assert_eq!(app.controller().smoothed_distance(), before);
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(app.status, "no hand");
    }

    #[test]
    fn low_confidence_hand_counts_as_none() {
        let (mut app, calls) = app();
        let report = app.process_frame(&frame(), vec![hand(200.0, 0.3)]).unwrap();
        assert!(report.hands.is_empty());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn extra_hands_are_ignored() {
        let (mut app, _calls) = app();
        let report = app
            .process_frame(&frame(), vec![hand(120.0, 0.9), hand(600.0, 0.99)])
            .unwrap();
        assert_eq!(report.hands.len(), 1);
        assert_eq!(report.outcome.unwrap().raw, 120.0);
    }

    #[test]
    fn muted_frames_report_muted() {
        let (mut app, calls) = app();
        let report = app.process_frame(&frame(), vec![hand(10.0, 0.9)]).unwrap();
        assert_eq!(report.feedback.unwrap().label(), "MUTED");
        assert!(app.status.ends_with("MUTED"));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn sink_without_range_is_fatal() {
        let err = AppState::new(Box::new(BrokenSink), DetectorConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Core(CoreError::Sink(_))));
    }

    #[test]
    fn loop_runs_until_quit() {
        let (mut app, calls) = app();
        let mut screen = ScriptedScreen::new(vec![
            SimInput::default(),
            drag(100.0),
            drag(500.0),
            drag(500.0),
            SimInput::default(),
        ]);
        let mut frames  = CanvasSource::new(640, 480);
        let mut tracker = SimLandmarkSource::new();

        let n = run_loop(&mut app, &mut screen, &mut frames, &mut tracker).unwrap();
        assert_eq!(n, 5);
        assert_eq!(screen.presented, 5);
        assert_eq!(screen.bars, 3);
        // The drag anchors at x=100, so the pinch is 0 then 400 px wide:
        // the first hand frame mutes, the next two unmute and apply.
        assert_eq!(calls.borrow().len(), 2);
        assert!(!app.controller().mute_state().is_muted());
    }

    #[test]
    fn capture_failure_ends_loop() {
        let (mut app, calls) = app();
        let mut screen  = ScriptedScreen::new(vec![drag(100.0), drag(300.0)]);
        let mut tracker = SimLandmarkSource::new();

        let err = run_loop(&mut app, &mut screen, &mut DeadCamera, &mut tracker).unwrap_err();
        assert!(matches!(err, Error::Capture(_)));
        assert_eq!(screen.presented, 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn default_config_matches_detector_defaults() {
        let cfg = AppConfig::default();
        assert_eq!((cfg.width, cfg.height), (640, 480));
        assert_eq!(cfg.detector.max_hands, 1);
        assert_eq!(cfg.detector.min_confidence, 0.7);
        assert!(!cfg.detector.static_image_mode);
        assert_eq!(cfg.audio, AudioBackend::Wpctl);
    }
}
