//! # gesture_volume
//!
//! Contactless volume control: the distance between thumb tip and index
//! fingertip of a tracked hand sets the system output level, with an
//! on-screen bar showing the result.
//!
//! ## Gesture → Action mapping
//!
//! | Pinch (smoothed) | Action |
//! |---|---|
//! | < 30 px | Mute: stop applying levels, bar turns red, label reads `MUTED` |
//! | 30–200 px | Set volume, linearly from the sink's minimum to its maximum |
//! | > 200 px | Hold at maximum |
//! | No hand | Nothing changes |
//!
//! Only the first detected hand counts.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: a left-button mouse drag stands in for
//!   the pinch; the thumb sits where the drag started, the index finger at the
//!   cursor.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ## Audio backends
//!
//! | `--audio` | Sink |
//! |---|---|
//! | `wpctl` (default) | PipeWire default sink, range 0.0–1.0 |
//! | `null` | Logs levels only; range from `--null-min` / `--null-max` |
//!
//! Press `Q` (or close the window) to quit.

pub mod error;
pub mod capture;
pub mod tracking;
pub mod audio;
pub mod visualizer;
pub mod app;

pub use error::{Error, Result};
