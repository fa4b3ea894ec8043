//! Frames and where they come from.
//!
//! A [`Frame`] is an ARGB pixel buffer with known dimensions. The control
//! loop pulls exactly one per iteration from a [`FrameSource`]; a failed pull
//! ends the loop.

use crate::error::{Error, Result};

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// One captured image, `0xAARRGGBB` per pixel, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width:  u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl Frame {
    /// A frame filled with a single color.
    pub fn solid(width: u32, height: u32, color: u32) -> Self {
        Frame { width, height, pixels: vec![color; width as usize * height as usize] }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource
// ════════════════════════════════════════════════════════════════════════════

pub trait FrameSource {
    /// Block until the next frame is available.
    fn acquire(&mut self) -> Result<Frame>;
}

/// Produces a plain backdrop for tracking sources that don't see through a
/// camera (mouse simulation, LeapMotion).
pub struct CanvasSource {
    width:  u32,
    height: u32,
    frames: u64,
}

const CANVAS_TOP:    u32 = 0xFF1A1A2E;
const CANVAS_BOTTOM: u32 = 0xFF16213E;

impl CanvasSource {
    pub fn new(width: u32, height: u32) -> Self {
        CanvasSource { width, height, frames: 0 }
    }

    pub fn frames_produced(&self) -> u64 { self.frames }
}

impl FrameSource for CanvasSource {
    fn acquire(&mut self) -> Result<Frame> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Capture(format!(
                "cannot produce a {}x{} frame", self.width, self.height
            )));
        }

        let (w, h) = (self.width as usize, self.height as usize);
        let mut pixels = Vec::with_capacity(w * h);
        for row in 0..h {
            let color = if row < h / 2 { CANVAS_TOP } else { CANVAS_BOTTOM };
            pixels.extend(std::iter::repeat(color).take(w));
        }

        self.frames += 1;
        Ok(Frame { width: self.width, height: self.height, pixels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_has_requested_size() {
        let mut src = CanvasSource::new(64, 48);
        let f = src.acquire().unwrap();
        assert_eq!((f.width, f.height), (64, 48));
        assert_eq!(f.pixels.len(), 64 * 48);
        assert_eq!(src.frames_produced(), 1);
    }

    #[test]
    fn zero_sized_canvas_fails() {
        let mut src = CanvasSource::new(0, 480);
        assert!(matches!(src.acquire(), Err(Error::Capture(_))));
        assert_eq!(src.frames_produced(), 0);
    }

    #[test]
    fn solid_frame_fills_every_pixel() {
        let f = Frame::solid(3, 2, 0xFF00FF00);
        assert!(f.pixels.iter().all(|&p| p == 0xFF00FF00));
    }
}
