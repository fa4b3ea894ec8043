//! Software-rendered display using `minifb`.
//!
//! Layout (on top of the captured frame):
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                                              │
//! │   ┌──┐                                       │
//! │   │  │         o thumb tip                   │
//! │   │  │  42%     \                            │
//! │   │██│           o index tip   (hand skeleton)│
//! │   │██│                                       │
//! │   └──┘                                       │
//! │  status line                                 │
//! │  key legend                                  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! All drawing goes through [`Canvas`], a plain ARGB buffer, so the overlay
//! can be checked without opening a window.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use pinch_core::{Feedback, HandLandmarks, HAND_CONNECTIONS, INDEX_TIP, THUMB_TIP};

use crate::capture::Frame;
use crate::error::{Error, Result};
use crate::tracking::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WINDOW_TITLE: &str = "Volume Control";

const BAR_X:           usize = 50;
const BAR_W:           usize = 20;
const BAR_TOP_FRAC:    f32   = 0.2;
const BAR_HEIGHT_FRAC: f32   = 0.6;
const BAR_OUTLINE_W:   usize = 2;
const LABEL_SCALE:     usize = 2;
const TIP_RADIUS:      isize = 10;
const PINCH_LINE_W:    isize = 3;
const JOINT_RADIUS:    isize = 3;

const BAR_OUTLINE:  u32 = 0xFFC8C8C8;
const BAR_UNMUTED:  u32 = 0xFF00FF00;
const BAR_MUTED:    u32 = 0xFFFF0000;
const TIP_COLOR:    u32 = 0xFFFF00FF;
const PINCH_COLOR:  u32 = 0xFF0000FF;
const BONE_COLOR:   u32 = 0xFFFFFFFF;
const JOINT_COLOR:  u32 = 0xFFFF3030;
const LABEL_COLOR:  u32 = 0xFFEEEEEE;
const STATUS_BG:    u32 = 0xFF0F3460;
const LEGEND_COLOR: u32 = 0xFF888888;
const BACKDROP:     u32 = 0xFF000000;

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

/// An ARGB framebuffer with the drawing primitives the overlay needs.
pub struct Canvas {
    width:  usize,
    height: usize,
    buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![BACKDROP; width * height] }
    }

    pub fn width(&self)  -> usize  { self.width }
    pub fn height(&self) -> usize  { self.height }
    pub fn buffer(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    /// Copy `frame` in as the background, cropping or padding if its size
    /// differs from the canvas.
    pub fn load_frame(&mut self, frame: &Frame) {
        let (fw, fh) = (frame.width as usize, frame.height as usize);
        if fw == self.width && fh == self.height && frame.pixels.len() == self.buf.len() {
            self.buf.copy_from_slice(&frame.pixels);
            return;
        }
        self.buf.fill(BACKDROP);
        let w = fw.min(self.width);
        for row in 0..fh.min(self.height) {
            let src = &frame.pixels[row * fw..row * fw + w];
            self.buf[row * self.width..row * self.width + w].copy_from_slice(src);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    pub fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    /// Rectangle outline `thickness` pixels wide, drawn inward.
    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, thickness: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        let t = thickness.min(w / 2).min(h / 2).max(1);
        self.fill_rect(x, y, w, t, color);
        self.fill_rect(x, y + h - t, w, t, color);
        self.fill_rect(x, y, t, h, color);
        self.fill_rect(x + w - t, y, t, h, color);
    }

    pub fn fill_circle(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Bresenham line stamped with a square brush of side `thickness`.
    pub fn draw_line(&mut self, (x0, y0): (isize, isize), (x1, y1): (isize, isize), thickness: isize, color: u32) {
        let half = (thickness.max(1) - 1) / 2;
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            for oy in -half..=half {
                for ox in -half..=half {
                    self.set_pixel(x + ox, y + oy, color);
                }
            }
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal bitmap font — 3×5 glyphs, each pixel drawn as a
    /// `scale`×`scale` block.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > self.width { break; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Overlay
// ════════════════════════════════════════════════════════════════════════════

/// Position of the volume bar on a frame of the given height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarGeometry {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl BarGeometry {
    pub fn for_height(height: usize) -> Self {
        BarGeometry {
            x: BAR_X,
            y: (height as f32 * BAR_TOP_FRAC) as usize,
            w: BAR_W,
            h: (height as f32 * BAR_HEIGHT_FRAC) as usize,
        }
    }

    /// Rows left empty at the top of the bar for `fraction` of full volume.
    pub fn empty_rows(&self, fraction: f64) -> usize {
        ((1.0 - fraction.clamp(0.0, 1.0)) * self.h as f64) as usize
    }
}

/// Skeleton of every hand; pinch markers on the first.
pub fn draw_hands(canvas: &mut Canvas, hands: &[HandLandmarks]) {
    let (w, h) = (canvas.width() as u32, canvas.height() as u32);
    let px = |hand: &HandLandmarks, i: usize| {
        let (x, y) = hand.points()[i].to_pixel(w, h);
        (x as isize, y as isize)
    };

    for hand in hands {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            canvas.draw_line(px(hand, a), px(hand, b), 1, BONE_COLOR);
        }
        for i in 0..hand.points().len() {
            let (x, y) = px(hand, i);
            canvas.fill_circle(x, y, JOINT_RADIUS, JOINT_COLOR);
        }
    }

    if let Some(first) = hands.first() {
        let (thumb, index) = (px(first, THUMB_TIP), px(first, INDEX_TIP));
        canvas.fill_circle(thumb.0, thumb.1, TIP_RADIUS, TIP_COLOR);
        canvas.fill_circle(index.0, index.1, TIP_RADIUS, TIP_COLOR);
        canvas.draw_line(thumb, index, PINCH_LINE_W, PINCH_COLOR);
    }
}

/// Vertical volume bar with its percentage or `MUTED` label.
pub fn draw_volume_bar(canvas: &mut Canvas, feedback: &Feedback) {
    let bar = BarGeometry::for_height(canvas.height());
    let empty = bar.empty_rows(feedback.fraction);
    let fill = if feedback.mute.is_muted() { BAR_MUTED } else { BAR_UNMUTED };

    canvas.fill_rect(bar.x, bar.y + empty, bar.w, bar.h - empty, fill);
    canvas.draw_border(bar.x, bar.y, bar.w, bar.h, BAR_OUTLINE_W, BAR_OUTLINE);
    canvas.draw_label(&feedback.label(), bar.x + 30, bar.y + bar.h / 2, LABEL_SCALE, LABEL_COLOR);
}

/// Status line and key legend along the bottom edge.
pub fn draw_status(canvas: &mut Canvas, status: &str) {
    let h = canvas.height();
    let top = h.saturating_sub(30);
    canvas.fill_rect(0, top, canvas.width(), h - top, STATUS_BG);
    canvas.draw_label(status, 10, top + 6, 1, LABEL_COLOR);
    canvas.draw_label(legend(), 10, top + 18, 1, LEGEND_COLOR);
}

fn legend() -> &'static str {
    if cfg!(feature = "leap") {
        "pinch thumb and index over the leap to set volume  Q=quit"
    } else {
        "drag with left mouse = pinch  Q=quit"
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Screen trait — what the control loop needs from a display
// ════════════════════════════════════════════════════════════════════════════

pub trait Screen {
    /// Read this iteration's input. Returns `None` once the user asked to quit.
    fn poll_input(&mut self) -> Option<SimInput>;

    /// Annotate `frame` and show it. The bar is drawn only when `feedback`
    /// is given, i.e. on frames where a hand was found.
    fn present(
        &mut self,
        frame:    &Frame,
        hands:    &[HandLandmarks],
        feedback: Option<&Feedback>,
        status:   &str,
    ) -> Result<()>;
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

/// The display window. Dropping it closes the window.
pub struct Visualizer {
    window: Window,
    canvas: Canvas,
}

impl Visualizer {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            WINDOW_TITLE,
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| Error::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, canvas: Canvas::new(width, height) })
    }
}

impl Screen for Visualizer {
    fn poll_input(&mut self) -> Option<SimInput> {
        if !self.window.is_open() || self.window.is_key_pressed(Key::Q, KeyRepeat::No) {
            return None;
        }
        Some(SimInput {
            cursor:  self.window.get_mouse_pos(MouseMode::Discard),
            pressed: self.window.get_mouse_down(MouseButton::Left),
        })
    }

    fn present(
        &mut self,
        frame:    &Frame,
        hands:    &[HandLandmarks],
        feedback: Option<&Feedback>,
        status:   &str,
    ) -> Result<()> {
        self.canvas.load_frame(frame);
        draw_hands(&mut self.canvas, hands);
        if let Some(fb) = feedback {
            draw_volume_bar(&mut self.canvas, fb);
        }
        draw_status(&mut self.canvas, status);

        self.window
            .update_with_buffer(self.canvas.buffer(), self.canvas.width(), self.canvas.height())
            .map_err(|e| Error::Window(e.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use pinch_core::{Landmark, MuteState, LANDMARK_COUNT};

    fn feedback(fraction: f64, mute: MuteState) -> Feedback {
        Feedback { fraction, mute }
    }

    /// Column in the middle of the bar's fill, clear of the outline.
    fn bar_column() -> usize { BAR_X + BAR_W / 2 }

    #[test]
    fn bar_geometry_for_480p() {
        let bar = BarGeometry::for_height(480);
        assert_eq!(bar, BarGeometry { x: 50, y: 96, w: 20, h: 288 });
        assert_eq!(bar.empty_rows(1.0), 0);
        assert_eq!(bar.empty_rows(0.0), 288);
        assert_eq!(bar.empty_rows(0.5), 144);
    }

    #[test]
    fn half_volume_fills_lower_half() {
        let mut c = Canvas::new(640, 480);
        draw_volume_bar(&mut c, &feedback(0.5, MuteState::Unmuted));
        let bar = BarGeometry::for_height(480);
        let x = bar_column();
        assert_ne!(c.pixel(x, bar.y + 10), Some(BAR_UNMUTED));
        assert_eq!(c.pixel(x, bar.y + bar.h / 2 + 5), Some(BAR_UNMUTED));
        assert_eq!(c.pixel(x, bar.y + bar.h - 5), Some(BAR_UNMUTED));
    }

    #[test]
    fn muted_bar_is_red() {
        let mut c = Canvas::new(640, 480);
        draw_volume_bar(&mut c, &feedback(0.8, MuteState::Muted));
        let bar = BarGeometry::for_height(480);
        assert_eq!(c.pixel(bar_column(), bar.y + bar.h - 5), Some(BAR_MUTED));
    }

    #[test]
    fn bar_outline_drawn() {
        let mut c = Canvas::new(640, 480);
        draw_volume_bar(&mut c, &feedback(0.0, MuteState::Unmuted));
        let bar = BarGeometry::for_height(480);
        assert_eq!(c.pixel(bar.x, bar.y), Some(BAR_OUTLINE));
        assert_eq!(c.pixel(bar.x + bar.w - 1, bar.y + bar.h - 1), Some(BAR_OUTLINE));
    }

    #[test]
    fn label_is_drawn_beside_bar() {
        let mut c = Canvas::new(640, 480);
        draw_volume_bar(&mut c, &feedback(0.42, MuteState::Unmuted));
        let bar = BarGeometry::for_height(480);
        let y0 = bar.y + bar.h / 2;
        let lit = (bar.x + 30..bar.x + 30 + 40)
            .flat_map(|x| (y0..y0 + 5 * LABEL_SCALE).map(move |y| (x, y)))
            .filter(|&(x, y)| c.pixel(x, y) == Some(LABEL_COLOR))
            .count();
        assert!(lit > 0);
    }

    #[test]
    fn pinch_markers_on_first_hand() {
        let mut pts = [Landmark::new(0.5, 0.9); LANDMARK_COUNT];
        pts[THUMB_TIP] = Landmark::new(0.25, 0.5);
        pts[INDEX_TIP] = Landmark::new(0.75, 0.5);
        let mut c = Canvas::new(640, 480);
        draw_hands(&mut c, &[HandLandmarks::new(pts)]);

        // Tip circles (radius 10) around (160, 240) and (480, 240) …
        assert_eq!(c.pixel(160 - 8, 240), Some(TIP_COLOR));
        assert_eq!(c.pixel(480 + 8, 240), Some(TIP_COLOR));
        // … joined by the pinch line.
        assert_eq!(c.pixel(320, 240), Some(PINCH_COLOR));
        assert_eq!(c.pixel(320, 241), Some(PINCH_COLOR));
    }

    #[test]
    fn line_reaches_both_endpoints() {
        let mut c = Canvas::new(50, 50);
        c.draw_line((3, 40), (45, 7), 1, 0xFF123456);
        assert_eq!(c.pixel(3, 40), Some(0xFF123456));
        assert_eq!(c.pixel(45, 7), Some(0xFF123456));
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut c = Canvas::new(20, 20);
        c.fill_circle(-5, -5, 10, 0xFFFFFFFF);
        c.draw_line((-30, 10), (60, 10), 3, 0xFFFFFFFF);
        c.draw_label("MUTED 100%", 15, 18, 3, 0xFFFFFFFF);
        assert_eq!(c.pixel(0, 0), Some(0xFFFFFFFF));
    }

    #[test]
    fn load_frame_copies_or_crops() {
        let mut c = Canvas::new(4, 3);
        c.load_frame(&Frame::solid(4, 3, 0xFF00AA00));
        assert!(c.buffer().iter().all(|&p| p == 0xFF00AA00));

        c.load_frame(&Frame::solid(2, 2, 0xFF0000AA));
        assert_eq!(c.pixel(1, 1), Some(0xFF0000AA));
        assert_eq!(c.pixel(3, 2), Some(BACKDROP));
    }
}
