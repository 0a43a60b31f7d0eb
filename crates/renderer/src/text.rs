//! Minimal stroke font for contour and colorbar labels.
//!
//! Glyphs are drawn as straight strokes in a 7-segment style, which keeps the
//! renderer free of font files and rasterizer dependencies. Only the
//! characters needed for numbers are defined; anything else is skipped.

use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::colormap::Color;

/// Horizontal anchoring of a label relative to its reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Center,
    Left,
    Right,
}

/// Appearance of a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Glyph height in pixels.
    pub size: f32,
    pub color: Color,
    /// Filled box behind the text for readability over bands.
    pub background: Option<Color>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 10.0,
            color: Color::rgb(0, 0, 0),
            background: Some(Color::new(255, 255, 255, 220)),
        }
    }
}

type Segment = ((f32, f32), (f32, f32));

// Segment endpoints in half-extent units: x and y in [-1, 1], y down.
const TOP: Segment = ((-1.0, -1.0), (1.0, -1.0));
const MIDDLE: Segment = ((-1.0, 0.0), (1.0, 0.0));
const BOTTOM: Segment = ((-1.0, 1.0), (1.0, 1.0));
const UPPER_LEFT: Segment = ((-1.0, -1.0), (-1.0, 0.0));
const UPPER_RIGHT: Segment = ((1.0, -1.0), (1.0, 0.0));
const LOWER_LEFT: Segment = ((-1.0, 0.0), (-1.0, 1.0));
const LOWER_RIGHT: Segment = ((1.0, 0.0), (1.0, 1.0));

fn glyph(ch: char) -> &'static [Segment] {
    match ch {
        '0' => &[TOP, UPPER_RIGHT, LOWER_RIGHT, BOTTOM, LOWER_LEFT, UPPER_LEFT],
        '1' => &[((0.0, -1.0), (0.0, 1.0))],
        '2' => &[TOP, UPPER_RIGHT, MIDDLE, LOWER_LEFT, BOTTOM],
        '3' => &[TOP, UPPER_RIGHT, MIDDLE, LOWER_RIGHT, BOTTOM],
        '4' => &[UPPER_LEFT, MIDDLE, UPPER_RIGHT, LOWER_RIGHT],
        '5' => &[TOP, UPPER_LEFT, MIDDLE, LOWER_RIGHT, BOTTOM],
        '6' => &[TOP, UPPER_LEFT, LOWER_LEFT, BOTTOM, LOWER_RIGHT, MIDDLE],
        '7' => &[TOP, ((1.0, -1.0), (0.0, 1.0))],
        '8' => &[TOP, UPPER_RIGHT, LOWER_RIGHT, BOTTOM, LOWER_LEFT, UPPER_LEFT, MIDDLE],
        '9' => &[MIDDLE, UPPER_LEFT, TOP, UPPER_RIGHT, LOWER_RIGHT, BOTTOM],
        '-' => &[MIDDLE],
        '+' => &[MIDDLE, ((0.0, -0.6), (0.0, 0.6))],
        '.' => &[((0.0, 0.7), (0.0, 0.9))],
        'e' => &[MIDDLE, UPPER_RIGHT, ((1.0, -0.5), (-1.0, -0.5)), LOWER_LEFT, BOTTOM],
        _ => &[],
    }
}

fn char_width(size: f32) -> f32 {
    size * 0.6
}

fn char_spacing(size: f32) -> f32 {
    size * 0.25
}

/// Advance width of `text` at glyph height `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    let n = text.chars().count() as f32;
    if n == 0.0 {
        return 0.0;
    }
    n * (char_width(size) + char_spacing(size)) - char_spacing(size)
}

/// Compact label for a field value.
///
/// Large and tiny magnitudes switch to exponent notation; otherwise the
/// number of decimals shrinks as the magnitude grows and trailing zeros are
/// trimmed.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-3..1e5).contains(&abs) {
        return format!("{:.2e}", value);
    }

    let decimals = if abs >= 100.0 {
        0
    } else if abs >= 10.0 {
        1
    } else if abs >= 1.0 {
        2
    } else {
        3
    };
    let mut s = format!("{:.*}", decimals, value);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Draw `text` at `(x, y)` rotated by `angle_degrees` (clockwise on screen).
///
/// `y` is the vertical centre of the glyphs; `anchor` selects which end of
/// the text sits at `x`.
pub fn draw_text(
    pixmap: &mut Pixmap,
    x: f32,
    y: f32,
    angle_degrees: f32,
    text: &str,
    style: &TextStyle,
    anchor: Anchor,
) {
    let size = style.size;
    if text.is_empty() || !(size > 0.0) {
        return;
    }

    let width = text_width(text, size);
    let (sin_a, cos_a) = angle_degrees.to_radians().sin_cos();
    let rotate = |px: f32, py: f32| (px * cos_a - py * sin_a + x, px * sin_a + py * cos_a + y);

    let start_x = match anchor {
        Anchor::Center => -width / 2.0,
        Anchor::Left => 0.0,
        Anchor::Right => -width,
    };

    if let Some(bg) = style.background {
        let pad = size * 0.2;
        let (x0, x1) = (start_x - pad, start_x + width + pad);
        let (y0, y1) = (-size / 2.0 - pad, size / 2.0 + pad);

        let mut pb = PathBuilder::new();
        for (i, (cx, cy)) in [(x0, y0), (x1, y0), (x1, y1), (x0, y1)].into_iter().enumerate() {
            let (rx, ry) = rotate(cx, cy);
            if i == 0 {
                pb.move_to(rx, ry);
            } else {
                pb.line_to(rx, ry);
            }
        }
        pb.close();

        if let Some(path) = pb.finish() {
            let mut paint = Paint::default();
            paint.set_color(bg.to_skia());
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    let half_w = char_width(size) / 2.0;
    let half_h = size / 2.0;
    let stroke = Stroke {
        width: (char_width(size) * 0.18).max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    let mut paint = Paint::default();
    paint.set_color(style.color.to_skia());
    paint.anti_alias = true;

    let mut pb = PathBuilder::new();
    for (i, ch) in text.chars().enumerate() {
        let centre_x = start_x + i as f32 * (char_width(size) + char_spacing(size)) + half_w;
        for &((x1, y1), (x2, y2)) in glyph(ch) {
            let (ax, ay) = rotate(centre_x + x1 * half_w, y1 * half_h);
            let (bx, by) = rotate(centre_x + x2 * half_w, y2 * half_h);
            pb.move_to(ax, ay);
            pb.line_to(bx, by);
        }
    }

    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}
