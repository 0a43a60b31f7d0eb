//! Raster compositing of contour output onto a caller-owned surface.
//!
//! Bands, isolines and labels are drawn into an offscreen layer which is
//! then copied onto the surface through a mask of the wall annulus. Pixels
//! outside the annulus are never touched by contour content, whatever the
//! grid covered. Cavity fill, outlines and the colorbar go directly onto
//! the surface afterwards.

use serde::{Deserialize, Serialize};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Mask, Paint, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};
use tracing::debug;

use crate::colormap::{Color, Colormap};
use crate::contour::ContourData;
use crate::error::{RenderError, Result};
use crate::path::{Path, Point, Polyline, Ring};
use crate::text::{draw_text, format_value, Anchor, TextStyle};
use crate::transform::CoordinateTransform;

/// Wall cross-section boundaries in physical `(r, z)` coordinates
/// (`x = r`, `y = z`).
///
/// Both boundaries run in the same axial direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallProfile {
    pub outer: Vec<Point>,
    pub inner: Vec<Point>,
}

impl WallProfile {
    pub fn new(outer: Vec<Point>, inner: Vec<Point>) -> Self {
        Self { outer, inner }
    }

    /// Straight cylindrical wall between `z0` and `z1`.
    pub fn cylinder(r_in: f64, r_out: f64, z0: f64, z1: f64) -> Self {
        Self {
            outer: vec![Point::new(r_out, z0), Point::new(r_out, z1)],
            inner: vec![Point::new(r_in, z0), Point::new(r_in, z1)],
        }
    }

    /// Closed ring of the wall material: outer boundary forward, inner
    /// boundary reversed.
    pub fn annulus_ring(&self) -> Ring {
        let mut points = self.outer.clone();
        points.extend(self.inner.iter().rev().copied());
        Ring::new(points)
    }

    /// Region between the inner boundary and the symmetry axis `r = axis_r`.
    pub fn cavity_ring(&self, axis_r: f64) -> Ring {
        let mut points = self.inner.clone();
        if let (Some(first), Some(last)) = (self.inner.first(), self.inner.last()) {
            points.push(Point::new(axis_r, last.y));
            points.push(Point::new(axis_r, first.y));
        }
        Ring::new(points)
    }
}

/// Placement of the colorbar swatch in raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorbarLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Number of ticks including both ends.
    pub ticks: usize,
}

impl ColorbarLayout {
    /// Swatch width in pixels.
    pub const BAR_WIDTH: f32 = 18.0;
    /// Horizontal space kept for tick labels right of the swatch.
    pub const LABEL_SPACE: f32 = 52.0;

    /// Total width the colorbar occupies at the right edge.
    pub fn reserved_width() -> f32 {
        Self::BAR_WIDTH + Self::LABEL_SPACE
    }

    /// Vertical bar along the right edge of a `width × height` raster.
    pub fn right_edge(width: u32, height: u32, padding: f32) -> Self {
        Self {
            x: width as f32 - padding - Self::reserved_width(),
            y: padding,
            width: Self::BAR_WIDTH,
            height: (height as f32 - 2.0 * padding).max(1.0),
            ticks: 5,
        }
    }
}

/// Drawing options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositorConfig {
    pub draw_isolines: bool,
    pub isoline_width: f32,
    pub isoline_color: Color,
    pub draw_labels: bool,
    pub label_style: LabelStyle,
    pub draw_outlines: bool,
    pub outline_width: f32,
    pub outline_color: Color,
    /// Fill for the cavity between the inner wall and the axis.
    pub cavity_color: Option<Color>,
    /// Radial position of the symmetry axis.
    pub axis_r: f64,
    pub colorbar: Option<ColorbarLayout>,
}

/// Label appearance in a serializable form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub size: f32,
    pub color: Color,
    pub background: Option<Color>,
}

impl From<LabelStyle> for TextStyle {
    fn from(style: LabelStyle) -> Self {
        TextStyle {
            size: style.size,
            color: style.color,
            background: style.background,
        }
    }
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            draw_isolines: true,
            isoline_width: 1.0,
            isoline_color: Color::new(0, 0, 0, 200),
            draw_labels: true,
            label_style: LabelStyle {
                size: 9.0,
                color: Color::rgb(0, 0, 0),
                background: Some(Color::new(255, 255, 255, 200)),
            },
            draw_outlines: true,
            outline_width: 1.5,
            outline_color: Color::rgb(0, 0, 0),
            cavity_color: Some(Color::rgb(225, 232, 240)),
            axis_r: 0.0,
            colorbar: None,
        }
    }
}

/// Draws contour output onto a pixmap.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: CompositorConfig,
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Draw `contours` (in raster coordinates of `transform`) onto `surface`.
    ///
    /// `range` is the value range the colormap and colorbar span. The
    /// surface is neither cleared nor resized.
    pub fn render<C>(
        &self,
        surface: &mut Pixmap,
        contours: &ContourData,
        transform: &CoordinateTransform,
        wall: &WallProfile,
        colormap: &C,
        range: (f64, f64),
    ) -> Result<()>
    where
        C: Colormap + ?Sized,
    {
        let (width, height) = (surface.width(), surface.height());
        let (min, max) = range;

        let mut layer =
            Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        self.draw_bands(&mut layer, contours, colormap, range);
        if self.config.draw_isolines {
            self.draw_isolines(&mut layer, contours);
        }

        let annulus = to_raster_ring(&wall.annulus_ring(), transform);
        match Path::from_rings([&annulus]).to_skia() {
            Some(clip) => {
                let mut mask =
                    Mask::new(width, height).ok_or(RenderError::Allocation { width, height })?;
                mask.fill_path(&clip, FillRule::EvenOdd, true, Transform::identity());
                surface.draw_pixmap(
                    0,
                    0,
                    layer.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    Some(&mask),
                );
            }
            None => debug!(
                outer = wall.outer.len(),
                inner = wall.inner.len(),
                "Wall profile has no area, contours not drawn"
            ),
        }

        if let Some(color) = self.config.cavity_color {
            let cavity = to_raster_ring(&wall.cavity_ring(self.config.axis_r), transform);
            if let Some(path) = Path::from_rings([&cavity]).to_skia() {
                surface.fill_path(
                    &path,
                    &paint(color),
                    FillRule::EvenOdd,
                    Transform::identity(),
                    None,
                );
            }
        }

        if self.config.draw_outlines {
            let stroke = line_stroke(self.config.outline_width);
            let outline_paint = paint(self.config.outline_color);
            for boundary in [&wall.outer, &wall.inner] {
                let line = Polyline {
                    points: boundary
                        .iter()
                        .map(|p| transform.to_raster(p.x, p.y))
                        .collect(),
                    closed: false,
                };
                if let Some(path) = Path::from_polylines([&line]).to_skia() {
                    surface.stroke_path(&path, &outline_paint, &stroke, Transform::identity(), None);
                }
            }
        }

        if let Some(layout) = self.config.colorbar {
            if min.is_finite() && max.is_finite() {
                self.draw_colorbar(surface, &layout, colormap, min, max);
            }
        }

        Ok(())
    }

    fn draw_bands<C>(
        &self,
        layer: &mut Pixmap,
        contours: &ContourData,
        colormap: &C,
        range: (f64, f64),
    ) where
        C: Colormap + ?Sized,
    {
        // Hairline in the fill colour closes anti-aliasing seams between
        // neighbouring bands.
        let seam = Stroke {
            width: 1.0,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        for band in &contours.bands {
            let Some(path) = band.path().to_skia() else {
                continue;
            };
            let band_paint = paint(colormap.color(band.value, range.0, range.1));
            layer.fill_path(&path, &band_paint, FillRule::EvenOdd, Transform::identity(), None);
            layer.stroke_path(&path, &band_paint, &seam, Transform::identity(), None);
        }
    }

    fn draw_isolines(&self, layer: &mut Pixmap, contours: &ContourData) {
        let stroke = line_stroke(self.config.isoline_width);
        let line_paint = paint(self.config.isoline_color);
        let text_style = TextStyle::from(self.config.label_style);

        for iso in &contours.isolines {
            if let Some(path) = iso.path().to_skia() {
                layer.stroke_path(&path, &line_paint, &stroke, Transform::identity(), None);
            }
            if !self.config.draw_labels {
                continue;
            }
            let text = format_value(iso.value);
            for label in &iso.labels {
                draw_text(
                    layer,
                    label.x as f32,
                    label.y as f32,
                    label.angle_degrees as f32,
                    &text,
                    &text_style,
                    Anchor::Center,
                );
            }
        }
    }

    fn draw_colorbar<C>(
        &self,
        surface: &mut Pixmap,
        layout: &ColorbarLayout,
        colormap: &C,
        min: f64,
        max: f64,
    ) where
        C: Colormap + ?Sized,
    {
        let rows = layout.height.round().max(1.0) as usize;

        // One step per pixel row, max at the top.
        for row in 0..rows {
            let t = if rows > 1 {
                1.0 - row as f64 / (rows - 1) as f64
            } else {
                1.0
            };
            let value = min + t * (max - min);
            let swatch = paint(colormap.color(value, min, max));
            if let Some(rect) = Rect::from_xywh(layout.x, layout.y + row as f32, layout.width, 1.0)
            {
                surface.fill_rect(rect, &swatch, Transform::identity(), None);
            }
        }

        let border = Ring::new(vec![
            Point::new(layout.x as f64, layout.y as f64),
            Point::new((layout.x + layout.width) as f64, layout.y as f64),
            Point::new((layout.x + layout.width) as f64, (layout.y + layout.height) as f64),
            Point::new(layout.x as f64, (layout.y + layout.height) as f64),
        ]);
        let stroke = line_stroke(1.0);
        let ink = paint(Color::rgb(0, 0, 0));
        if let Some(path) = Path::from_rings([&border]).to_skia() {
            surface.stroke_path(&path, &ink, &stroke, Transform::identity(), None);
        }

        let ticks = layout.ticks.max(2);
        let text_style = TextStyle {
            background: None,
            ..TextStyle::from(self.config.label_style)
        };
        let right = layout.x + layout.width;
        let mut pb = tiny_skia::PathBuilder::new();
        for i in 0..ticks {
            let f = i as f32 / (ticks - 1) as f32;
            let y = layout.y + f * layout.height;
            let value = max - f as f64 * (max - min);
            pb.move_to(right, y);
            pb.line_to(right + 4.0, y);
            draw_text(
                surface,
                right + 7.0,
                y,
                0.0,
                &format_value(value),
                &text_style,
                Anchor::Left,
            );
        }
        if let Some(path) = pb.finish() {
            surface.stroke_path(&path, &ink, &stroke, Transform::identity(), None);
        }
    }
}

fn to_raster_ring(ring: &Ring, transform: &CoordinateTransform) -> Ring {
    Ring::new(
        ring.points
            .iter()
            .map(|p| transform.to_raster(p.x, p.y))
            .collect(),
    )
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn line_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annulus_ring_order() {
        let wall = WallProfile::cylinder(50.0, 60.0, 0.0, 100.0);
        let ring = wall.annulus_ring();
        assert_eq!(
            ring.points,
            vec![
                Point::new(60.0, 0.0),
                Point::new(60.0, 100.0),
                Point::new(50.0, 100.0),
                Point::new(50.0, 0.0),
            ]
        );
        assert_eq!(ring.area(), 1000.0);
    }

    #[test]
    fn test_cavity_ring_closes_to_axis() {
        let wall = WallProfile::cylinder(50.0, 60.0, 0.0, 100.0);
        let cavity = wall.cavity_ring(0.0);
        assert_eq!(cavity.points.len(), 4);
        assert_eq!(cavity.area(), 5000.0);
        assert!(cavity.contains(Point::new(25.0, 50.0)));
    }

    #[test]
    fn test_colorbar_right_edge() {
        let layout = ColorbarLayout::right_edge(800, 600, 20.0);
        assert_eq!(layout.x + ColorbarLayout::reserved_width(), 780.0);
        assert_eq!(layout.height, 560.0);
    }
}
