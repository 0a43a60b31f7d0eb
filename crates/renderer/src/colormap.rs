//! Value → colour mapping.
//!
//! Palettes are injected as strategies: anything implementing [`Colormap`]
//! works, including plain closures `Fn(value, min, max) -> Color`.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub fn transparent() -> Self {
        Color { r: 0, g: 0, b: 0, a: 0 }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// Maps a scalar value within `[min, max]` to a colour.
pub trait Colormap {
    fn color(&self, value: f64, min: f64, max: f64) -> Color;
}

impl<F> Colormap for F
where
    F: Fn(f64, f64, f64) -> Color,
{
    fn color(&self, value: f64, min: f64, max: f64) -> Color {
        self(value, min, max)
    }
}

/// Position of `value` within `[min, max]`, clamped to `[0, 1]`.
///
/// A zero or non-finite range maps everything to 0.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if !(range > 0.0) || !range.is_finite() || value.is_nan() {
        return 0.0;
    }
    ((value - min) / range).clamp(0.0, 1.0)
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
    Color::new(
        lerp(color1.r, color2.r),
        lerp(color1.g, color2.g),
        lerp(color1.b, color2.b),
        lerp(color1.a, color2.a),
    )
}

/// One stop of a ramp at a normalized position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampStop {
    pub position: f64,
    pub color: Color,
}

/// Piecewise-linear colour ramp over normalized positions `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    stops: Vec<RampStop>,
}

impl ColorRamp {
    /// Build a ramp; stops are sorted by position.
    pub fn new(mut stops: Vec<RampStop>) -> Result<Self> {
        if stops.is_empty() {
            return Err(RenderError::style("color ramp needs at least one stop"));
        }
        if let Some(bad) = stops.iter().find(|s| !s.position.is_finite()) {
            return Err(RenderError::style(format!(
                "non-finite stop position {}",
                bad.position
            )));
        }
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(Self { stops })
    }

    fn from_table(table: &[(f64, (u8, u8, u8))]) -> Self {
        Self {
            stops: table
                .iter()
                .map(|&(position, (r, g, b))| RampStop {
                    position,
                    color: Color::rgb(r, g, b),
                })
                .collect(),
        }
    }

    /// Blue → cyan → green → yellow → red, the usual stress palette.
    pub fn jet() -> Self {
        Self::from_table(&[
            (0.0, (0, 0, 143)),
            (0.125, (0, 0, 255)),
            (0.375, (0, 255, 255)),
            (0.5, (0, 255, 0)),
            (0.625, (255, 255, 0)),
            (0.875, (255, 0, 0)),
            (1.0, (128, 0, 0)),
        ])
    }

    /// Blue → white → red, for signed fields such as axial stress.
    pub fn diverging() -> Self {
        Self::from_table(&[
            (0.0, (33, 102, 172)),
            (0.25, (146, 197, 222)),
            (0.5, (247, 247, 247)),
            (0.75, (244, 165, 130)),
            (1.0, (178, 24, 43)),
        ])
    }

    pub fn stops(&self) -> &[RampStop] {
        &self.stops
    }

    /// Colour at normalized position `t`; positions outside the stops clamp
    /// to the end colours.
    pub fn sample(&self, t: f64) -> Color {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Color::transparent();
        };
        if t.is_nan() || t <= first.position {
            return first.color;
        }
        if t >= last.position {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.position {
                let span = hi.position - lo.position;
                if span <= 0.0 {
                    return hi.color;
                }
                return interpolate_color(lo.color, hi.color, (t - lo.position) / span);
            }
        }
        last.color
    }
}

impl Colormap for ColorRamp {
    fn color(&self, value: f64, min: f64, max: f64) -> Color {
        self.sample(normalize(value, min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalize(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(normalize(15.0, 0.0, 10.0), 1.0);
        assert_eq!(normalize(3.0, 3.0, 3.0), 0.0);
        assert_eq!(normalize(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_interpolate_color() {
        let black = Color::rgb(0, 0, 0);
        let white = Color::rgb(255, 255, 255);
        assert_eq!(interpolate_color(black, white, 0.0), black);
        assert_eq!(interpolate_color(black, white, 1.0), white);
        assert_eq!(interpolate_color(black, white, 0.5), Color::rgb(128, 128, 128));
    }

    #[test]
    fn test_ramp_ends_and_middle() {
        let ramp = ColorRamp::jet();
        assert_eq!(ramp.sample(0.0), Color::rgb(0, 0, 143));
        assert_eq!(ramp.sample(1.0), Color::rgb(128, 0, 0));
        assert_eq!(ramp.sample(0.5), Color::rgb(0, 255, 0));
        assert_eq!(ramp.sample(-1.0), ramp.sample(0.0));
    }

    #[test]
    fn test_closure_is_a_colormap() {
        let grey = |v: f64, min: f64, max: f64| {
            let c = (normalize(v, min, max) * 255.0) as u8;
            Color::rgb(c, c, c)
        };
        assert_eq!(grey.color(10.0, 0.0, 10.0), Color::rgb(255, 255, 255));
        assert_eq!(grey.color(0.0, 0.0, 10.0), Color::rgb(0, 0, 0));
    }

    #[test]
    fn test_empty_ramp_rejected() {
        assert!(ColorRamp::new(vec![]).is_err());
    }
}
