//! Geometry primitives and backend-neutral path descriptors.
//!
//! Rings and polylines carry no drawing state; `Path` turns them into a
//! move/line/close command list that can be rendered with tiny-skia,
//! written as SVG path data, or handed to a CAD overlay.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// A point in output coordinates (physical or raster).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// A closed ring. The closing edge back to the first point is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub points: Vec<Point>,
}

impl Ring {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Shoelace area; positive for counter-clockwise in a y-up frame.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            sum += p.x * q.y - q.x * p.y;
        }
        sum / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Even-odd point-in-ring test.
    pub fn contains(&self, p: Point) -> bool {
        let n = self.points.len();
        let mut inside = false;
        let mut j = n.wrapping_sub(1);
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// An open or closed polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    /// When set, the last point connects back to the first.
    pub closed: bool,
}

impl Polyline {
    /// Arc length, including the closing segment of closed lines.
    pub fn length(&self) -> f64 {
        let mut length: f64 = self
            .points
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum();
        if self.closed && self.points.len() > 2 {
            if let (Some(first), Some(last)) = (self.points.first(), self.points.last()) {
                length += last.distance(first);
            }
        }
        length
    }

    /// Vertices in drawing order, repeating the first point for closed lines.
    pub fn walk(&self) -> Vec<Point> {
        let mut pts = self.points.clone();
        if self.closed && self.points.len() > 2 {
            pts.push(self.points[0]);
        }
        pts
    }
}

/// A single drawing command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    Close,
}

/// Backend-neutral drawable path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub commands: Vec<PathCommand>,
}

impl Path {
    /// One closed subpath per ring; fill with the even-odd rule.
    pub fn from_rings<'a, I>(rings: I) -> Self
    where
        I: IntoIterator<Item = &'a Ring>,
    {
        let mut commands = Vec::new();
        for ring in rings {
            let Some((first, rest)) = ring.points.split_first() else {
                continue;
            };
            commands.push(PathCommand::MoveTo(*first));
            commands.extend(rest.iter().map(|p| PathCommand::LineTo(*p)));
            commands.push(PathCommand::Close);
        }
        Self { commands }
    }

    /// One subpath per polyline, closed where the polyline is.
    pub fn from_polylines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a Polyline>,
    {
        let mut commands = Vec::new();
        for line in lines {
            let Some((first, rest)) = line.points.split_first() else {
                continue;
            };
            commands.push(PathCommand::MoveTo(*first));
            commands.extend(rest.iter().map(|p| PathCommand::LineTo(*p)));
            if line.closed {
                commands.push(PathCommand::Close);
            }
        }
        Self { commands }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// SVG path data (`M x y L x y ... Z`).
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        for cmd in &self.commands {
            if !out.is_empty() {
                out.push(' ');
            }
            // Writing into a String cannot fail
            let _ = match cmd {
                PathCommand::MoveTo(p) => write!(out, "M{:.3} {:.3}", p.x, p.y),
                PathCommand::LineTo(p) => write!(out, "L{:.3} {:.3}", p.x, p.y),
                PathCommand::Close => write!(out, "Z"),
            };
        }
        out
    }

    /// Convert to a tiny-skia path. `None` when nothing drawable remains.
    pub fn to_skia(&self) -> Option<tiny_skia::Path> {
        let mut pb = tiny_skia::PathBuilder::new();
        for cmd in &self.commands {
            match cmd {
                PathCommand::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
                PathCommand::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
                PathCommand::Close => pb.close(),
            }
        }
        pb.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Ring {
        Ring::new(vec![
            Point::new(x0, y0),
            Point::new(x0 + size, y0),
            Point::new(x0 + size, y0 + size),
            Point::new(x0, y0 + size),
        ])
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = square(0.0, 0.0, 2.0);
        assert_eq!(ccw.signed_area(), 4.0);

        let mut cw = ccw.clone();
        cw.points.reverse();
        assert_eq!(cw.signed_area(), -4.0);
        assert_eq!(cw.area(), 4.0);
    }

    #[test]
    fn test_ring_contains() {
        let ring = square(0.0, 0.0, 2.0);
        assert!(ring.contains(Point::new(1.0, 1.0)));
        assert!(!ring.contains(Point::new(3.0, 1.0)));
    }

    #[test]
    fn test_polyline_length() {
        let line = Polyline {
            points: vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(3.0, 4.0)],
            closed: false,
        };
        assert_eq!(line.length(), 7.0);

        let closed = Polyline {
            closed: true,
            ..line
        };
        assert_eq!(closed.length(), 12.0);
        assert_eq!(closed.walk().len(), 4);
    }

    #[test]
    fn test_svg_output() {
        let path = Path::from_rings([&square(0.0, 0.0, 1.0)]);
        assert_eq!(
            path.to_svg(),
            "M0.000 0.000 L1.000 0.000 L1.000 1.000 L0.000 1.000 Z"
        );
    }

    #[test]
    fn test_open_polyline_has_no_close() {
        let line = Polyline {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            closed: false,
        };
        let path = Path::from_polylines([&line]);
        assert_eq!(path.commands.len(), 2);
        assert!(path.to_skia().is_some());
    }
}
