//! Mapping between physical (r, z) coordinates and raster pixels.
//!
//! One uniform scale keeps the physical aspect ratio; the content is centred
//! in the padded area. The axial coordinate grows upward while raster rows
//! grow downward, so `z` is always flipped. That sign convention is fixed.

use fea_grid::Bounds;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::path::Point;

/// Aspect-preserving physical ↔ raster transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTransform {
    bounds: Bounds,
    width: u32,
    height: u32,
    padding: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl CoordinateTransform {
    /// Fit `bounds` into a `width × height` raster with `padding` pixels on
    /// every side.
    pub fn new(bounds: Bounds, width: u32, height: u32, padding: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidRasterSize { width, height });
        }
        if !bounds.is_valid() {
            return Err(RenderError::InvalidBounds(format!(
                "r=[{}, {}] z=[{}, {}]",
                bounds.r_min, bounds.r_max, bounds.z_min, bounds.z_max
            )));
        }

        let avail_w = width as f64 - 2.0 * padding;
        let avail_h = height as f64 - 2.0 * padding;
        if !(padding >= 0.0) || avail_w <= 0.0 || avail_h <= 0.0 {
            return Err(RenderError::InvalidPadding {
                padding,
                width,
                height,
            });
        }

        let scale = (avail_w / bounds.width()).min(avail_h / bounds.height());
        let offset_x = padding + (avail_w - bounds.width() * scale) / 2.0;
        let offset_y = padding + (avail_h - bounds.height() * scale) / 2.0;

        Ok(Self {
            bounds,
            width,
            height,
            padding,
            scale,
            offset_x,
            offset_y,
        })
    }

    /// Physical (r, z) to raster (x, y).
    pub fn to_raster(&self, r: f64, z: f64) -> Point {
        Point::new(
            self.offset_x + (r - self.bounds.r_min) * self.scale,
            self.offset_y + (self.bounds.z_max - z) * self.scale,
        )
    }

    /// Raster (x, y) to physical (r, z).
    pub fn to_physical(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.bounds.r_min + (x - self.offset_x) / self.scale,
            self.bounds.z_max - (y - self.offset_y) / self.scale,
        )
    }

    /// Pixels per millimeter.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn raster_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raster rectangle `(x, y, width, height)` covered by the bounds.
    pub fn content_rect(&self) -> (f64, f64, f64, f64) {
        (
            self.offset_x,
            self.offset_y,
            self.bounds.width() * self.scale,
            self.bounds.height() * self.scale,
        )
    }
}
