//! Contour rendering for axisymmetric FEA results.
//!
//! Takes a rasterized scalar field from `fea-grid` and produces:
//! - nice threshold levels
//! - filled contour bands (even-odd rings) and labelled isolines
//! - a clipped raster composite with cavity fill, outlines and colorbar
//!
//! ```text
//! GridData ──levels──► thresholds
//!     │                    │
//!     └──────contour───────┴──► ContourData ──composite──► Pixmap
//!                                   ▲
//!                        CoordinateTransform
//! ```
//!
//! Everything is synchronous and free of global state. Memoization is
//! opt-in through a caller-owned [`ContourCache`].

pub mod cache;
pub mod colormap;
pub mod composite;
pub mod config;
pub mod contour;
pub mod error;
pub mod levels;
pub mod path;
pub mod style;
pub mod text;
pub mod transform;

use std::sync::Arc;

use fea_grid::{grid_dimensions, rasterize_with_config, FeaMesh};
use tiny_skia::Pixmap;
use tracing::debug;

pub use cache::{CacheStats, ContourCache, ContourKey};
pub use colormap::{Color, ColorRamp, Colormap};
pub use composite::{ColorbarLayout, Compositor, CompositorConfig, WallProfile};
pub use config::RenderConfig;
pub use contour::{
    generate, generate_with_config, ContourBand, ContourConfig, ContourData, Isoline, LabelPoint,
};
pub use error::{RenderError, Result};
pub use levels::{generate_contour_levels, nice_thresholds};
pub use path::{Path, PathCommand, Point, Polyline, Ring};
pub use style::StyleConfig;
pub use transform::CoordinateTransform;

/// Mesh to pixels in one call.
///
/// Rasterizes `mesh`, contours the grid in raster coordinates and composites
/// the result onto `surface`. The colorbar, when enabled, takes a strip at
/// the right edge and the wall is fitted into the remaining area. With a
/// cache, identical mesh and settings reuse the previous contours.
pub fn render_mesh<C>(
    mesh: &FeaMesh,
    wall: &WallProfile,
    colormap: &C,
    config: &RenderConfig,
    surface: &mut Pixmap,
    cache: Option<&mut ContourCache>,
) -> Result<Arc<ContourData>>
where
    C: Colormap + ?Sized,
{
    config.validate()?;

    let (width, height) = (surface.width(), surface.height());
    let transform = CoordinateTransform::new(
        mesh.bounds,
        width.saturating_sub(config.reserved_width()),
        height,
        config.padding,
    )?;
    let contour_config = config.contour_config();
    let (grid_width, grid_height) = grid_dimensions(
        &mesh.bounds,
        config.grid_width,
        config.grid_height,
        config.grid.baseline_resolution,
    )?;

    let compute = || -> Result<ContourData> {
        let grid =
            rasterize_with_config(mesh, Some(grid_width), Some(grid_height), &config.grid)?;
        generate_with_config(&grid, &contour_config, Some(&transform))
    };

    let contours = match cache {
        Some(cache) => {
            let key = ContourKey::new(
                mesh,
                (grid_width, grid_height),
                &contour_config,
                Some(&transform),
            );
            cache.get_or_compute(key, compute)?
        }
        None => Arc::new(compute()?),
    };

    Compositor::new(config.compositor_config(width, height)).render(
        surface,
        &contours,
        &transform,
        wall,
        colormap,
        (contours.min, contours.max),
    )?;

    debug!(
        width,
        height,
        bands = contours.bands.len(),
        isolines = contours.isolines.len(),
        "Rendered mesh"
    );

    Ok(contours)
}
