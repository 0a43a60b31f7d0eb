//! Barycentric rasterization of a triangular mesh onto a regular grid.
//!
//! Each grid point is mapped into physical (r, z) space, the containing
//! triangle is located and the nodal values are blended with barycentric
//! weights. The triangle search dominates the cost: with a linear scan it is
//! O(samples × elements), which is fine for meshes in the thousands of
//! elements and grids in the tens of thousands of samples. The bucket index
//! in [`crate::index`] narrows the search without changing which triangle
//! wins.

use rayon::prelude::*;

use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::index::{TriangleBox, TriangleIndex};
use crate::types::{axis_position, Bounds, FeaMesh, GridData};

/// Triangles whose barycentric denominator is smaller than this are skipped.
pub const DEGENERATE_TOLERANCE: f64 = 1e-10;

/// Weights down to `-INSIDE_TOLERANCE` still count as inside (edge points).
pub const INSIDE_TOLERANCE: f64 = 1e-10;

/// Barycentric weights of `p` against triangle `(a, b, c)`.
///
/// Returns `None` when the triangle is degenerate. The third weight is
/// `1 - λ1 - λ2`, so the weights always sum to one.
pub fn barycentric(
    p: (f64, f64),
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
) -> Option<[f64; 3]> {
    let denom = denominator(a, b, c);
    if denom.abs() < DEGENERATE_TOLERANCE {
        return None;
    }
    let l1 = ((b.1 - c.1) * (p.0 - c.0) + (c.0 - b.0) * (p.1 - c.1)) / denom;
    let l2 = ((c.1 - a.1) * (p.0 - c.0) + (a.0 - c.0) * (p.1 - c.1)) / denom;
    Some([l1, l2, 1.0 - l1 - l2])
}

/// Twice the signed area of `(a, b, c)`.
fn denominator(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.1 - c.1) * (a.0 - c.0) + (c.0 - b.0) * (a.1 - c.1)
}

/// Whether barycentric weights place the point inside (or on) the triangle.
pub fn is_inside(weights: &[f64; 3]) -> bool {
    weights.iter().all(|&w| w > -INSIDE_TOLERANCE)
}

/// A non-degenerate mesh triangle ready for point queries.
#[derive(Debug, Clone, Copy)]
struct PreparedTriangle {
    r: [f64; 3],
    z: [f64; 3],
    v: [f64; 3],
}

impl PreparedTriangle {
    fn sample(&self, r: f64, z: f64) -> Option<f64> {
        let w = barycentric(
            (r, z),
            (self.r[0], self.z[0]),
            (self.r[1], self.z[1]),
            (self.r[2], self.z[2]),
        )?;
        if !is_inside(&w) {
            return None;
        }
        Some(w[0] * self.v[0] + w[1] * self.v[1] + w[2] * self.v[2])
    }
}

/// Triangle lookup over a validated mesh.
struct Sampler {
    triangles: Vec<PreparedTriangle>,
    index: Option<TriangleIndex>,
}

impl Sampler {
    fn new(mesh: &FeaMesh, config: &GridConfig) -> Result<Self> {
        let connectivity = mesh.resolve_elements()?;

        let mut triangles = Vec::with_capacity(connectivity.len());
        let mut degenerate = 0usize;
        for ids in connectivity {
            let n = ids.map(|i| &mesh.nodes[i]);
            let tri = PreparedTriangle {
                r: [n[0].r, n[1].r, n[2].r],
                z: [n[0].z, n[1].z, n[2].z],
                v: [n[0].value, n[1].value, n[2].value],
            };
            let denom = denominator(
                (tri.r[0], tri.z[0]),
                (tri.r[1], tri.z[1]),
                (tri.r[2], tri.z[2]),
            );
            if denom.abs() < DEGENERATE_TOLERANCE {
                degenerate += 1;
                continue;
            }
            triangles.push(tri);
        }

        if degenerate > 0 {
            tracing::debug!(degenerate, "Skipped degenerate triangles");
        }

        let index = if config.use_index && !triangles.is_empty() {
            let boxes: Vec<TriangleBox> = triangles
                .iter()
                .map(|t| TriangleBox::from_vertices(t.r, t.z))
                .collect();
            Some(TriangleIndex::build(
                &boxes,
                mesh.bounds,
                config.triangles_per_bucket,
            ))
        } else {
            None
        };

        Ok(Self { triangles, index })
    }

    fn sample(&self, r: f64, z: f64) -> Option<f64> {
        match self.index.as_ref().and_then(|index| index.candidates(r, z)) {
            Some(candidates) => candidates
                .iter()
                .find_map(|&i| self.triangles[i as usize].sample(r, z)),
            None => self.triangles.iter().find_map(|t| t.sample(r, z)),
        }
    }

    fn fill_row(
        &self,
        bounds: &Bounds,
        row: usize,
        height: usize,
        values: &mut [f64],
        mask: &mut [bool],
    ) {
        let width = values.len();
        let z = axis_position(bounds.z_max, bounds.z_min, row as f64, height);
        for col in 0..width {
            let r = axis_position(bounds.r_min, bounds.r_max, col as f64, width);
            match self.sample(r, z) {
                Some(v) => {
                    values[col] = v;
                    mask[col] = true;
                }
                None => {
                    values[col] = f64::NAN;
                    mask[col] = false;
                }
            }
        }
    }
}

/// Resolve grid dimensions from optional requests and the bounds' aspect ratio.
///
/// With neither dimension given, the longer axis gets `baseline` samples and
/// the other is scaled so cells come out approximately square.
pub fn grid_dimensions(
    bounds: &Bounds,
    width: Option<usize>,
    height: Option<usize>,
    baseline: usize,
) -> Result<(usize, usize)> {
    bounds.check()?;
    let aspect = bounds.aspect_ratio();

    let (w, h) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scaled(w, 1.0 / aspect)),
        (None, Some(h)) => (scaled(h, aspect), h),
        (None, None) if aspect >= 1.0 => (baseline, scaled(baseline, 1.0 / aspect)),
        (None, None) => (scaled(baseline, aspect), baseline),
    };

    if w == 0 || h == 0 {
        return Err(GridError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    Ok((w, h))
}

/// Sample count along an axis `factor` times as long, keeping spacing equal.
fn scaled(n: usize, factor: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let intervals = ((n - 1) as f64 * factor).round();
    (intervals as usize + 1).max(2)
}

/// Rasterize a mesh with the default configuration.
pub fn rasterize(mesh: &FeaMesh, width: Option<usize>, height: Option<usize>) -> Result<GridData> {
    rasterize_with_config(mesh, width, height, &GridConfig::default())
}

/// Rasterize with a plain sequential scan of every triangle per grid point.
///
/// Reference path for the indexed and parallel sampler.
pub fn rasterize_linear(
    mesh: &FeaMesh,
    width: Option<usize>,
    height: Option<usize>,
) -> Result<GridData> {
    let config = GridConfig {
        use_index: false,
        parallel: false,
        ..GridConfig::default()
    };
    rasterize_with_config(mesh, width, height, &config)
}

/// Rasterize a mesh onto a `width × height` grid over its bounding box.
///
/// Rejects meshes with elements that reference unknown nodes. Points no
/// triangle contains are stored as `NaN` with a `false` mask entry.
pub fn rasterize_with_config(
    mesh: &FeaMesh,
    width: Option<usize>,
    height: Option<usize>,
    config: &GridConfig,
) -> Result<GridData> {
    config.validate()?;
    let (width, height) =
        grid_dimensions(&mesh.bounds, width, height, config.baseline_resolution)?;
    let sampler = Sampler::new(mesh, config)?;
    let bounds = mesh.bounds;

    let mut values = vec![f64::NAN; width * height];
    let mut mask = vec![false; width * height];

    if config.parallel {
        values
            .par_chunks_mut(width)
            .zip(mask.par_chunks_mut(width))
            .enumerate()
            .for_each(|(row, (vals, msk))| sampler.fill_row(&bounds, row, height, vals, msk));
    } else {
        for (row, (vals, msk)) in values
            .chunks_mut(width)
            .zip(mask.chunks_mut(width))
            .enumerate()
        {
            sampler.fill_row(&bounds, row, height, vals, msk);
        }
    }

    let grid = GridData::new(width, height, values, mask, bounds)?;

    tracing::debug!(
        width,
        height,
        triangles = sampler.triangles.len(),
        indexed = sampler.index.is_some(),
        valid = grid.valid_count(),
        "Rasterized mesh"
    );

    Ok(grid)
}
