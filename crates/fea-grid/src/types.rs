//! Core types for finite-element meshes and sampled grids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// A physical bounding box over the (r, z) profile plane, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub r_min: f64,
    pub r_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Bounds {
    /// Create a new bounding box.
    pub fn new(r_min: f64, r_max: f64, z_min: f64, z_max: f64) -> Self {
        Self {
            r_min,
            r_max,
            z_min,
            z_max,
        }
    }

    /// Tightest box around a set of (r, z) points.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (r, z) = iter.next()?;
        let mut bounds = Self::new(r, r, z, z);
        for (r, z) in iter {
            bounds.r_min = bounds.r_min.min(r);
            bounds.r_max = bounds.r_max.max(r);
            bounds.z_min = bounds.z_min.min(z);
            bounds.z_max = bounds.z_max.max(z);
        }
        Some(bounds)
    }

    /// Radial extent.
    pub fn width(&self) -> f64 {
        self.r_max - self.r_min
    }

    /// Axial extent.
    pub fn height(&self) -> f64 {
        self.z_max - self.z_min
    }

    /// Radial extent divided by axial extent.
    pub fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }

    /// Check if a point is contained within this bounding box.
    pub fn contains(&self, r: f64, z: f64) -> bool {
        r >= self.r_min && r <= self.r_max && z >= self.z_min && z <= self.z_max
    }

    /// Expand the bounding box by a margin on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            r_min: self.r_min - margin,
            r_max: self.r_max + margin,
            z_min: self.z_min - margin,
            z_max: self.z_max + margin,
        }
    }

    /// Finite with a strictly positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        [self.r_min, self.r_max, self.z_min, self.z_max]
            .iter()
            .all(|v| v.is_finite())
            && self.width() > 0.0
            && self.height() > 0.0
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(GridError::invalid_bounds(format!(
                "r=[{}, {}] z=[{}, {}]",
                self.r_min, self.r_max, self.z_min, self.z_max
            )))
        }
    }
}

/// A mesh node with its solved scalar value (e.g. stress in MPa).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub id: u32,
    pub r: f64,
    pub z: f64,
    pub value: f64,
}

impl MeshNode {
    pub fn new(id: u32, r: f64, z: f64, value: f64) -> Self {
        Self { id, r, z, value }
    }
}

/// A linear triangle referencing three node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshElement {
    pub nodes: [u32; 3],
    /// Free-form classification (e.g. "shell", "weld", "nozzle").
    #[serde(default)]
    pub region: String,
    /// Solver-reported value at the centroid. Diagnostic only.
    #[serde(default)]
    pub centroid_value: f64,
}

impl MeshElement {
    pub fn new(nodes: [u32; 3]) -> Self {
        Self {
            nodes,
            region: String::new(),
            centroid_value: 0.0,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

/// Nodes, triangles and the authoritative physical bounds of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaMesh {
    pub nodes: Vec<MeshNode>,
    pub elements: Vec<MeshElement>,
    /// May be looser than the node extent; all coordinate mapping uses it.
    pub bounds: Bounds,
}

impl FeaMesh {
    pub fn new(nodes: Vec<MeshNode>, elements: Vec<MeshElement>, bounds: Bounds) -> Self {
        Self {
            nodes,
            elements,
            bounds,
        }
    }

    /// Decode a mesh from the JSON shape produced by the analysis layer.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Map of node id to position in `nodes`.
    ///
    /// Fails on duplicate ids or a non-finite coordinate or value.
    pub fn node_index(&self) -> Result<HashMap<u32, usize>> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.r.is_finite() || !node.z.is_finite() || !node.value.is_finite() {
                return Err(GridError::InvalidNode(node.id));
            }
            if index.insert(node.id, i).is_some() {
                return Err(GridError::DuplicateNode(node.id));
            }
        }
        Ok(index)
    }

    /// Check bounds, node ids and element connectivity.
    pub fn validate(&self) -> Result<()> {
        self.resolve_elements().map(|_| ())
    }

    /// Element connectivity as positions into `nodes`.
    pub(crate) fn resolve_elements(&self) -> Result<Vec<[usize; 3]>> {
        self.bounds.check()?;
        let index = self.node_index()?;
        self.elements
            .iter()
            .enumerate()
            .map(|(e, element)| {
                let mut resolved = [0usize; 3];
                for (slot, id) in resolved.iter_mut().zip(element.nodes) {
                    *slot = *index
                        .get(&id)
                        .ok_or(GridError::UnknownNode { element: e, node: id })?;
                }
                Ok(resolved)
            })
            .collect()
    }

    /// Minimum and maximum finite nodal value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.nodes
            .iter()
            .map(|n| n.value)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Regularly sampled scalar field with a validity mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridData {
    pub width: usize,
    pub height: usize,
    /// Row-major samples, row 0 at `z_max`, column 0 at `r_min`.
    /// Masked-out samples hold `NaN`.
    pub values: Vec<f64>,
    pub mask: Vec<bool>,
    pub bounds: Bounds,
}

impl GridData {
    /// Build a grid from raw buffers, checking that their lengths agree.
    pub fn new(
        width: usize,
        height: usize,
        values: Vec<f64>,
        mask: Vec<bool>,
        bounds: Bounds,
    ) -> Result<Self> {
        let expected = width * height;
        if values.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        if mask.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: mask.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
            mask,
            bounds,
        })
    }

    /// Build a grid whose mask is derived from the values (`NaN` = invalid).
    pub fn from_values(
        width: usize,
        height: usize,
        values: Vec<f64>,
        bounds: Bounds,
    ) -> Result<Self> {
        let mask = values.iter().map(|v| !v.is_nan()).collect();
        Self::new(width, height, values, mask, bounds)
    }

    /// Value at a grid coordinate, `None` when outside or masked.
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let idx = row * self.width + col;
        if self.mask[idx] && self.values[idx].is_finite() {
            Some(self.values[idx])
        } else {
            None
        }
    }

    /// Whether the sample at a flat index may be read.
    pub fn is_valid(&self, idx: usize) -> bool {
        self.mask.get(idx).copied().unwrap_or(false)
            && self.values.get(idx).is_some_and(|v| v.is_finite())
    }

    /// Physical (r, z) of a grid coordinate.
    pub fn physical_coords(&self, col: f64, row: f64) -> (f64, f64) {
        (
            axis_position(self.bounds.r_min, self.bounds.r_max, col, self.width),
            axis_position(self.bounds.z_max, self.bounds.z_min, row, self.height),
        )
    }

    /// Number of readable samples.
    pub fn valid_count(&self) -> usize {
        (0..self.values.len()).filter(|&i| self.is_valid(i)).count()
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Min, max, mean and count over readable samples only.
    pub fn statistics(&self) -> Option<GridStats> {
        let mut stats: Option<GridStats> = None;
        let mut sum = 0.0;
        for (i, &v) in self.values.iter().enumerate() {
            if !self.is_valid(i) {
                continue;
            }
            sum += v;
            stats = Some(match stats {
                None => GridStats {
                    min: v,
                    max: v,
                    mean: 0.0,
                    count: 1,
                },
                Some(s) => GridStats {
                    min: s.min.min(v),
                    max: s.max.max(v),
                    mean: 0.0,
                    count: s.count + 1,
                },
            });
        }
        stats.map(|s| GridStats {
            mean: sum / s.count as f64,
            ..s
        })
    }
}

/// Summary statistics over the valid samples of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

/// Position of sample `i` of `n` along an axis running from `start` to `end`.
///
/// A single-sample axis sits at the centre.
pub fn axis_position(start: f64, end: f64, i: f64, n: usize) -> f64 {
    if n <= 1 {
        return (start + end) / 2.0;
    }
    start + (end - start) * i / (n - 1) as f64
}
