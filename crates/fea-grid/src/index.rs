//! Uniform bucket grid over triangle bounding boxes.
//!
//! The index only narrows the candidate list for a query point. Candidates
//! come back in ascending triangle order, so "first containing triangle"
//! resolves exactly as it would with a linear scan.

use crate::types::Bounds;

/// Largest number of buckets along one axis.
const MAX_BUCKETS_PER_AXIS: usize = 1024;

/// Relative padding applied to triangle boxes before bucketing.
const BOX_PADDING: f64 = 1e-8;

/// Axis-aligned box of one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleBox {
    pub r_min: f64,
    pub r_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl TriangleBox {
    pub fn from_vertices(r: [f64; 3], z: [f64; 3]) -> Self {
        Self {
            r_min: r[0].min(r[1]).min(r[2]),
            r_max: r[0].max(r[1]).max(r[2]),
            z_min: z[0].min(z[1]).min(z[2]),
            z_max: z[0].max(z[1]).max(z[2]),
        }
    }

    fn padded(&self) -> Self {
        let pad = BOX_PADDING * (self.r_max - self.r_min).max(self.z_max - self.z_min)
            + f64::EPSILON * self.r_max.abs().max(self.z_max.abs()).max(1.0);
        Self {
            r_min: self.r_min - pad,
            r_max: self.r_max + pad,
            z_min: self.z_min - pad,
            z_max: self.z_max + pad,
        }
    }
}

/// Bucket grid mapping a point to the triangles whose boxes cover it.
#[derive(Debug, Clone)]
pub struct TriangleIndex {
    bounds: Bounds,
    cols: usize,
    rows: usize,
    cell_r: f64,
    cell_z: f64,
    buckets: Vec<Vec<u32>>,
}

impl TriangleIndex {
    /// Build an index over `boxes` covering `bounds`.
    ///
    /// Bucket count targets `per_bucket` triangles per bucket.
    pub fn build(boxes: &[TriangleBox], bounds: Bounds, per_bucket: usize) -> Self {
        let target = (boxes.len() / per_bucket.max(1)).max(1) as f64;
        let aspect = bounds.aspect_ratio();
        let cols = ((target * aspect).sqrt().ceil() as usize).clamp(1, MAX_BUCKETS_PER_AXIS);
        let rows = ((target / cols as f64).ceil() as usize).clamp(1, MAX_BUCKETS_PER_AXIS);

        let mut index = Self {
            bounds,
            cols,
            rows,
            cell_r: bounds.width() / cols as f64,
            cell_z: bounds.height() / rows as f64,
            buckets: vec![Vec::new(); cols * rows],
        };

        for (i, b) in boxes.iter().enumerate() {
            let b = b.padded();
            if b.r_max < bounds.r_min
                || b.r_min > bounds.r_max
                || b.z_max < bounds.z_min
                || b.z_min > bounds.z_max
            {
                continue;
            }
            let (c0, c1) = (index.col(b.r_min), index.col(b.r_max));
            let (r0, r1) = (index.row(b.z_min), index.row(b.z_max));
            for row in r0..=r1 {
                for col in c0..=c1 {
                    index.buckets[row * cols + col].push(i as u32);
                }
            }
        }

        index
    }

    /// Candidate triangles for a point, in ascending order.
    ///
    /// Returns `None` for points outside the indexed bounds; callers fall
    /// back to a full scan there.
    pub fn candidates(&self, r: f64, z: f64) -> Option<&[u32]> {
        if !self.bounds.contains(r, z) {
            return None;
        }
        let idx = self.row(z) * self.cols + self.col(r);
        Some(&self.buckets[idx])
    }

    /// Number of buckets along (r, z).
    pub fn shape(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    fn col(&self, r: f64) -> usize {
        let c = ((r - self.bounds.r_min) / self.cell_r).floor();
        (c.max(0.0) as usize).min(self.cols - 1)
    }

    fn row(&self, z: f64) -> usize {
        let c = ((z - self.bounds.z_min) / self.cell_z).floor();
        (c.max(0.0) as usize).min(self.rows - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_cover_point() {
        let boxes = vec![
            TriangleBox::from_vertices([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            TriangleBox::from_vertices([5.0, 10.0, 10.0], [5.0, 5.0, 10.0]),
        ];
        let index = TriangleIndex::build(&boxes, Bounds::new(0.0, 10.0, 0.0, 10.0), 1);

        assert!(index.candidates(0.2, 0.2).unwrap().contains(&0));
        assert!(index.candidates(9.0, 8.0).unwrap().contains(&1));
        assert!(index.candidates(11.0, 8.0).is_none());
    }

    #[test]
    fn test_candidates_sorted() {
        let boxes: Vec<_> = (0..20)
            .map(|i| {
                let o = i as f64 * 0.1;
                TriangleBox::from_vertices([o, o + 5.0, o], [0.0, 0.0, 5.0])
            })
            .collect();
        let index = TriangleIndex::build(&boxes, Bounds::new(0.0, 10.0, 0.0, 10.0), 2);
        let candidates = index.candidates(3.0, 1.0).unwrap();
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(candidates.len(), 20);
    }
}
