//! Synthetic meshes for tests and benchmarks.
//!
//! | Builder | Description |
//! |---------|-------------|
//! | `single_triangle` | One right triangle with explicit nodal values |
//! | `wall_mesh` | Structured wall section `[r_in, r_out] × [z0, z1]`, two triangles per quad |
//! | `cylinder_stress` | `wall_mesh` carrying a thick-walled (Lamé) hoop stress field |

use crate::types::{Bounds, FeaMesh, MeshElement, MeshNode};

/// One right triangle with legs along r and z.
///
/// Vertices are `(r0, z0)`, `(r0 + leg, z0)`, `(r0, z0 + leg)` with the
/// given values, and the bounds are the triangle's box grown by `margin`.
pub fn single_triangle(
    r0: f64,
    z0: f64,
    leg: f64,
    values: [f64; 3],
    margin: f64,
) -> FeaMesh {
    let nodes = vec![
        MeshNode::new(1, r0, z0, values[0]),
        MeshNode::new(2, r0 + leg, z0, values[1]),
        MeshNode::new(3, r0, z0 + leg, values[2]),
    ];
    let centroid_value = values.iter().sum::<f64>() / 3.0;
    let elements = vec![MeshElement {
        nodes: [1, 2, 3],
        region: "test".to_string(),
        centroid_value,
    }];
    let bounds = Bounds::new(r0, r0 + leg, z0, z0 + leg).expand(margin);
    FeaMesh::new(nodes, elements, bounds)
}

/// Structured wall section meshed with `nr × nz` quads, each split in two.
///
/// Node ids start at 1 and run radially first. `field(r, z)` supplies the
/// nodal value. Bounds match the wall exactly.
pub fn wall_mesh<F>(
    r_in: f64,
    r_out: f64,
    z0: f64,
    z1: f64,
    nr: usize,
    nz: usize,
    field: F,
) -> FeaMesh
where
    F: Fn(f64, f64) -> f64,
{
    let nr = nr.max(1);
    let nz = nz.max(1);
    let mut nodes = Vec::with_capacity((nr + 1) * (nz + 1));
    for j in 0..=nz {
        let z = z0 + (z1 - z0) * j as f64 / nz as f64;
        for i in 0..=nr {
            let r = r_in + (r_out - r_in) * i as f64 / nr as f64;
            let id = (j * (nr + 1) + i + 1) as u32;
            nodes.push(MeshNode::new(id, r, z, field(r, z)));
        }
    }

    let id = |i: usize, j: usize| (j * (nr + 1) + i + 1) as u32;
    let mut elements = Vec::with_capacity(nr * nz * 2);
    for j in 0..nz {
        for i in 0..nr {
            let region = if i == 0 { "inner" } else { "wall" };
            elements.push(
                MeshElement::new([id(i, j), id(i + 1, j), id(i + 1, j + 1)]).with_region(region),
            );
            elements.push(
                MeshElement::new([id(i, j), id(i + 1, j + 1), id(i, j + 1)]).with_region(region),
            );
        }
    }

    FeaMesh::new(nodes, elements, Bounds::new(r_in, r_out, z0, z1))
}

/// Hoop stress of a thick-walled cylinder under internal pressure `p` (MPa).
///
/// `σθ(r) = p·a²/(b²−a²)·(1 + b²/r²)` for inner radius `a`, outer radius `b`.
pub fn cylinder_stress(
    r_in: f64,
    r_out: f64,
    length: f64,
    pressure: f64,
    nr: usize,
    nz: usize,
) -> FeaMesh {
    let a2 = r_in * r_in;
    let b2 = r_out * r_out;
    wall_mesh(r_in, r_out, 0.0, length, nr, nz, move |r, _z| {
        pressure * a2 / (b2 - a2) * (1.0 + b2 / (r * r))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_mesh_counts() {
        let mesh = wall_mesh(10.0, 12.0, 0.0, 5.0, 4, 3, |r, _| r);
        assert_eq!(mesh.nodes.len(), 5 * 4);
        assert_eq!(mesh.elements.len(), 4 * 3 * 2);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_cylinder_stress_peaks_at_bore() {
        let mesh = cylinder_stress(100.0, 120.0, 50.0, 10.0, 8, 2);
        let (lo, hi) = mesh.value_range().unwrap();
        let bore = mesh.nodes.iter().find(|n| n.r == 100.0).unwrap();
        assert_eq!(bore.value, hi);
        assert!(lo < hi);
    }
}
