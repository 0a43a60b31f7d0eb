//! Finite-element mesh model and rasterization onto regular grids.
//!
//! This crate turns the unstructured triangular mesh produced by an
//! axisymmetric pressure-vessel analysis into a dense, regularly sampled
//! scalar field that contouring can consume.
//!
//! # Architecture
//!
//! ```text
//! FeaMesh (nodes, elements, bounds)
//!      │
//!      ▼
//! rasterize(mesh, width?, height?)
//!      │
//!      ├─► Validate connectivity (unknown node ids are fatal)
//!      │
//!      ├─► Bucket triangles by bounding box (TriangleIndex)
//!      │
//!      ├─► Per grid point (rows in parallel):
//!      │         │
//!      │         ├─► First containing triangle: barycentric blend
//!      │         │
//!      │         └─► No triangle: NaN + mask = false
//!      │
//!      ▼
//! GridData (values, mask, bounds)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fea_grid::{rasterize, FeaMesh};
//!
//! let mesh = FeaMesh::from_json(&payload)?;
//! let grid = rasterize(&mesh, None, None)?;
//! if let Some(stats) = grid.statistics() {
//!     println!("{} .. {} MPa over {} samples", stats.min, stats.max, stats.count);
//! }
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod interpolation;
pub mod testdata;
pub mod types;

// Re-export commonly used types at crate root
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use index::{TriangleBox, TriangleIndex};
pub use interpolation::{
    barycentric, grid_dimensions, is_inside, rasterize, rasterize_linear, rasterize_with_config,
};
pub use types::{Bounds, FeaMesh, GridData, GridStats, MeshElement, MeshNode};
