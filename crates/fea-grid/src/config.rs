//! Configuration for mesh rasterization.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Configuration for the grid interpolator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Samples along the longer bounding-box axis when no size is requested.
    pub baseline_resolution: usize,

    /// Use the triangle bucket index instead of a linear scan.
    pub use_index: bool,

    /// Target number of triangles per index bucket.
    pub triangles_per_bucket: usize,

    /// Sample rows on the rayon pool.
    pub parallel: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            baseline_resolution: 200,
            use_index: true,
            triangles_per_bucket: 4,
            parallel: true,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FEA_GRID_RESOLUTION") {
            if let Ok(size) = val.parse() {
                config.baseline_resolution = size;
            }
        }

        if let Ok(val) = std::env::var("FEA_GRID_USE_INDEX") {
            config.use_index = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("FEA_GRID_TRIANGLES_PER_BUCKET") {
            if let Ok(n) = val.parse() {
                config.triangles_per_bucket = n;
            }
        }

        if let Ok(val) = std::env::var("FEA_GRID_PARALLEL") {
            config.parallel = parse_flag(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.baseline_resolution < 2 {
            return Err(GridError::config("baseline_resolution must be >= 2"));
        }

        if self.triangles_per_bucket == 0 {
            return Err(GridError::config("triangles_per_bucket must be > 0"));
        }

        Ok(())
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}
