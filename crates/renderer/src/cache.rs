//! Caller-owned LRU cache of contour results.
//!
//! Keys are content hashes of the mesh plus every parameter that changes
//! the output, so a cache can be shared across meshes and settings. There is
//! no global instance; callers create one and pass it where needed.

use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

use fea_grid::{Bounds, FeaMesh};
use serde::{Deserialize, Serialize};

use crate::contour::{ContourConfig, ContourData};
use crate::error::Result;
use crate::transform::CoordinateTransform;

/// 64-bit content hash identifying one contour computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContourKey(pub u64);

impl ContourKey {
    /// Hash the mesh (ids, coordinates, values, connectivity, bounds), the
    /// grid size, the contour settings and the output transform.
    ///
    /// `grid_size` is the resolved `(width, height)` the grid is sampled at,
    /// as returned by [`fea_grid::grid_dimensions`].
    pub fn new(
        mesh: &FeaMesh,
        grid_size: (usize, usize),
        config: &ContourConfig,
        transform: Option<&CoordinateTransform>,
    ) -> Self {
        let mut hasher = DefaultHasher::new();

        mesh.nodes.len().hash(&mut hasher);
        for node in &mesh.nodes {
            node.id.hash(&mut hasher);
            hash_f64(node.r, &mut hasher);
            hash_f64(node.z, &mut hasher);
            hash_f64(node.value, &mut hasher);
        }
        mesh.elements.len().hash(&mut hasher);
        for element in &mesh.elements {
            element.nodes.hash(&mut hasher);
        }
        hash_bounds(&mesh.bounds, &mut hasher);

        grid_size.hash(&mut hasher);
        config.band_count.hash(&mut hasher);
        hash_f64(config.label_interval, &mut hasher);
        config.max_labels.hash(&mut hasher);
        config.level_interval.map(f64::to_bits).hash(&mut hasher);
        config.levels.len().hash(&mut hasher);
        for &level in &config.levels {
            hash_f64(level, &mut hasher);
        }

        match transform {
            Some(t) => {
                1u8.hash(&mut hasher);
                hash_bounds(&t.bounds(), &mut hasher);
                t.raster_size().hash(&mut hasher);
                hash_f64(t.padding(), &mut hasher);
            }
            None => 0u8.hash(&mut hasher),
        }

        Self(hasher.finish())
    }
}

fn hash_f64(value: f64, hasher: &mut DefaultHasher) {
    value.to_bits().hash(hasher);
}

fn hash_bounds(bounds: &Bounds, hasher: &mut DefaultHasher) {
    for v in [bounds.r_min, bounds.r_max, bounds.z_min, bounds.z_max] {
        hash_f64(v, hasher);
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of contour results.
pub struct ContourCache {
    cache: LruCache<ContourKey, Arc<ContourData>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl ContourCache {
    /// Create a cache holding at most `capacity` results (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up a result, counting a hit or miss.
    pub fn get(&mut self, key: &ContourKey) -> Option<Arc<ContourData>> {
        match self.cache.get(key) {
            Some(data) => {
                self.hits += 1;
                Some(Arc::clone(data))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn contains(&self, key: &ContourKey) -> bool {
        self.cache.contains(key)
    }

    /// Insert a result, evicting the least recently used entry when full.
    pub fn insert(&mut self, key: ContourKey, data: Arc<ContourData>) {
        if let Some((evicted, _)) = self.cache.push(key, data) {
            if evicted != key {
                self.evictions += 1;
            }
        }
    }

    /// Return the cached result for `key`, running `compute` on a miss.
    ///
    /// Errors from `compute` are returned and nothing is cached.
    pub fn get_or_compute<F>(&mut self, key: ContourKey, compute: F) -> Result<Arc<ContourData>>
    where
        F: FnOnce() -> Result<ContourData>,
    {
        if let Some(data) = self.get(&key) {
            return Ok(data);
        }
        let data = Arc::new(compute()?);
        self.insert(key, Arc::clone(&data));
        Ok(data)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.cache.len(),
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
