//! Tests for contour result caching.

use std::sync::Arc;

use fea_grid::testdata::cylinder_stress;
use fea_grid::{grid_dimensions, rasterize, FeaMesh, GridConfig};
use renderer::contour::generate_with_config;
use renderer::{
    render_mesh, ColorRamp, ContourCache, ContourConfig, ContourData, ContourKey,
    CoordinateTransform, RenderConfig, RenderError, WallProfile,
};
use tiny_skia::Pixmap;

fn mesh() -> FeaMesh {
    cylinder_stress(100.0, 130.0, 200.0, 20.0, 6, 4)
}

fn transform(mesh: &FeaMesh, width: u32) -> CoordinateTransform {
    CoordinateTransform::new(mesh.bounds, width, 400, 10.0).unwrap()
}

fn key(mesh: &FeaMesh, config: &ContourConfig, t: Option<&CoordinateTransform>) -> ContourKey {
    ContourKey::new(mesh, (40, 80), config, t)
}

// ============================================================================
// Keys
// ============================================================================

#[test]
fn test_key_is_stable() {
    let m = mesh();
    let config = ContourConfig::default();
    let t = transform(&m, 300);
    assert_eq!(key(&m, &config, Some(&t)), key(&m, &config, Some(&t)));
    assert_eq!(key(&mesh(), &config, None), key(&m, &config, None));
}

#[test]
fn test_key_tracks_mesh_values() {
    let m = mesh();
    let mut changed = mesh();
    changed.nodes[3].value += 1e-9;
    let config = ContourConfig::default();
    assert_ne!(key(&m, &config, None), key(&changed, &config, None));
}

#[test]
fn test_key_tracks_settings() {
    let m = mesh();
    let base = ContourConfig::default();
    let bands = ContourConfig::with_band_count(4);
    let levels = ContourConfig {
        levels: vec![10.0, 20.0],
        ..ContourConfig::default()
    };
    let labels = ContourConfig {
        label_interval: 80.0,
        ..ContourConfig::default()
    };
    let interval = ContourConfig {
        level_interval: Some(5.0),
        ..ContourConfig::default()
    };

    let k = key(&m, &base, None);
    assert_ne!(k, key(&m, &bands, None));
    assert_ne!(k, key(&m, &levels, None));
    assert_ne!(k, key(&m, &labels, None));
    assert_ne!(k, key(&m, &interval, None));
    assert_ne!(k, ContourKey::new(&m, (50, 50), &base, None));
}

#[test]
fn test_key_tracks_baseline_resolution() {
    let m = mesh();
    let config = ContourConfig::default();
    let coarse = grid_dimensions(&m.bounds, None, None, 10).unwrap();
    let fine = grid_dimensions(&m.bounds, None, None, 200).unwrap();

    assert_ne!(coarse, fine);
    assert_ne!(
        ContourKey::new(&m, coarse, &config, None),
        ContourKey::new(&m, fine, &config, None)
    );
}

#[test]
fn test_key_tracks_transform() {
    let m = mesh();
    let config = ContourConfig::default();
    let narrow = transform(&m, 300);
    let wide = transform(&m, 500);

    assert_ne!(key(&m, &config, None), key(&m, &config, Some(&narrow)));
    assert_ne!(key(&m, &config, Some(&narrow)), key(&m, &config, Some(&wide)));
}

// ============================================================================
// get_or_compute
// ============================================================================

#[test]
fn test_get_or_compute_runs_once() {
    let m = mesh();
    let config = ContourConfig::default();
    let grid = rasterize(&m, Some(40), Some(80)).unwrap();
    let k = key(&m, &config, None);

    let mut cache = ContourCache::new(4);
    let mut runs = 0;
    let first = cache
        .get_or_compute(k, || {
            runs += 1;
            generate_with_config(&grid, &config, None)
        })
        .unwrap();
    let second = cache
        .get_or_compute(k, || {
            runs += 1;
            generate_with_config(&grid, &config, None)
        })
        .unwrap();

    assert_eq!(runs, 1);
    assert!(Arc::ptr_eq(&first, &second));

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    assert_eq!(stats.hit_rate(), 0.5);
}

#[test]
fn test_errors_are_not_cached() {
    let m = mesh();
    let grid = rasterize(&m, Some(40), Some(80)).unwrap();
    let bad = ContourConfig::with_band_count(0);
    let k = key(&m, &bad, None);

    let mut cache = ContourCache::new(4);
    let result = cache.get_or_compute(k, || generate_with_config(&grid, &bad, None));
    assert!(matches!(result, Err(RenderError::InvalidBandCount)));
    assert!(cache.is_empty());
    assert!(!cache.contains(&k));
}

#[test]
fn test_clear_keeps_counters() {
    let m = mesh();
    let config = ContourConfig::default();
    let grid = rasterize(&m, Some(40), Some(80)).unwrap();

    let mut cache = ContourCache::new(2);
    cache
        .get_or_compute(key(&m, &config, None), || {
            generate_with_config(&grid, &config, None)
        })
        .unwrap();
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats().misses, 1);
    assert_eq!(cache.capacity(), 2);
}

// ============================================================================
// render_mesh
// ============================================================================

fn render(
    mesh: &FeaMesh,
    config: &RenderConfig,
    cache: Option<&mut ContourCache>,
) -> Arc<ContourData> {
    let wall = WallProfile::cylinder(100.0, 130.0, 0.0, 200.0);
    let mut surface = Pixmap::new(300, 400).unwrap();
    render_mesh(mesh, &wall, &ColorRamp::jet(), config, &mut surface, cache).unwrap()
}

#[test]
fn test_render_mesh_misses_on_new_baseline_resolution() {
    let m = mesh();
    let coarse = RenderConfig {
        grid: GridConfig {
            baseline_resolution: 10,
            ..GridConfig::default()
        },
        ..RenderConfig::default()
    };
    let fine = RenderConfig::default();

    let mut cache = ContourCache::new(4);
    let a = render(&m, &coarse, Some(&mut cache));
    let b = render(&m, &fine, Some(&mut cache));
    let uncached = render(&m, &fine, None);

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(*b, *uncached);
    assert_eq!(cache.stats().hits, 0);
    assert_eq!(cache.stats().misses, 2);
    assert_eq!(cache.len(), 2);
}
