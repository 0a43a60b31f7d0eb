//! Benchmarks for contour generation and compositing.
//!
//! Run with: cargo bench --package renderer --bench contour_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fea_grid::testdata::cylinder_stress;
use fea_grid::{Bounds, GridData};
use rand::Rng;
use renderer::colormap::ColorRamp;
use renderer::composite::{Compositor, CompositorConfig, WallProfile};
use renderer::contour::generate;
use renderer::levels::nice_thresholds;
use renderer::{render_mesh, ContourCache, CoordinateTransform, RenderConfig};
use tiny_skia::Pixmap;

/// Smooth field with hills and valleys over a square grid.
fn smooth_grid(size: usize) -> GridData {
    let mut values = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let fx = x as f64 / size as f64;
            let fy = y as f64 / size as f64;
            let v1 = (fx * std::f64::consts::PI * 4.0).sin() * 20.0;
            let v2 = (fy * std::f64::consts::PI * 4.0).sin() * 20.0;
            let v3 = ((fx + fy) * std::f64::consts::PI * 2.0).sin() * 10.0;
            values.push(50.0 + v1 + v2 + v3);
        }
    }
    let extent = (size - 1) as f64;
    GridData::from_values(size, size, values, Bounds::new(0.0, extent, 0.0, extent))
        .expect("valid grid")
}

/// Smooth field plus noise, which produces many short isoline pieces.
fn noisy_grid(size: usize) -> GridData {
    let mut rng = rand::thread_rng();
    let mut grid = smooth_grid(size);
    for v in grid.values.iter_mut() {
        *v += rng.gen_range(-5.0..5.0);
    }
    grid
}

// =============================================================================
// THRESHOLDS
// =============================================================================

fn bench_nice_thresholds(c: &mut Criterion) {
    let mut group = c.benchmark_group("nice_thresholds");

    let ranges = [
        (0.0, 100.0, 10, "0-100_x10"),
        (87.3, 212.9, 10, "stress_x10"),
        (-35.0, 12.0, 5, "signed_x5"),
        (1.0, 1.0 + 1e-9, 8, "tiny_x8"),
    ];

    for (min, max, count, name) in ranges {
        group.bench_with_input(
            BenchmarkId::new("levels", name),
            &(min, max, count),
            |b, &(min, max, count)| {
                b.iter(|| nice_thresholds(black_box(min), black_box(max), black_box(count)));
            },
        );
    }

    group.finish();
}

// =============================================================================
// CONTOUR GENERATION
// =============================================================================

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for size in [64usize, 128, 256] {
        let smooth = smooth_grid(size);
        let noisy = noisy_grid(size);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("smooth", size), &smooth, |b, grid| {
            b.iter(|| generate(black_box(grid), 10, None));
        });
        group.bench_with_input(BenchmarkId::new("noisy", size), &noisy, |b, grid| {
            b.iter(|| generate(black_box(grid), 10, None));
        });
    }

    group.finish();
}

// =============================================================================
// COMPOSITING
// =============================================================================

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");

    let mesh = cylinder_stress(100.0, 130.0, 200.0, 20.0, 24, 16);
    let grid = fea_grid::rasterize(&mesh, None, None).expect("rasterize");
    let wall = WallProfile::cylinder(100.0, 130.0, 0.0, 200.0);
    let ramp = ColorRamp::jet();

    for (width, height) in [(256u32, 512u32), (512, 1024)] {
        let transform =
            CoordinateTransform::new(mesh.bounds, width, height, 20.0).expect("transform");
        let contours = generate(&grid, 10, Some(&transform)).expect("contours");
        let compositor = Compositor::new(CompositorConfig::default());

        group.bench_function(BenchmarkId::new("render", format!("{}x{}", width, height)), |b| {
            b.iter(|| {
                let mut surface = Pixmap::new(width, height).expect("pixmap");
                compositor
                    .render(
                        &mut surface,
                        black_box(&contours),
                        &transform,
                        &wall,
                        &ramp,
                        (contours.min, contours.max),
                    )
                    .expect("render");
                surface
            });
        });
    }

    group.finish();
}

// =============================================================================
// FULL PIPELINE
// =============================================================================

fn bench_render_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_mesh");
    group.sample_size(20);

    let mesh = cylinder_stress(100.0, 130.0, 200.0, 20.0, 24, 16);
    let wall = WallProfile::cylinder(100.0, 130.0, 0.0, 200.0);
    let ramp = ColorRamp::jet();
    let config = RenderConfig::default();

    group.bench_function("uncached", |b| {
        b.iter(|| {
            let mut surface = Pixmap::new(400, 600).expect("pixmap");
            render_mesh(black_box(&mesh), &wall, &ramp, &config, &mut surface, None)
                .expect("render")
        });
    });

    let mut cache = ContourCache::new(config.cache_capacity);
    group.bench_function("cached", |b| {
        b.iter(|| {
            let mut surface = Pixmap::new(400, 600).expect("pixmap");
            render_mesh(
                black_box(&mesh),
                &wall,
                &ramp,
                &config,
                &mut surface,
                Some(&mut cache),
            )
            .expect("render")
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_nice_thresholds,
    bench_generate,
    bench_composite,
    bench_render_mesh,
);

criterion_main!(benches);
