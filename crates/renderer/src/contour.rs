//! Filled contour bands and isolines over a regular grid.
//!
//! Every grid cell is split into two triangles along the same diagonal
//! (marching triangles). The field is linear on each triangle, so saddle
//! cells need no disambiguation and band boundaries coincide exactly with
//! the isolines of the same threshold. Triangles with a masked corner
//! contribute nothing.
//!
//! Bands are built by clipping each triangle against the value slab of a
//! band. Points created by clipping are identified symbolically by the grid
//! edge they lie on and the threshold index, so the same point computed from
//! two neighbouring triangles is the same key and shared edges cancel
//! exactly. The surviving directed edges are stitched into closed rings.

use std::collections::{BTreeSet, HashMap};

use fea_grid::GridData;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::levels::resolve_levels;
use crate::path::{Path, Point, Polyline, Ring};
use crate::transform::CoordinateTransform;

/// Default arc length between labels, in output units.
///
/// Tuned for rasters of roughly 600 to 800 pixels on their long side.
pub const DEFAULT_LABEL_INTERVAL: f64 = 150.0;

/// Default upper limit on labels per isoline.
pub const DEFAULT_MAX_LABELS: usize = 4;

/// Contour generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Requested number of thresholds (bands = thresholds + 1 at most).
    pub band_count: usize,
    /// Arc length between labels, in the units of the output coordinates.
    pub label_interval: f64,
    /// Maximum number of labels on one isoline.
    pub max_labels: usize,
    /// Fixed spacing between thresholds; replaces `band_count` when set.
    pub level_interval: Option<f64>,
    /// Explicit thresholds; when non-empty they replace the generated ones.
    pub levels: Vec<f64>,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            band_count: 10,
            label_interval: DEFAULT_LABEL_INTERVAL,
            max_labels: DEFAULT_MAX_LABELS,
            level_interval: None,
            levels: vec![],
        }
    }
}

impl ContourConfig {
    pub fn with_band_count(band_count: usize) -> Self {
        Self {
            band_count,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.band_count == 0 {
            return Err(RenderError::InvalidBandCount);
        }
        if !(self.label_interval > 0.0) || !self.label_interval.is_finite() {
            return Err(RenderError::config(format!(
                "label interval must be positive, got {}",
                self.label_interval
            )));
        }
        if self.max_labels == 0 {
            return Err(RenderError::config("max labels must be at least 1"));
        }
        if let Some(interval) = self.level_interval {
            if !(interval > 0.0) || !interval.is_finite() {
                return Err(RenderError::config(format!(
                    "level interval must be positive, got {}",
                    interval
                )));
            }
        }
        Ok(())
    }
}

/// Region between two adjacent thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourBand {
    /// Representative value: the lower threshold, or the observed minimum
    /// for the lowest band.
    pub value: f64,
    /// Disjoint polygons; the first ring of each is the exterior and any
    /// further rings are holes (even-odd).
    pub polygons: Vec<Vec<Ring>>,
}

impl ContourBand {
    /// Covered area: exteriors minus holes.
    pub fn area(&self) -> f64 {
        self.polygons
            .iter()
            .flat_map(|rings| {
                rings
                    .iter()
                    .enumerate()
                    .map(|(i, ring)| if i == 0 { ring.area() } else { -ring.area() })
            })
            .sum()
    }

    /// All rings as a single even-odd path.
    pub fn path(&self) -> Path {
        Path::from_rings(self.polygons.iter().flatten())
    }
}

/// Where to draw a label on an isoline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelPoint {
    pub x: f64,
    pub y: f64,
    /// Tangent direction, normalized into `[-90, 90]` so text stays upright.
    pub angle_degrees: f64,
}

/// All curves at one threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isoline {
    pub value: f64,
    pub lines: Vec<Polyline>,
    pub labels: Vec<LabelPoint>,
}

impl Isoline {
    pub fn path(&self) -> Path {
        Path::from_polylines(&self.lines)
    }
}

/// Complete contouring result for one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourData {
    pub bands: Vec<ContourBand>,
    pub isolines: Vec<Isoline>,
    /// Thresholds actually used, ascending.
    pub thresholds: Vec<f64>,
    /// Observed range over valid samples (`NaN` when there are none).
    pub min: f64,
    pub max: f64,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl ContourData {
    fn empty(grid: &GridData) -> Self {
        Self {
            bands: vec![],
            isolines: vec![],
            thresholds: vec![],
            min: f64::NAN,
            max: f64::NAN,
            grid_width: grid.width,
            grid_height: grid.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty() && self.isolines.is_empty()
    }
}

/// Contour `grid` with `band_count` generated thresholds and default
/// labelling.
pub fn generate(
    grid: &GridData,
    band_count: usize,
    transform: Option<&CoordinateTransform>,
) -> Result<ContourData> {
    generate_with_config(grid, &ContourConfig::with_band_count(band_count), transform)
}

/// Contour `grid` with full control over thresholds and labels.
///
/// Output points are physical `(r, z)` unless a transform is given, in which
/// case they are raster pixels.
pub fn generate_with_config(
    grid: &GridData,
    config: &ContourConfig,
    transform: Option<&CoordinateTransform>,
) -> Result<ContourData> {
    config.validate()?;

    let Some(stats) = grid.statistics() else {
        debug!(
            width = grid.width,
            height = grid.height,
            "No valid samples, skipping contours"
        );
        return Ok(ContourData::empty(grid));
    };

    let thresholds = resolve_levels(
        &config.levels,
        config.level_interval,
        stats.min,
        stats.max,
        config.band_count,
    );
    let field = Field {
        grid,
        levels: &thresholds,
        transform,
    };

    let bands = field.bands(stats.min);
    let isolines: Vec<Isoline> = (0..thresholds.len())
        .map(|level| field.isoline(level, config))
        .filter(|iso| !iso.lines.is_empty())
        .collect();

    debug!(
        width = grid.width,
        height = grid.height,
        min = stats.min,
        max = stats.max,
        thresholds = thresholds.len(),
        bands = bands.len(),
        isolines = isolines.len(),
        "Generated contours"
    );

    Ok(ContourData {
        bands,
        isolines,
        thresholds,
        min: stats.min,
        max: stats.max,
        grid_width: grid.width,
        grid_height: grid.height,
    })
}

/// A point of the triangulated field, either a grid sample or the place
/// where a grid edge `a < b` crosses threshold `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum NodeKey {
    Vertex(usize),
    Crossing { a: usize, b: usize, level: usize },
}

type Edge = (NodeKey, NodeKey);

struct Field<'a> {
    grid: &'a GridData,
    levels: &'a [f64],
    transform: Option<&'a CoordinateTransform>,
}

impl Field<'_> {
    /// Valid triangles, two per cell, counter-clockwise in physical space.
    fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let w = self.grid.width;
        (0..self.grid.height.saturating_sub(1))
            .flat_map(move |row| {
                (0..w.saturating_sub(1)).flat_map(move |col| {
                    let tl = row * w + col;
                    let tr = tl + 1;
                    let bl = tl + w;
                    let br = bl + 1;
                    [[tl, bl, br], [tl, br, tr]]
                })
            })
            .filter(move |tri| tri.iter().all(|&i| self.grid.is_valid(i)))
    }

    fn value(&self, key: NodeKey) -> f64 {
        match key {
            NodeKey::Vertex(i) => self.grid.values[i],
            NodeKey::Crossing { level, .. } => self.levels[level],
        }
    }

    /// Band index of a value: the number of thresholds at or below it.
    fn slab(&self, value: f64) -> usize {
        self.levels.partition_point(|&t| t <= value)
    }

    /// Key for the crossing of threshold `level` on grid edge `(a, b)`.
    ///
    /// The parameter is computed from the ordered endpoints so that both
    /// triangles sharing the edge agree, and crossings at an endpoint
    /// collapse to that vertex.
    fn crossing(&self, a: usize, b: usize, level: usize) -> NodeKey {
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        let t = self.fraction(a, b, level);
        if !(t > 0.0) {
            NodeKey::Vertex(a)
        } else if t >= 1.0 {
            NodeKey::Vertex(b)
        } else {
            NodeKey::Crossing { a, b, level }
        }
    }

    fn fraction(&self, a: usize, b: usize, level: usize) -> f64 {
        let va = self.grid.values[a];
        let vb = self.grid.values[b];
        (self.levels[level] - va) / (vb - va)
    }

    /// Point in physical `(r, z)` coordinates.
    fn physical(&self, key: NodeKey) -> Point {
        let w = self.grid.width;
        let (col, row) = match key {
            NodeKey::Vertex(i) => ((i % w) as f64, (i / w) as f64),
            NodeKey::Crossing { a, b, level } => {
                let t = self.fraction(a, b, level);
                let (ca, ra) = ((a % w) as f64, (a / w) as f64);
                let (cb, rb) = ((b % w) as f64, (b / w) as f64);
                (ca + t * (cb - ca), ra + t * (rb - ra))
            }
        };
        let (r, z) = self.grid.physical_coords(col, row);
        Point::new(r, z)
    }

    /// Point in output coordinates.
    fn point(&self, key: NodeKey) -> Point {
        let p = self.physical(key);
        match self.transform {
            Some(t) => t.to_raster(p.x, p.y),
            None => p,
        }
    }

    // ------------------------------------------------------------------
    // Bands
    // ------------------------------------------------------------------

    fn bands(&self, observed_min: f64) -> Vec<ContourBand> {
        let slab_count = self.levels.len() + 1;
        let mut edges: Vec<HashMap<Edge, usize>> = vec![HashMap::new(); slab_count];

        for tri in self.triangles() {
            let values = tri.map(|i| self.grid.values[i]);
            let lo = self.slab(values.iter().copied().fold(f64::INFINITY, f64::min));
            let hi = self.slab(values.iter().copied().fold(f64::NEG_INFINITY, f64::max));

            let whole = tri.map(NodeKey::Vertex);
            if lo == hi {
                add_polygon(&mut edges[lo], &whole);
                continue;
            }

            for slab in lo..=hi {
                let mut poly = whole.to_vec();
                if slab > 0 {
                    poly = self.clip(&poly, slab - 1, true);
                }
                if slab < self.levels.len() {
                    poly = self.clip(&poly, slab, false);
                }
                poly.dedup();
                while poly.len() > 1 && poly.first() == poly.last() {
                    poly.pop();
                }
                if poly.len() >= 3 {
                    add_polygon(&mut edges[slab], &poly);
                }
            }
        }

        edges
            .into_iter()
            .enumerate()
            .filter(|(_, e)| !e.is_empty())
            .map(|(slab, e)| ContourBand {
                value: if slab == 0 {
                    observed_min
                } else {
                    self.levels[slab - 1]
                },
                polygons: self.assemble(e),
            })
            .filter(|band| !band.polygons.is_empty())
            .collect()
    }

    /// Sutherland–Hodgman against one threshold: keep `value >= level` when
    /// `keep_above`, otherwise `value < level`.
    fn clip(&self, poly: &[NodeKey], level: usize, keep_above: bool) -> Vec<NodeKey> {
        let threshold = self.levels[level];
        let inside = |key: NodeKey| {
            let v = self.value(key);
            if keep_above {
                v >= threshold
            } else {
                v < threshold
            }
        };

        let n = poly.len();
        let mut out = Vec::with_capacity(n + 2);
        for i in 0..n {
            let prev = poly[(i + n - 1) % n];
            let cur = poly[i];
            let (prev_in, cur_in) = (inside(prev), inside(cur));
            if prev_in != cur_in {
                if let Some((a, b)) = supporting_edge(prev, cur) {
                    out.push(self.crossing(a, b, level));
                }
            }
            if cur_in {
                out.push(cur);
            }
        }
        out
    }

    /// Stitch boundary edges into rings and group holes with exteriors.
    fn assemble(&self, counts: HashMap<Edge, usize>) -> Vec<Vec<Ring>> {
        let mut edges: Vec<Edge> = counts
            .into_iter()
            .flat_map(|(edge, count)| std::iter::repeat(edge).take(count))
            .collect();
        edges.sort();

        let mut outgoing: HashMap<NodeKey, Vec<NodeKey>> = HashMap::new();
        for &(from, to) in edges.iter().rev() {
            outgoing.entry(from).or_default().push(to);
        }

        let mut exteriors: Vec<Ring> = Vec::new();
        let mut holes: Vec<Ring> = Vec::new();
        let mut broken = 0usize;

        for &(start, _) in &edges {
            while outgoing.get(&start).is_some_and(|v| !v.is_empty()) {
                let mut keys = vec![start];
                let mut cur = start;
                let closed = loop {
                    let Some(next) = outgoing.get_mut(&cur).and_then(|v| v.pop()) else {
                        break false;
                    };
                    if next == start {
                        break true;
                    }
                    keys.push(next);
                    cur = next;
                };
                if !closed || keys.len() < 3 {
                    broken += 1;
                    continue;
                }

                // Orientation is only meaningful before the y flip.
                let physical: Vec<Point> = keys.iter().map(|&k| self.physical(k)).collect();
                let area = Ring::new(physical).signed_area();
                let ring = Ring::new(keys.iter().map(|&k| self.point(k)).collect());
                if area > 0.0 {
                    exteriors.push(ring);
                } else if area < 0.0 {
                    holes.push(ring);
                }
            }
        }

        if broken > 0 {
            debug!(broken, "Dropped unclosed band boundary chains");
        }

        let mut polygons: Vec<Vec<Ring>> = exteriors.into_iter().map(|ring| vec![ring]).collect();
        let mut order: Vec<usize> = (0..polygons.len()).collect();
        order.sort_by(|&a, &b| polygons[a][0].area().total_cmp(&polygons[b][0].area()));

        let mut orphans = 0usize;
        for hole in holes {
            let probe = interior_probe(&hole);
            match order.iter().find(|&&i| polygons[i][0].contains(probe)) {
                Some(&i) => polygons[i].push(hole),
                None => orphans += 1,
            }
        }
        if orphans > 0 {
            debug!(orphans, "Dropped holes without an enclosing ring");
        }

        polygons
    }

    // ------------------------------------------------------------------
    // Isolines
    // ------------------------------------------------------------------

    fn isoline(&self, level: usize, config: &ContourConfig) -> Isoline {
        let threshold = self.levels[level];
        let mut segments: BTreeSet<Edge> = BTreeSet::new();

        for tri in self.triangles() {
            let above = tri.map(|i| self.grid.values[i] >= threshold);
            if above[0] == above[1] && above[1] == above[2] {
                continue;
            }
            let mut ends = Vec::with_capacity(2);
            for (i, j) in [(0, 1), (1, 2), (2, 0)] {
                if above[i] != above[j] {
                    ends.push(self.crossing(tri[i], tri[j], level));
                }
            }
            if let [p, q] = ends[..] {
                if p != q {
                    segments.insert(if p < q { (p, q) } else { (q, p) });
                }
            }
        }

        let lines: Vec<Polyline> = chain_segments(&segments)
            .into_iter()
            .map(|(keys, closed)| Polyline {
                points: keys.into_iter().map(|k| self.point(k)).collect(),
                closed,
            })
            .collect();
        let labels = place_labels(&lines, config.label_interval, config.max_labels);

        Isoline {
            value: threshold,
            lines,
            labels,
        }
    }
}

/// The grid edge a polygon edge lies on, if any. Chords across a triangle
/// only join points of one threshold and are never crossed.
fn supporting_edge(p: NodeKey, q: NodeKey) -> Option<(usize, usize)> {
    match (p, q) {
        (NodeKey::Vertex(a), NodeKey::Vertex(b)) => Some((a, b)),
        (NodeKey::Vertex(v), NodeKey::Crossing { a, b, .. })
        | (NodeKey::Crossing { a, b, .. }, NodeKey::Vertex(v))
            if v == a || v == b =>
        {
            Some((a, b))
        }
        (NodeKey::Crossing { a, b, .. }, NodeKey::Crossing { a: c, b: d, .. })
            if (a, b) == (c, d) =>
        {
            Some((a, b))
        }
        _ => None,
    }
}

/// Record a polygon's directed edges, cancelling against reversed ones.
fn add_polygon(edges: &mut HashMap<Edge, usize>, poly: &[NodeKey]) {
    let n = poly.len();
    for i in 0..n {
        let (from, to) = (poly[i], poly[(i + 1) % n]);
        if let Some(count) = edges.get_mut(&(to, from)) {
            *count -= 1;
            if *count == 0 {
                edges.remove(&(to, from));
            }
            continue;
        }
        *edges.entry((from, to)).or_insert(0) += 1;
    }
}

/// A point just inside a ring, next to its first edge.
fn interior_probe(ring: &Ring) -> Point {
    match ring.points.as_slice() {
        [a, b, ..] => Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
        [a] => *a,
        [] => Point::new(f64::NAN, f64::NAN),
    }
}

/// Join undirected segments into maximal chains.
///
/// Open chains start at odd-degree nodes; what remains forms closed loops.
fn chain_segments(segments: &BTreeSet<Edge>) -> Vec<(Vec<NodeKey>, bool)> {
    let segs: Vec<Edge> = segments.iter().copied().collect();
    let mut adjacency: HashMap<NodeKey, Vec<usize>> = HashMap::new();
    for (i, &(p, q)) in segs.iter().enumerate() {
        adjacency.entry(p).or_default().push(i);
        adjacency.entry(q).or_default().push(i);
    }

    let mut used = vec![false; segs.len()];
    let mut chains = Vec::new();

    let walk = |start: NodeKey, used: &mut [bool]| -> Option<(Vec<NodeKey>, bool)> {
        let mut keys = vec![start];
        let mut cur = start;
        while let Some(&s) = adjacency
            .get(&cur)
            .and_then(|list| list.iter().find(|&&s| !used[s]))
        {
            used[s] = true;
            let (p, q) = segs[s];
            cur = if p == cur { q } else { p };
            keys.push(cur);
            if cur == start {
                break;
            }
        }
        if keys.len() < 2 {
            return None;
        }
        let closed = keys.len() > 3 && keys.last() == Some(&start);
        if closed {
            keys.pop();
        }
        Some((keys, closed))
    };

    let mut odd: Vec<NodeKey> = adjacency
        .iter()
        .filter(|(_, list)| list.len() % 2 == 1)
        .map(|(&k, _)| k)
        .collect();
    odd.sort();

    for start in odd {
        while let Some(chain) = walk(start, &mut used) {
            chains.push(chain);
        }
    }
    for i in 0..segs.len() {
        if !used[i] {
            if let Some(chain) = walk(segs[i].0, &mut used) {
                chains.push(chain);
            }
        }
    }
    chains
}

/// Labels along the longest line: between 1 and `max_labels` points at even
/// arc-length intervals.
fn place_labels(lines: &[Polyline], interval: f64, max_labels: usize) -> Vec<LabelPoint> {
    let Some((line, length)) = lines
        .iter()
        .map(|l| (l, l.length()))
        .max_by(|a, b| a.1.total_cmp(&b.1))
    else {
        return vec![];
    };
    if !(length > 0.0) {
        return vec![];
    }

    let n = ((length / interval).floor() as usize).clamp(1, max_labels.max(1));
    let points = line.walk();
    let mut labels = Vec::with_capacity(n);

    let mut travelled = 0.0;
    let mut next = 1;
    for w in points.windows(2) {
        let (p, q) = (w[0], w[1]);
        let seg = p.distance(&q);
        while next <= n && travelled + seg >= length * next as f64 / (n + 1) as f64 {
            let target = length * next as f64 / (n + 1) as f64;
            let t = if seg > 0.0 { (target - travelled) / seg } else { 0.0 };
            labels.push(LabelPoint {
                x: p.x + t * (q.x - p.x),
                y: p.y + t * (q.y - p.y),
                angle_degrees: upright_angle((q.y - p.y).atan2(q.x - p.x).to_degrees()),
            });
            next += 1;
        }
        travelled += seg;
    }
    labels
}

/// Fold an angle in degrees into `[-90, 90]`.
fn upright_angle(mut angle: f64) -> f64 {
    while angle > 90.0 {
        angle -= 180.0;
    }
    while angle < -90.0 {
        angle += 180.0;
    }
    angle
}
