//! Branch growth: blobs, strokes and the stroke state machine
//!
//! A stroke is a sliding window of blobs seeded along the brush path. Every
//! tick each blob pushes its leaves one generation outward; growth slows as
//! the blob ages and stops once it outlives its lifespan ("the paint dries").

use crate::config::ConfigError;
use crate::geometry::Point;
use crate::tool::{branch_count, step_rotation, Tool};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::f64::consts::TAU;
use tracing::{debug, trace};

/// Growth limits shared by every stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Generations a blob grows before it dries
    pub lifespan: u32,
    /// Blobs kept in a stroke's sliding window
    pub max_blobs: usize,
}

impl GrowthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lifespan == 0 {
            return Err(ConfigError::invalid("growth.lifespan", "must be at least 1"));
        }
        if self.max_blobs == 0 {
            return Err(ConfigError::invalid("growth.max_blobs", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            lifespan: 24,
            max_blobs: 12,
        }
    }
}

// ============================================================================
// Blob
// ============================================================================

/// One cluster of growing branch tips
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    center: Point,
    leaves: Vec<Point>,
    /// Previous generation's leaves
    previous: Vec<Point>,
    /// `parent_index[i]` is the position in `previous` leaf `i` grew from
    parent_index: Vec<usize>,
    generation: u32,
}

impl Blob {
    /// A fresh blob with `branches` leaves sitting on its center
    pub fn new(center: Point, branches: usize) -> Self {
        Self {
            center,
            leaves: vec![center; branches],
            previous: Vec::new(),
            parent_index: Vec::new(),
            generation: 0,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn leaves(&self) -> &[Point] {
        &self.leaves
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// True once the blob stopped contributing leaves
    pub fn is_dry(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Parent of leaf `i`, if it has one
    pub fn parent_of(&self, i: usize) -> Option<Point> {
        let idx = *self.parent_index.get(i)?;
        self.previous.get(idx).copied()
    }

    /// (leaf, parent) segments of the latest generation
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.leaves
            .iter()
            .enumerate()
            .filter_map(move |(i, leaf)| self.parent_of(i).map(|parent| (*leaf, parent)))
    }

    /// Advance one generation.
    ///
    /// `drip` scales the step; the step also tapers to zero as the
    /// generation approaches `lifespan`. Past the lifespan the blob dries up.
    pub fn grow<R: Rng + ?Sized>(&mut self, tool: &Tool, drip: f64, lifespan: u32, rng: &mut R) {
        if self.generation > lifespan {
            self.dry_up();
            return;
        }
        self.generation += 1;

        let taper = if lifespan == 0 {
            0.0
        } else {
            (1.0 - (self.generation as f64).sqrt() / (lifespan as f64).sqrt()).max(0.0)
        };
        let step = tool.params().branch_length * drip * taper;
        let rotation = step_rotation(tool, rng);

        let n = self.leaves.len();
        if n == 0 {
            return;
        }
        let spread = TAU / n as f64;
        let wander = 1.0 - tool.params().branch_straightness;

        let grown: Vec<Point> = self
            .leaves
            .iter()
            .enumerate()
            .map(|(i, leaf)| {
                let angle = i as f64 * spread + rotation + wander * rng.gen::<f64>() * TAU;
                *leaf + Point::polar(angle, step)
            })
            .collect();

        self.previous = std::mem::replace(&mut self.leaves, grown);
        self.parent_index = (0..n).collect();
    }

    fn dry_up(&mut self) {
        self.leaves.clear();
        self.previous.clear();
        self.parent_index.clear();
    }
}

/// Growth scale for the blob at `index` of `count`: later blobs drip more
#[inline]
pub fn drip_amount(index: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let t = (index + 1) as f64 / count as f64;
    t * t
}

// ============================================================================
// Stroke
// ============================================================================

/// Blobs laid down by one continuous gesture, oldest first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stroke {
    blobs: VecDeque<Blob>,
    ticks: u64,
    evicted: u64,
}

impl Stroke {
    fn starting_at(blob: Blob) -> Self {
        let mut blobs = VecDeque::new();
        blobs.push_back(blob);
        Self {
            blobs,
            ticks: 0,
            evicted: 0,
        }
    }

    pub fn blobs(&self) -> impl ExactSizeIterator<Item = &Blob> + DoubleEndedIterator {
        self.blobs.iter()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn last(&self) -> Option<&Blob> {
        self.blobs.back()
    }

    /// Ticks grown so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Blobs that slid out of the window
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

}

// ============================================================================
// Growth model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthState {
    Idle,
    Growing,
}

/// Owns the active stroke and drives its growth
#[derive(Debug, Clone)]
pub struct GrowthModel {
    config: GrowthConfig,
    state: GrowthState,
    stroke: Option<Stroke>,
}

impl GrowthModel {
    pub fn new(config: GrowthConfig) -> Self {
        Self {
            config,
            state: GrowthState::Idle,
            stroke: None,
        }
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    pub fn state(&self) -> GrowthState {
        self.state
    }

    pub fn is_growing(&self) -> bool {
        self.state == GrowthState::Growing
    }

    /// The active stroke, or the last one after it stopped
    pub fn stroke(&self) -> Option<&Stroke> {
        self.stroke.as_ref()
    }

    /// Begin a stroke with one blob at `center`.
    /// Returns false (and changes nothing) if a stroke is already growing.
    pub fn start_stroke<R: Rng + ?Sized>(&mut self, center: Point, tool: &Tool, rng: &mut R) -> bool {
        if self.is_growing() {
            return false;
        }
        let blob = Blob::new(center, branch_count(tool, rng));
        debug!(x = center.x, y = center.y, leaves = blob.leaves.len(), "stroke started");
        self.stroke = Some(Stroke::starting_at(blob));
        self.state = GrowthState::Growing;
        true
    }

    /// Grow the active stroke one generation toward `brush`.
    /// Returns false when idle.
    pub fn tick<R: Rng + ?Sized>(&mut self, brush: Point, tool: &Tool, rng: &mut R) -> bool {
        if !self.is_growing() {
            return false;
        }
        let Some(stroke) = self.stroke.as_mut() else {
            return false;
        };

        let moved_far = stroke
            .blobs
            .back()
            .map_or(true, |last| last.center.distance_to(&brush) > tool.spacing());
        if moved_far {
            let blob = Blob::new(brush, branch_count(tool, rng));
            stroke.blobs.push_back(blob);
        }

        while stroke.blobs.len() > self.config.max_blobs.max(1) {
            stroke.blobs.pop_front();
            stroke.evicted += 1;
        }

        let count = stroke.blobs.len();
        let lifespan = self.config.lifespan;
        for (i, blob) in stroke.blobs.iter_mut().enumerate() {
            blob.grow(tool, drip_amount(i, count), lifespan, rng);
        }
        stroke.ticks += 1;

        trace!(blobs = count, ticks = stroke.ticks, "stroke tick");
        true
    }

    /// End the active stroke. Returns false if nothing was growing.
    pub fn stop_stroke(&mut self) -> bool {
        if !self.is_growing() {
            return false;
        }
        self.state = GrowthState::Idle;
        if let Some(stroke) = &self.stroke {
            debug!(ticks = stroke.ticks, evicted = stroke.evicted, "stroke stopped");
        }
        true
    }
}

impl Default for GrowthModel {
    fn default() -> Self {
        Self::new(GrowthConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hull::Hull;
    use crate::tool::{Opacities, ToolParams};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tool_with(branches_max: u32, branch_length: f64) -> Tool {
        Tool::new(
            ToolParams {
                branches_max,
                branches_variety: 0.0,
                branch_length,
                branch_straightness: 0.5,
                rotation: 0.25,
                ..ToolParams::default()
            },
            Opacities {
                edges: 1.0,
                ..Opacities::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_drip_amount() {
        assert_eq!(drip_amount(0, 1), 1.0);
        assert_eq!(drip_amount(0, 2), 0.25);
        assert_eq!(drip_amount(1, 2), 1.0);
        assert_eq!(drip_amount(0, 0), 0.0);
    }

    #[test]
    fn test_single_leaf_first_step() {
        let config = GrowthConfig {
            lifespan: 16,
            max_blobs: 4,
        };
        let tool = tool_with(1, 10.0);
        let mut model = GrowthModel::new(config);
        let mut rng = StdRng::seed_from_u64(1234);

        assert!(model.start_stroke(Point::ORIGIN, &tool, &mut rng));
        assert!(model.tick(Point::ORIGIN, &tool, &mut rng));

        let stroke = model.stroke().unwrap();
        assert_eq!(stroke.len(), 1);
        let blob = stroke.last().unwrap();
        assert_eq!(blob.generation(), 1);
        assert_eq!(blob.leaves().len(), 1);

        let expected = 10.0 * drip_amount(0, 1) * (1.0 - 1.0 / 16f64.sqrt());
        let leaf = blob.leaves()[0];
        assert!((leaf.distance_to(&Point::ORIGIN) - expected).abs() < 1e-9);

        // Replay the draws: branch count, step rotation, per-leaf wander
        let mut replay = StdRng::seed_from_u64(1234);
        let _count: f64 = replay.gen();
        let rotation = 0.25 * replay.gen::<f64>() * TAU;
        let angle = rotation + 0.5 * replay.gen::<f64>() * TAU;
        let want = Point::polar(angle, expected);
        assert!((leaf.x - want.x).abs() < 1e-9 && (leaf.y - want.y).abs() < 1e-9);

        assert_eq!(blob.parent_of(0), Some(Point::ORIGIN));
    }

    #[test]
    fn test_blob_dries_after_lifespan() {
        let tool = tool_with(4, 5.0);
        let mut rng = StdRng::seed_from_u64(9);
        let mut blob = Blob::new(Point::new(10.0, 10.0), 4);
        for _ in 0..=3 {
            blob.grow(&tool, 1.0, 3, &mut rng);
        }
        assert_eq!(blob.generation(), 4);
        assert!(!blob.is_dry());

        blob.grow(&tool, 1.0, 3, &mut rng);
        assert!(blob.is_dry());
        assert_eq!(blob.edges().count(), 0);

        // Further growth is a no-op
        blob.grow(&tool, 1.0, 3, &mut rng);
        assert!(blob.leaves().is_empty());
        assert_eq!(blob.generation(), 4);
    }

    #[test]
    fn test_step_never_negative_at_lifespan() {
        let tool = tool_with(3, 5.0);
        let mut rng = StdRng::seed_from_u64(2);
        let mut blob = Blob::new(Point::ORIGIN, 3);
        for _ in 0..4 {
            blob.grow(&tool, 1.0, 4, &mut rng);
        }
        let before = blob.leaves().to_vec();
        // generation 4 -> 5 would taper below zero; clamped to no movement
        blob.grow(&tool, 1.0, 4, &mut rng);
        assert_eq!(blob.leaves(), &before[..]);
    }

    #[test]
    fn test_start_is_idempotent() {
        let tool = tool_with(3, 5.0);
        let mut rng = StdRng::seed_from_u64(77);
        let mut model = GrowthModel::default();
        assert!(model.start_stroke(Point::new(1.0, 1.0), &tool, &mut rng));
        let snapshot = model.stroke().cloned();
        assert!(!model.start_stroke(Point::new(50.0, 50.0), &tool, &mut rng));
        assert_eq!(model.stroke().cloned(), snapshot);
        assert_eq!(model.state(), GrowthState::Growing);
    }

    #[test]
    fn test_idle_tick_and_stop_are_noops() {
        let tool = tool_with(3, 5.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut model = GrowthModel::default();
        assert!(!model.tick(Point::ORIGIN, &tool, &mut rng));
        assert!(!model.stop_stroke());
        assert!(model.stroke().is_none());

        model.start_stroke(Point::ORIGIN, &tool, &mut rng);
        assert!(model.stop_stroke());
        assert!(!model.stop_stroke());
        assert_eq!(model.state(), GrowthState::Idle);
        assert!(!model.tick(Point::ORIGIN, &tool, &mut rng));
    }

    #[test]
    fn test_spacing_seeds_blobs_and_window_evicts() {
        let config = GrowthConfig {
            lifespan: 10,
            max_blobs: 3,
        };
        let tool = tool_with(2, 4.0);
        let mut rng = StdRng::seed_from_u64(5);
        let mut model = GrowthModel::new(config);
        model.start_stroke(Point::ORIGIN, &tool, &mut rng);

        // Within spacing: no new blob
        model.tick(Point::new(tool.spacing() * 0.5, 0.0), &tool, &mut rng);
        assert_eq!(model.stroke().unwrap().len(), 1);

        for i in 1..=3 {
            model.tick(Point::new(i as f64 * 100.0, 0.0), &tool, &mut rng);
        }
        let stroke = model.stroke().unwrap();
        assert_eq!(stroke.len(), 3);
        assert_eq!(stroke.evicted(), 1);
        assert_eq!(stroke.blobs().next().unwrap().center(), Point::new(100.0, 0.0));
        assert_eq!(stroke.ticks(), 4);
    }

    #[test]
    fn test_restart_reproduces_geometry() {
        let tool = tool_with(5, 6.0);
        let path: Vec<Point> = (0..20).map(|i| Point::new(i as f64 * 7.0, (i as f64).sin() * 20.0)).collect();

        let run = |model: &mut GrowthModel| {
            let mut rng = StdRng::seed_from_u64(31337);
            model.start_stroke(path[0], &tool, &mut rng);
            for p in &path {
                model.tick(*p, &tool, &mut rng);
            }
            model.stop_stroke();
            model.stroke().cloned().unwrap()
        };

        let mut model = GrowthModel::default();
        let first = run(&mut model);
        let second = run(&mut model);
        assert_eq!(first, second);
    }

    #[test]
    fn test_spoked_blob_hull_rings_center() {
        // Straight, untwisted spokes spread evenly around the center
        let tool = Tool::new(
            ToolParams {
                branches_max: 6,
                branches_variety: 0.0,
                branch_length: 10.0,
                branch_straightness: 1.0,
                rotation: 0.0,
                ..ToolParams::default()
            },
            Opacities {
                hull_fill: 1.0,
                ..Opacities::default()
            },
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let mut model = GrowthModel::default();
        model.start_stroke(Point::new(50.0, 50.0), &tool, &mut rng);
        for _ in 0..5 {
            model.tick(Point::new(50.0, 50.0), &tool, &mut rng);
        }
        let hull = Hull::from_points(model.stroke().unwrap().last().unwrap().leaves());
        assert!(!hull.is_degenerate());
        assert!(hull.contains(&Point::new(50.0, 50.0)));
        assert!(!hull.contains(&Point::new(500.0, 500.0)));
    }
}
