//! Tools: immutable bundles of growth and rendering parameters
//!
//! A tool decides how a stroke branches (count, length, straightness,
//! rotation), how its blobs are drawn (sizes, squash) and how much ink each
//! drawing pass gets. The per-pass opacities always form a partition of
//! unity, so every tool lays down a comparable amount of paint per blob.

use crate::color::{self, Color};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use thiserror::Error;

/// Distance the brush must travel before a new blob is seeded,
/// as a fraction of the branch length.
pub const SPACING_FACTOR: f64 = 0.75;

const BRANCHES_MAX_RANGE: (u32, u32) = (1, 12);
const BRANCH_LENGTH_RANGE: (f64, f64) = (2.0, 24.0);
const COLOR_VARIATION_RANGE: (f64, f64) = (0.0, 0.6);
const CENTER_SIZE_RANGE: (f64, f64) = (2.0, 16.0);
const VERTICES_SIZE_RANGE: (f64, f64) = (1.0, 6.0);
/// Chance that a drawing pass is switched off entirely for a random tool
const PASS_OFF_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("branch_length must be positive, got {0}")]
    NonPositiveLength(f64),
    #[error("branches_max must be at least 1")]
    NoBranches,
    #[error("opacity {field} must be non-negative, got {value}")]
    NegativeOpacity { field: &'static str, value: f64 },
    #[error("all opacities are zero; the tool would lay down no ink")]
    NoInk,
}

/// Shape parameters of a tool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolParams {
    pub color: Color,
    /// How far each drawn shade may drift from `color`, [0, 1]
    pub color_variation: f64,
    pub branches_max: u32,
    /// Fraction of `branches_max` a new blob may lose, [0, 1]
    pub branches_variety: f64,
    pub branch_length: f64,
    /// 1 grows straight spokes, 0 wanders freely, [0, 1]
    pub branch_straightness: f64,
    /// Shared per-step twist, [-1, 1]
    pub rotation: f64,
    pub center_size: f64,
    pub center_squash_variety: f64,
    pub vertices_size: f64,
    pub vertices_squash_variety: f64,
}

impl Default for ToolParams {
    fn default() -> Self {
        Self {
            color: Color::rgb(40, 90, 200),
            color_variation: 0.2,
            branches_max: 5,
            branches_variety: 0.3,
            branch_length: 8.0,
            branch_straightness: 0.6,
            rotation: 0.1,
            center_size: 6.0,
            center_squash_variety: 0.3,
            vertices_size: 2.0,
            vertices_squash_variety: 0.3,
        }
    }
}

/// Per-pass ink budget
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Opacities {
    pub center_fill: f64,
    pub center_stroke: f64,
    pub edges: f64,
    pub vertices: f64,
    pub vertices_stroke: f64,
    pub hull_fill: f64,
    pub hull_stroke: f64,
}

impl Opacities {
    const NAMES: [&'static str; 7] = [
        "center_fill",
        "center_stroke",
        "edges",
        "vertices",
        "vertices_stroke",
        "hull_fill",
        "hull_stroke",
    ];

    pub fn as_array(&self) -> [f64; 7] {
        [
            self.center_fill,
            self.center_stroke,
            self.edges,
            self.vertices,
            self.vertices_stroke,
            self.hull_fill,
            self.hull_stroke,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            center_fill: self.center_fill * factor,
            center_stroke: self.center_stroke * factor,
            edges: self.edges * factor,
            vertices: self.vertices * factor,
            vertices_stroke: self.vertices_stroke * factor,
            hull_fill: self.hull_fill * factor,
            hull_stroke: self.hull_stroke * factor,
        }
    }

    /// Rescale so the fields sum to 1
    pub fn normalized(&self) -> Result<Self, ToolError> {
        for (value, field) in self.as_array().into_iter().zip(Self::NAMES) {
            if !value.is_finite() {
                return Err(ToolError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(ToolError::NegativeOpacity { field, value });
            }
        }
        let sum = self.sum();
        if sum <= 0.0 {
            return Err(ToolError::NoInk);
        }
        Ok(self.scaled(1.0 / sum))
    }
}

/// A validated, immutable tool
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tool {
    params: ToolParams,
    opacity: Opacities,
    spacing: f64,
}

impl Tool {
    /// Validate `params` and normalize `opacity` into a partition of unity
    pub fn new(params: ToolParams, opacity: Opacities) -> Result<Self, ToolError> {
        validate(&params)?;
        let opacity = opacity.normalized()?;
        Ok(Self {
            params,
            opacity,
            spacing: params.branch_length * SPACING_FACTOR,
        })
    }

    /// Sample a fresh random tool
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        ToolGenerator::default().generate(rng)
    }

    pub fn params(&self) -> &ToolParams {
        &self.params
    }

    pub fn opacity(&self) -> &Opacities {
        &self.opacity
    }

    pub fn color(&self) -> Color {
        self.params.color
    }

    /// Brush travel needed before a new blob is seeded
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Same tool painting in another color
    pub fn with_color(&self, color: Color) -> Self {
        let mut tool = *self;
        tool.params.color = color;
        tool
    }
}

impl Default for Tool {
    fn default() -> Self {
        let params = ToolParams::default();
        Self {
            params,
            opacity: Opacities {
                center_fill: 0.3,
                center_stroke: 0.05,
                edges: 0.25,
                vertices: 0.2,
                vertices_stroke: 0.05,
                hull_fill: 0.1,
                hull_stroke: 0.05,
            },
            spacing: params.branch_length * SPACING_FACTOR,
        }
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ToolError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ToolError::NonFinite { field, value })
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ToolError> {
    check_finite(field, value)?;
    if value < min || value > max {
        return Err(ToolError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn validate(p: &ToolParams) -> Result<(), ToolError> {
    if p.branches_max < 1 {
        return Err(ToolError::NoBranches);
    }
    check_finite("branch_length", p.branch_length)?;
    if p.branch_length <= 0.0 {
        return Err(ToolError::NonPositiveLength(p.branch_length));
    }
    check_range("color_variation", p.color_variation, 0.0, 1.0)?;
    check_range("branches_variety", p.branches_variety, 0.0, 1.0)?;
    check_range("branch_straightness", p.branch_straightness, 0.0, 1.0)?;
    check_range("rotation", p.rotation, -1.0, 1.0)?;
    check_range("center_size", p.center_size, 0.0, f64::MAX)?;
    check_range("center_squash_variety", p.center_squash_variety, 0.0, 1.0)?;
    check_range("vertices_size", p.vertices_size, 0.0, f64::MAX)?;
    check_range("vertices_squash_variety", p.vertices_squash_variety, 0.0, 1.0)?;
    Ok(())
}

// ============================================================================
// Generator
// ============================================================================

/// Samples random tools, optionally biased toward a curated hue set
#[derive(Debug, Clone, Default)]
pub struct ToolGenerator {
    pub preferred_hues: Vec<f64>,
}

impl ToolGenerator {
    pub fn new(preferred_hues: Vec<f64>) -> Self {
        Self { preferred_hues }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Tool {
        let hues = (!self.preferred_hues.is_empty()).then_some(self.preferred_hues.as_slice());
        let params = ToolParams {
            color: color::generate(None, 0.0, hues, rng),
            color_variation: rng.gen_range(COLOR_VARIATION_RANGE.0..=COLOR_VARIATION_RANGE.1),
            branches_max: rng.gen_range(BRANCHES_MAX_RANGE.0..=BRANCHES_MAX_RANGE.1),
            branches_variety: rng.gen(),
            branch_length: rng.gen_range(BRANCH_LENGTH_RANGE.0..=BRANCH_LENGTH_RANGE.1),
            branch_straightness: rng.gen(),
            rotation: rng.gen_range(-1.0..=1.0),
            center_size: rng.gen_range(CENTER_SIZE_RANGE.0..=CENTER_SIZE_RANGE.1),
            center_squash_variety: rng.gen(),
            vertices_size: rng.gen_range(VERTICES_SIZE_RANGE.0..=VERTICES_SIZE_RANGE.1),
            vertices_squash_variety: rng.gen(),
        };

        let raw = raw_opacities(&params, rng);
        // Sampled params are in range by construction; only an all-zero
        // budget can fail, and that falls back to a plain center dab.
        Tool::new(params, raw).unwrap_or_else(|_| Tool {
            params,
            opacity: Opacities {
                center_fill: 1.0,
                ..Opacities::default()
            },
            spacing: params.branch_length * SPACING_FACTOR,
        })
    }
}

/// Ink per pass before normalization, shaped by the tool's geometry
fn raw_opacities<R: Rng + ?Sized>(p: &ToolParams, rng: &mut R) -> Opacities {
    let mut pass = |weight: f64| {
        if rng.gen_bool(PASS_OFF_CHANCE) {
            0.0
        } else {
            weight.max(0.0) * rng.gen::<f64>()
        }
    };

    let density = (p.branches_max - 1) as f64 / (BRANCHES_MAX_RANGE.1 - 1) as f64;
    let curl = (1.0 - p.branch_straightness) * (1.0 - p.rotation.abs());

    Opacities {
        // Few branches read best as a solid dab
        center_fill: pass(1.0 - density * 0.8),
        center_stroke: pass(0.3),
        // Straight branches read best as spokes
        edges: pass(p.branch_straightness),
        vertices: pass(0.2 + density * 0.8),
        vertices_stroke: pass(0.3),
        // Curly, low-rotation shapes fill out into smooth hulls
        hull_fill: pass(curl),
        hull_stroke: pass(curl * 0.5),
    }
}

/// How many leaves a new blob starts with
pub fn branch_count<R: Rng + ?Sized>(tool: &Tool, rng: &mut R) -> usize {
    let max = tool.params.branches_max as f64;
    let lost = (max * tool.params.branches_variety * rng.gen::<f64>()).floor();
    ((max - lost) as usize).max(1)
}

/// Shared twist applied to all leaves of one growth step
#[inline]
pub fn step_rotation<R: Rng + ?Sized>(tool: &Tool, rng: &mut R) -> f64 {
    tool.params.rotation * rng.gen::<f64>() * TAU
}
