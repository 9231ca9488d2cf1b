//! Stroke rendering
//!
//! Every blob is drawn in four passes (hull, edges, vertices, center). A pass
//! runs only when the tool gives it some opacity, and each pass samples its
//! own shade of the tool color.

mod canvas;
mod curve;
mod surface;

pub use canvas::Canvas;
pub use curve::{closed_catmull_rom, SEGMENTS_PER_SPAN};
pub use surface::{DrawLog, DrawOp, Surface};

use crate::color::{self, Color};
use crate::geometry::Point;
use crate::growth::{drip_amount, Blob, Stroke};
use crate::hull::convex_hull;
use crate::tool::Tool;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Hull pass needs more leaves than this
pub const HULL_MIN_LEAVES: usize = 4;

/// Rendering knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Multiplier from tool opacity to alpha
    pub ink_gain: f64,
    /// Draw a blurred drop shadow under each frame's layer
    pub shadow: bool,
    pub shadow_radius: u32,
    /// Shadow displacement in pixels (x, y)
    pub shadow_offset: [i32; 2],
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ink_gain: 0.5,
            shadow: true,
            shadow_radius: 3,
            shadow_offset: [2, 3],
            background: Color::WHITE,
        }
    }
}

/// Draws strokes onto any [`Surface`]
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    ink_gain: f64,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            ink_gain: config.ink_gain,
        }
    }

    /// Draw every blob of `stroke`, fading older blobs by their drip amount
    pub fn render<S, R>(&self, stroke: &Stroke, tool: &Tool, surface: &mut S, rng: &mut R)
    where
        S: Surface + ?Sized,
        R: Rng + ?Sized,
    {
        let n = stroke.len();
        for (i, blob) in stroke.blobs().enumerate() {
            self.render_blob(blob, tool, drip_amount(i, n), surface, rng);
        }
    }

    /// Draw one blob; `drip` scales its ink
    pub fn render_blob<S, R>(&self, blob: &Blob, tool: &Tool, drip: f64, surface: &mut S, rng: &mut R)
    where
        S: Surface + ?Sized,
        R: Rng + ?Sized,
    {
        let params = tool.params();
        let op = tool.opacity();
        let leaves = blob.leaves();

        // (a) hull
        if leaves.len() > HULL_MIN_LEAVES && (op.hull_fill > 0.0 || op.hull_stroke > 0.0) {
            let shade = self.shade(tool, rng);
            let hull = convex_hull(leaves);
            if hull.len() >= 3 {
                if op.hull_fill > 0.0 {
                    surface.fill_closed_curve(&hull, self.ink(shade, op.hull_fill, drip));
                }
                if op.hull_stroke > 0.0 {
                    surface.stroke_closed_curve(&hull, self.ink(shade, op.hull_stroke, drip));
                }
            }
        }

        // (b) edges
        if op.edges > 0.0 && !leaves.is_empty() {
            let ink = self.ink(self.shade(tool, rng), op.edges, drip);
            for (leaf, parent) in blob.edges() {
                surface.line(parent, leaf, ink);
            }
        }

        // (c) vertices
        if (op.vertices > 0.0 || op.vertices_stroke > 0.0) && !leaves.is_empty() {
            let shade = self.shade(tool, rng);
            for leaf in leaves {
                let (rx, ry) = squashed_radii(params.vertices_size, params.vertices_squash_variety, rng);
                if op.vertices > 0.0 {
                    surface.fill_ellipse(*leaf, rx, ry, self.ink(shade, op.vertices, drip));
                }
                if op.vertices_stroke > 0.0 {
                    surface.stroke_ellipse(*leaf, rx, ry, self.ink(shade, op.vertices_stroke, drip));
                }
            }
        }

        // (d) center
        if op.center_fill > 0.0 || op.center_stroke > 0.0 {
            let shade = self.shade(tool, rng);
            let (rx, ry) = squashed_radii(params.center_size, params.center_squash_variety, rng);
            let center: Point = blob.center();
            if op.center_fill > 0.0 {
                surface.fill_ellipse(center, rx, ry, self.ink(shade, op.center_fill, drip));
            }
            if op.center_stroke > 0.0 {
                surface.stroke_ellipse(center, rx, ry, self.ink(shade, op.center_stroke, drip));
            }
        }
    }

    fn shade<R: Rng + ?Sized>(&self, tool: &Tool, rng: &mut R) -> Color {
        color::generate(Some(tool.color()), tool.params().color_variation, None, rng)
    }

    /// Shade with its alpha set from a pass opacity
    fn ink(&self, shade: Color, opacity: f64, drip: f64) -> Color {
        let alpha = (opacity * self.ink_gain * drip).clamp(0.0, 1.0);
        shade.with_alpha((alpha * 255.0).round() as u8)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

/// Radius `size * [0.5, 1)`, one axis squashed by up to `variety`
fn squashed_radii<R: Rng + ?Sized>(size: f64, variety: f64, rng: &mut R) -> (f64, f64) {
    let rx = size * rng.gen_range(0.5..1.0);
    let ry = rx * (1.0 - variety * rng.gen::<f64>());
    (rx, ry)
}
