//! Drawing target abstraction and its two implementations

use super::curve::{closed_catmull_rom, SEGMENTS_PER_SPAN};
use crate::color::Color;
use crate::display::PixelBuffer;
use crate::geometry::Point;

/// What the renderer needs from a raster.
/// Colors carry their opacity in the alpha channel.
pub trait Surface {
    fn clear(&mut self, color: Color);
    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Color);
    fn stroke_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Color);
    fn line(&mut self, from: Point, to: Point, color: Color);
    /// Smooth closed curve through `points`, filled
    fn fill_closed_curve(&mut self, points: &[Point], color: Color);
    /// Smooth closed curve through `points`, outlined
    fn stroke_closed_curve(&mut self, points: &[Point], color: Color);
}

fn flatten(points: &[Point]) -> Vec<(f32, f32)> {
    closed_catmull_rom(points, SEGMENTS_PER_SPAN)
        .iter()
        .map(Point::as_f32)
        .collect()
}

impl Surface for PixelBuffer {
    fn clear(&mut self, c: Color) {
        self.clear_rgba(c.r, c.g, c.b, c.a);
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, c: Color) {
        let (x, y) = center.as_f32();
        self.fill_ellipse_blend(x, y, rx as f32, ry as f32, c.r, c.g, c.b, c.a);
    }

    fn stroke_ellipse(&mut self, center: Point, rx: f64, ry: f64, c: Color) {
        let (x, y) = center.as_f32();
        self.stroke_ellipse_blend(x, y, rx as f32, ry as f32, c.r, c.g, c.b, c.a);
    }

    fn line(&mut self, from: Point, to: Point, c: Color) {
        let (x0, y0) = from.as_f32();
        let (x1, y1) = to.as_f32();
        self.line_aa(x0, y0, x1, y1, c.r, c.g, c.b, c.a);
    }

    fn fill_closed_curve(&mut self, points: &[Point], c: Color) {
        self.fill_polygon_blend(&flatten(points), c.r, c.g, c.b, c.a);
    }

    fn stroke_closed_curve(&mut self, points: &[Point], c: Color) {
        self.polyline_closed_aa(&flatten(points), c.r, c.g, c.b, c.a);
    }
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    FillEllipse { center: Point, rx: f64, ry: f64, color: Color },
    StrokeEllipse { center: Point, rx: f64, ry: f64, color: Color },
    Line { from: Point, to: Point, color: Color },
    FillCurve { points: Vec<Point>, color: Color },
    StrokeCurve { points: Vec<Point>, color: Color },
}

impl DrawOp {
    /// Every point the call references
    pub fn points(&self) -> Vec<Point> {
        match self {
            Self::Clear(_) => Vec::new(),
            Self::FillEllipse { center, .. } | Self::StrokeEllipse { center, .. } => vec![*center],
            Self::Line { from, to, .. } => vec![*from, *to],
            Self::FillCurve { points, .. } | Self::StrokeCurve { points, .. } => points.clone(),
        }
    }
}

/// Surface that records calls instead of rasterizing
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    ops: Vec<DrawOp>,
}

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn reset(&mut self) {
        self.ops.clear();
    }

    /// Centers of all filled ellipses, in draw order
    pub fn ellipse_centers(&self) -> Vec<Point> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillEllipse { center, .. } => Some(*center),
                _ => None,
            })
            .collect()
    }

    /// Whether any call referenced `p`
    pub fn touches(&self, p: Point) -> bool {
        self.ops.iter().any(|op| op.points().contains(&p))
    }
}

impl Surface for DrawLog {
    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Color) {
        self.ops.push(DrawOp::FillEllipse { center, rx, ry, color });
    }

    fn stroke_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Color) {
        self.ops.push(DrawOp::StrokeEllipse { center, rx, ry, color });
    }

    fn line(&mut self, from: Point, to: Point, color: Color) {
        self.ops.push(DrawOp::Line { from, to, color });
    }

    fn fill_closed_curve(&mut self, points: &[Point], color: Color) {
        self.ops.push(DrawOp::FillCurve { points: points.to_vec(), color });
    }

    fn stroke_closed_curve(&mut self, points: &[Point], color: Color) {
        self.ops.push(DrawOp::StrokeCurve { points: points.to_vec(), color });
    }
}
