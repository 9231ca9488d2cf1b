//! Geometry utilities: points, angles and polygon tests

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point (or vector) in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle` radians scaled by `length`
    #[inline]
    pub fn polar(angle: f64, length: f64) -> Self {
        Self::new(angle.cos() * length, angle.sin() * length)
    }

    #[inline]
    pub fn distance_to(&self, other: &Point) -> f64 {
        distance_squared(self, other).sqrt()
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Angle of this vector against the +X axis, 0 for a zero-length vector
    #[inline]
    pub fn angle(&self) -> f64 {
        if self.length() > f64::EPSILON {
            self.y.atan2(self.x)
        } else {
            0.0
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// (x, y) pair in the shape the raster primitives take
    #[inline]
    pub fn as_f32(&self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Squared distance between two points (avoids sqrt)
#[inline]
pub fn distance_squared(a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

/// Angle of the vector from `from` to `to`; zero-length vectors give 0
#[inline]
pub fn angle_between(from: &Point, to: &Point) -> f64 {
    (*to - *from).angle()
}

/// Cross product of (p2 - p1) x (p3 - p1).
/// Positive for a counter-clockwise turn, zero when collinear.
#[inline]
pub fn ccw(p1: &Point, p2: &Point, p3: &Point) -> f64 {
    (p2.x - p1.x) * (p3.y - p1.y) - (p2.y - p1.y) * (p3.x - p1.x)
}

/// Check if a point is inside a polygon using ray casting.
///
/// A horizontal ray is cast towards +X and edge crossings are counted;
/// an odd count means inside. Horizontal edges never count as crossings.
pub fn point_in_polygon(p: &Point, vertices: &[Point]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];

        let dy = vj.y - vi.y;
        if dy.abs() > f64::EPSILON && ((vi.y > p.y) != (vj.y > p.y)) {
            let x_intersect = (vj.x - vi.x) * (p.y - vi.y) / dy + vi.x;
            if p.x < x_intersect {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Bounding box (min, max) of a point set
pub fn bounds(points: &[Point]) -> Option<(Point, Point)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}
