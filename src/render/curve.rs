//! Smooth closed curves through an ordered point list

use crate::geometry::Point;

/// Samples per Catmull-Rom span when flattening
pub const SEGMENTS_PER_SPAN: usize = 8;

/// Flatten a closed Catmull-Rom spline through `points` into a polygon.
///
/// Each span `p1 -> p2` becomes a cubic Bezier with control points
/// `p1 + (p2 - p0) / 6` and `p2 - (p3 - p1) / 6`. The curve passes through
/// every input point. Fewer than 3 points are returned as-is.
pub fn closed_catmull_rom(points: &[Point], segments: usize) -> Vec<Point> {
    let n = points.len();
    if n < 3 || segments == 0 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(n * segments);
    for i in 0..n {
        let p0 = points[(i + n - 1) % n];
        let p1 = points[i];
        let p2 = points[(i + 1) % n];
        let p3 = points[(i + 2) % n];

        let c1 = p1 + (p2 - p0) * (1.0 / 6.0);
        let c2 = p2 - (p3 - p1) * (1.0 / 6.0);

        // t = 1 is the next span's t = 0
        for s in 0..segments {
            let t = s as f64 / segments as f64;
            out.push(cubic_bezier(p1, c1, c2, p2, t));
        }
    }
    out
}

#[inline]
fn cubic_bezier(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    p0 * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + p1 * (t * t * t)
}
