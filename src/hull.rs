//! Convex hull (Graham scan) and point-in-hull containment

use crate::geometry::{angle_between, bounds, ccw, distance_squared, point_in_polygon, Point};

/// Convex hull of a point set, counter-clockwise, implicitly closed.
///
/// Fewer than 3 points come back unchanged. Collinear boundary points are
/// kept. Duplicate and non-finite points are dropped before the scan.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut unique: Vec<Point> = Vec::with_capacity(points.len());
    for p in points.iter().filter(|p| p.is_finite()) {
        if !unique.contains(p) {
            unique.push(*p);
        }
    }
    if unique.len() < 3 {
        return unique;
    }

    // Pivot: lowest y, then lowest x
    let mut pivot_idx = 0;
    for (i, p) in unique.iter().enumerate().skip(1) {
        let best = unique[pivot_idx];
        if p.y < best.y || (p.y == best.y && p.x < best.x) {
            pivot_idx = i;
        }
    }
    let pivot = unique.swap_remove(pivot_idx);

    // Polar order around the pivot; everything lies on or above its
    // horizontal ray so angles fall in [0, pi]. Equal angles: nearer first.
    let mut keyed: Vec<(f64, f64, Point)> = unique
        .into_iter()
        .map(|p| (angle_between(&pivot, &p), distance_squared(&pivot, &p), p))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut stack: Vec<Point> = Vec::with_capacity(keyed.len() + 1);
    stack.push(pivot);
    for (_, _, p) in keyed {
        while stack.len() >= 2 && ccw(&stack[stack.len() - 2], &stack[stack.len() - 1], &p) < 0.0 {
            stack.pop();
        }
        stack.push(p);
    }

    stack
}

/// A computed hull that can answer containment queries
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hull {
    points: Vec<Point>,
}

impl Hull {
    pub fn from_points(points: &[Point]) -> Self {
        Self {
            points: convex_hull(points),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Fewer than 3 boundary points enclose nothing
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }

    /// Ray-crossing containment; degenerate hulls contain nothing
    pub fn contains(&self, p: &Point) -> bool {
        if self.is_degenerate() {
            return false;
        }
        match bounds(&self.points) {
            Some((min, max)) if p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y => {
                point_in_polygon(p, &self.points)
            },
            _ => false,
        }
    }
}
