//! Brush position smoothing between ticks

use crate::geometry::Point;
use std::collections::VecDeque;

/// Moving average over the last `window` brush samples
#[derive(Debug, Clone)]
pub struct BrushSmoother {
    samples: VecDeque<Point>,
    window: usize,
}

impl BrushSmoother {
    /// `window` is clamped to at least 1 (no smoothing)
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            samples: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Add a raw sample; non-finite points are dropped
    pub fn push(&mut self, p: Point) {
        if !p.is_finite() {
            return;
        }
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(p);
    }

    /// Smoothed position, if any sample arrived since the last reset
    pub fn position(&self) -> Option<Point> {
        if self.samples.is_empty() {
            return None;
        }
        let sum = self.samples.iter().fold(Point::ORIGIN, |acc, p| acc + *p);
        Some(sum * (1.0 / self.samples.len() as f64))
    }

    /// Forget history, e.g. when the brush lifts
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}
