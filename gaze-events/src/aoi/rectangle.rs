//! Rectangular AOI cells

use serde::Serialize;
use tracing::warn;

/// Axis-aligned rectangle, possibly unbounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rectangle {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl Rectangle {
    /// Build from two corners in any order
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        if x0 == x1 || y0 == y1 {
            warn!(x0, x1, y0, y1, "Rectangle has zero area");
        }
        Self {
            x0: x0.min(x1),
            x1: x0.max(x1),
            y0: y0.min(y1),
            y1: y0.max(y1),
        }
    }

    /// Catch-all rectangle covering the whole plane
    pub fn unbounded() -> Self {
        Self {
            x0: f64::NEG_INFINITY,
            x1: f64::INFINITY,
            y0: f64::NEG_INFINITY,
            y1: f64::INFINITY,
        }
    }

    /// Interval containment on both axes.
    ///
    /// The lower bound is always exclusive; the upper bound is inclusive
    /// only with `include_border`.
    pub fn includes(&self, x: f64, y: f64, include_border: bool) -> bool {
        between(x, self.x0, self.x1, include_border) && between(y, self.y0, self.y1, include_border)
    }

    pub fn area(&self) -> f64 {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }
}

fn between(v: f64, min: f64, max: f64, include_border: bool) -> bool {
    if include_border {
        v > min && v <= max
    } else {
        v > min && v < max
    }
}

/// Id (1-based position) of the first rectangle containing the point
pub fn locate(rectangles: &[Rectangle], x: f64, y: f64, include_border: bool) -> Option<u32> {
    rectangles
        .iter()
        .position(|r| r.includes(x, y, include_border))
        .map(|i| i as u32 + 1)
}
