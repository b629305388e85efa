//! Planar Geometry Primitives
//!
//! Convex hull (Graham scan) and Heron triangle areas, used to measure the
//! spatial spread of fixations in visual-angle space.

use std::cmp::Ordering;

/// Point in 2D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate Euclidean distance to another point
    pub fn distance_to(&self, other: &Point2) -> f64 {
        self.squared_distance_to(other).sqrt()
    }

    /// Squared Euclidean distance, enough for ordering
    pub fn squared_distance_to(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Polar angle of this point seen from `origin` (radians)
    pub fn polar_angle_from(&self, origin: &Point2) -> f64 {
        (self.y - origin.y).atan2(self.x - origin.x)
    }
}

/// Cross product of `(b - a) × (c - a)`; positive for a left turn
pub fn turn(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Triangle area from its side lengths (Heron's formula).
///
/// Rounding on near-degenerate triangles can push the radicand slightly
/// below zero; it is clamped so collinear points give 0 instead of `NaN`.
pub fn heron_area(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    let ab = a.distance_to(b);
    let bc = b.distance_to(c);
    let ca = c.distance_to(a);
    let p = (ab + bc + ca) / 2.0;
    (p * (p - ab) * (p - bc) * (p - ca)).max(0.0).sqrt()
}

/// Area of a polygon as a fan of triangles from its first vertex
pub fn fan_area(polygon: &[Point2]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let anchor = &polygon[0];
    polygon[1..]
        .windows(2)
        .map(|w| heron_area(anchor, &w[0], &w[1]))
        .sum()
}

/// Lowest-y point, ties broken by lowest x
fn lowest_point(points: &[Point2]) -> Option<Point2> {
    points.iter().copied().min_by(|a, b| {
        a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x))
    })
}

/// Order two points by polar angle around `anchor`, then by distance
fn compare_around(anchor: &Point2, a: &Point2, b: &Point2) -> Ordering {
    a.polar_angle_from(anchor)
        .total_cmp(&b.polar_angle_from(anchor))
        .then_with(|| {
            a.squared_distance_to(anchor)
                .total_cmp(&b.squared_distance_to(anchor))
        })
}

/// Convex hull by Graham scan.
///
/// The anchor is the lowest-y (then lowest-x) point; the remaining points
/// are swept by increasing polar angle around it, nearer points first on
/// equal angles, and any point that does not make a strict left turn is
/// backtracked. The hull is returned counter-clockwise starting at the
/// anchor. Inputs with fewer than 3 points are returned as-is.
pub fn graham_scan(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let Some(anchor) = lowest_point(points) else {
        return Vec::new();
    };

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| compare_around(&anchor, a, b));
    if let Some(pos) = sorted.iter().position(|p| *p == anchor) {
        sorted.remove(pos);
    }

    let mut hull = vec![anchor, sorted[0]];
    for s in &sorted[1..] {
        while hull.len() >= 2 && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], s) <= 0.0 {
            hull.pop();
        }
        hull.push(*s);
    }
    hull
}
