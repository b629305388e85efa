//! Uniform AOI Grid
//!
//! Splits the screen `[0, width] × [0, height]` into `cols × rows` equal
//! cells numbered row-major from 1. Everything off-screen maps to one
//! catch-all cell with id `cols * rows + 1`.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::rectangle::{self, Rectangle};
use crate::types::Sample;
use crate::{Error, Result};

/// Uniform grid of areas of interest
#[derive(Debug, Clone, Serialize)]
pub struct AoiGrid {
    cols: usize,
    rows: usize,
    width: f64,
    height: f64,
    /// Left boundary of every column
    xs: Vec<f64>,
    /// Top boundary of every row
    ys: Vec<f64>,
}

impl AoiGrid {
    pub fn new(cols: usize, rows: usize, width: f64, height: f64) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(Error::Config(format!(
                "AOI grid needs at least one cell, got {}x{}", cols, rows
            )));
        }
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(Error::Config(format!(
                "AOI grid extent must be positive, got {}x{}", width, height
            )));
        }

        let x_step = width / cols as f64;
        let y_step = height / rows as f64;
        Ok(Self {
            cols,
            rows,
            width,
            height,
            xs: (0..cols).map(|i| i as f64 * x_step).collect(),
            ys: (0..rows).map(|i| i as f64 * y_step).collect(),
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of on-screen cells
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Id of the catch-all cell
    pub fn outside_id(&self) -> u32 {
        self.cell_count() as u32 + 1
    }

    /// Transition matrix dimension, with or without the catch-all cell
    pub fn matrix_size(&self, include_outside: bool) -> usize {
        self.cell_count() + usize::from(include_outside)
    }

    /// Cell id of a pixel position.
    ///
    /// The column is the rightmost boundary strictly below `x` (so `x = 0`
    /// is column 0); rows likewise. Non-finite or off-screen points map to
    /// the catch-all cell.
    pub fn locate(&self, x: f64, y: f64) -> u32 {
        let on_screen = x.is_finite()
            && y.is_finite()
            && (0.0..=self.width).contains(&x)
            && (0.0..=self.height).contains(&y);
        if !on_screen {
            return self.outside_id();
        }

        let col = self.xs.iter().filter(|b| **b < x).count().saturating_sub(1);
        let row = self.ys.iter().filter(|b| **b < y).count().saturating_sub(1);
        (row * self.cols + col + 1) as u32
    }

    /// Finite cell rectangles in id order followed by the unbounded
    /// catch-all
    pub fn rectangles(&self) -> Vec<Rectangle> {
        let x_step = self.width / self.cols as f64;
        let y_step = self.height / self.rows as f64;
        let mut cells = Vec::with_capacity(self.cell_count() + 1);
        for &y0 in &self.ys {
            for &x0 in &self.xs {
                cells.push(Rectangle::new(x0, x0 + x_step, y0, y0 + y_step));
            }
        }
        cells.push(Rectangle::unbounded());
        cells
    }

    /// Cell id through rectangle containment.
    ///
    /// Points on an excluded cell border fall through to the catch-all.
    pub fn locate_by_rectangles(&self, rectangles: &[Rectangle], x: f64, y: f64, include_border: bool) -> u32 {
        rectangle::locate(rectangles, x, y, include_border).unwrap_or_else(|| self.outside_id())
    }

    /// Assign `aoi_id` to every sample and return the id sequence
    pub fn partition(&self, samples: &mut [Sample]) -> Vec<u32> {
        let ids: Vec<u32> = samples
            .iter_mut()
            .map(|s| {
                let id = self.locate(s.x, s.y);
                s.aoi_id = Some(id);
                id
            })
            .collect();

        debug!(
            samples = ids.len(),
            outside = ids.iter().filter(|id| **id == self.outside_id()).count(),
            "Partitioned samples into AOIs"
        );
        ids
    }
}

/// Compress samples into one point per `duration`-long time bucket.
///
/// The bucket of a sample is `floor(time / duration)`; each bucket becomes
/// a sample at the mean time and position of its members, in bucket order.
pub fn group_by_time(samples: &[Sample], duration: f64) -> Result<Vec<Sample>> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(Error::Config(format!(
            "group duration must be positive, got {}", duration
        )));
    }

    let mut buckets: BTreeMap<i64, (f64, f64, f64, usize)> = BTreeMap::new();
    for s in samples {
        let key = (s.time / duration).floor() as i64;
        let entry = buckets.entry(key).or_insert((0.0, 0.0, 0.0, 0));
        entry.0 += s.time;
        entry.1 += s.x;
        entry.2 += s.y;
        entry.3 += 1;
    }

    Ok(buckets
        .into_values()
        .map(|(t, x, y, n)| {
            let n = n as f64;
            Sample::new(t / n, x / n, y / n)
        })
        .collect())
}
