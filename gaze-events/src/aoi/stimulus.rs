//! Stimulus Informativity
//!
//! Measures how concentrated a gaze path is over the salient parts of a
//! stimulus image. The image intensity is normalised to a probability map;
//! the entropy of the visited pixels is compared with the uniform bound
//! `log2(n)`.

use nalgebra::DMatrix;
use serde::Serialize;

use crate::types::Sample;
use crate::{Error, Result};

/// Normalised stimulus intensity, rows are y and columns are x
#[derive(Debug, Clone)]
pub struct Stimulus {
    probabilities: DMatrix<f64>,
}

/// Entropy of a gaze path over a stimulus
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Informativity {
    /// Samples that landed strictly inside the stimulus
    pub samples: usize,
    /// `-Σ p log2 p` over the visited pixels
    pub entropy: f64,
    /// `log2(samples) - entropy`
    pub informativity: f64,
}

impl Stimulus {
    pub fn new(intensity: DMatrix<f64>) -> Result<Self> {
        if intensity.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::Config("stimulus intensity must be finite and non-negative".to_string()));
        }
        let total = intensity.sum();
        if total <= 0.0 {
            return Err(Error::Config("stimulus has no intensity".to_string()));
        }
        Ok(Self { probabilities: intensity / total })
    }

    /// Build from a row-major list of rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 || rows.iter().any(|r| r.len() != width) {
            return Err(Error::Config("stimulus rows must be non-empty and equally long".to_string()));
        }
        Self::new(DMatrix::from_fn(height, width, |r, c| rows[r][c]))
    }

    pub fn width(&self) -> usize {
        self.probabilities.ncols()
    }

    pub fn height(&self) -> usize {
        self.probabilities.nrows()
    }

    /// Probability at a pixel position, `None` unless strictly inside
    pub fn probability_at(&self, x: f64, y: f64) -> Option<f64> {
        if !(x > 0.0 && x < self.width() as f64 && y > 0.0 && y < self.height() as f64) {
            return None;
        }
        Some(self.probabilities[(y as usize, x as usize)])
    }

    /// Informativity of a pixel-space gaze path; `None` when no sample is
    /// inside the stimulus
    pub fn informativity(&self, samples: &[Sample]) -> Option<Informativity> {
        let visited: Vec<f64> = samples
            .iter()
            .filter_map(|s| self.probability_at(s.x, s.y))
            .collect();
        if visited.is_empty() {
            return None;
        }

        let entropy = -visited
            .iter()
            .filter(|p| **p > 0.0)
            .map(|p| p * p.log2())
            .sum::<f64>();
        Some(Informativity {
            samples: visited.len(),
            entropy,
            informativity: (visited.len() as f64).log2() - entropy,
        })
    }
}
