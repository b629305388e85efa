//! AOI Transition Model
//!
//! Counts of consecutive AOI-to-AOI moves and the derived first-order
//! Markov matrices. Matrices are indexed `[to][from]`: column `j` holds
//! everything that left cell `j + 1`.

use nalgebra::DMatrix;
use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// Stand-in for `ln 0` in log-probability matrices
pub const LOG_ZERO_SENTINEL: f64 = -10.0;

/// Serialize a matrix as a list of rows
pub(crate) fn serialize_rows<S: Serializer>(matrix: &DMatrix<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let rows: Vec<Vec<f64>> = matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect();
    rows.serialize(serializer)
}

/// Divide each column by its sum; all-zero columns stay zero
pub fn column_probabilities(counts: &DMatrix<f64>) -> DMatrix<f64> {
    let mut probabilities = counts.clone();
    for mut column in probabilities.column_iter_mut() {
        let sum = column.sum();
        if sum != 0.0 {
            column /= sum;
        }
    }
    probabilities
}

/// Natural log with exact zeros replaced by [`LOG_ZERO_SENTINEL`]
pub fn masked_log(probabilities: &DMatrix<f64>) -> DMatrix<f64> {
    probabilities.map(|p| if p == 0.0 { LOG_ZERO_SENTINEL } else { p.ln() })
}

fn check_shape(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::Pipeline(format!(
            "transition matrices differ in shape: {:?} vs {:?}",
            a.shape(),
            b.shape()
        )));
    }
    Ok(())
}

/// Transition counts with their probability and log-probability forms
#[derive(Debug, Clone, Serialize)]
pub struct TransitionModel {
    #[serde(serialize_with = "serialize_rows")]
    counts: DMatrix<f64>,
    #[serde(serialize_with = "serialize_rows")]
    probabilities: DMatrix<f64>,
    #[serde(serialize_with = "serialize_rows")]
    log_probabilities: DMatrix<f64>,
}

impl TransitionModel {
    /// Count transitions in a sequence of 1-based AOI ids
    pub fn from_sequence(ids: &[u32], size: usize) -> Result<Self> {
        let mut counts = DMatrix::zeros(size, size);
        for pair in ids.windows(2) {
            let (from, to) = (pair[0] as usize, pair[1] as usize);
            if from == 0 || to == 0 || from > size || to > size {
                return Err(Error::Pipeline(format!(
                    "AOI id out of range 1..={} in transition {} -> {}",
                    size, pair[0], pair[1]
                )));
            }
            counts[(to - 1, from - 1)] += 1.0;
        }
        Self::from_counts(counts)
    }

    /// Build from an existing square count matrix
    pub fn from_counts(counts: DMatrix<f64>) -> Result<Self> {
        if !counts.is_square() {
            return Err(Error::Pipeline(format!(
                "transition counts must be square, got {:?}",
                counts.shape()
            )));
        }
        let probabilities = column_probabilities(&counts);
        let log_probabilities = masked_log(&probabilities);
        Ok(Self {
            counts,
            probabilities,
            log_probabilities,
        })
    }

    pub fn size(&self) -> usize {
        self.counts.nrows()
    }

    pub fn counts(&self) -> &DMatrix<f64> {
        &self.counts
    }

    pub fn probabilities(&self) -> &DMatrix<f64> {
        &self.probabilities
    }

    pub fn log_probabilities(&self) -> &DMatrix<f64> {
        &self.log_probabilities
    }

    pub fn transition_count(&self) -> f64 {
        self.counts.sum()
    }

    /// `-Σ p · log p` over the whole matrix
    pub fn entropy(&self) -> f64 {
        -self.probabilities.component_mul(&self.log_probabilities).sum()
    }

    /// Product over all cells of this model's counts times `model`'s
    /// probabilities.
    ///
    /// Any empty cell makes the product 0 and large grids underflow;
    /// prefer [`log_likelihood`](Self::log_likelihood) for comparisons.
    pub fn likelihood(&self, model: &TransitionModel) -> Result<f64> {
        check_shape(&self.counts, &model.probabilities)?;
        Ok(self.counts.component_mul(&model.probabilities).product())
    }

    /// Sum over all cells of this model's counts times `model`'s
    /// log-probabilities
    pub fn log_likelihood(&self, model: &TransitionModel) -> Result<f64> {
        self.log_likelihood_under(&model.log_probabilities)
    }

    pub(crate) fn log_likelihood_under(&self, log_probabilities: &DMatrix<f64>) -> Result<f64> {
        check_shape(&self.counts, log_probabilities)?;
        Ok(self.counts.component_mul(log_probabilities).sum())
    }
}
