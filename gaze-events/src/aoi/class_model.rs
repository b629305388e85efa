//! Class Transition Models
//!
//! Pools the transition counts of labelled trajectories into one Markov
//! model per class and scores unseen trajectories against every class.

use std::collections::BTreeMap;

use nalgebra::DMatrix;
use serde::Serialize;
use tracing::{debug, info};

use super::transition::TransitionModel;
use crate::{Error, Result};

/// Per-class pooled transition models, read-only once fitted
#[derive(Debug, Clone, Serialize)]
pub struct ClassModel {
    classes: BTreeMap<String, TransitionModel>,
}

/// Log-likelihood of one trajectory under each class
#[derive(Debug, Clone, Serialize)]
pub struct ClassScores {
    pub scores: BTreeMap<String, f64>,
    pub best: String,
}

impl ClassModel {
    /// Sum the count matrices of each class and normalise per column.
    ///
    /// Every class needs at least one matrix and all matrices must share a
    /// shape.
    pub fn fit<I>(classes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<DMatrix<f64>>)>,
    {
        let mut fitted = BTreeMap::new();
        let mut shape: Option<(usize, usize)> = None;

        for (name, matrices) in classes {
            let mut iter = matrices.into_iter();
            let Some(mut total) = iter.next() else {
                return Err(Error::Config(format!("class '{}' has no trajectories", name)));
            };
            let mut members = 1;
            for m in iter {
                if m.shape() != total.shape() {
                    return Err(Error::Pipeline(format!(
                        "class '{}' mixes matrix shapes {:?} and {:?}",
                        name,
                        total.shape(),
                        m.shape()
                    )));
                }
                total += m;
                members += 1;
            }

            match shape {
                Some(s) if s != total.shape() => {
                    return Err(Error::Pipeline(format!(
                        "class '{}' has shape {:?}, expected {:?}",
                        name,
                        total.shape(),
                        s
                    )));
                }
                _ => shape = Some(total.shape()),
            }

            debug!(class = %name, members, transitions = total.sum(), "Fitted class");
            fitted.insert(name, TransitionModel::from_counts(total)?);
        }

        if fitted.is_empty() {
            return Err(Error::Config("no classes to fit".to_string()));
        }
        info!(classes = fitted.len(), "Class model ready");
        Ok(Self { classes: fitted })
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn class(&self, name: &str) -> Option<&TransitionModel> {
        self.classes.get(name)
    }

    /// Log-likelihood of `trajectory` under every class model
    pub fn log_likelihoods(&self, trajectory: &TransitionModel) -> Result<BTreeMap<String, f64>> {
        self.classes
            .iter()
            .map(|(name, model)| Ok((name.clone(), trajectory.log_likelihood(model)?)))
            .collect()
    }

    /// Scores plus the class with the highest log-likelihood
    pub fn classify(&self, trajectory: &TransitionModel) -> Result<ClassScores> {
        let scores = self.log_likelihoods(trajectory)?;
        let best = scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, _)| name.clone())
            .ok_or_else(|| Error::Pipeline("class model is empty".to_string()))?;
        Ok(ClassScores { scores, best })
    }
}
