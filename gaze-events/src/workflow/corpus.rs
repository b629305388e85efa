//! Corpus Analysis
//!
//! Runs the trajectory pipeline over a named collection of recordings on
//! the rayon pool and merges the results once every trajectory is done:
//! concatenated event tables, an entropy table and pairwise likelihood
//! tables where row `a`, column `b` scores trajectory `a` against model `b`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::recording::Recording;
use super::trajectory::{Trajectory, TrajectoryReport};
use crate::analysis::summary::{FixationRow, FixationTotals, SaccadeRow, SaccadeTotals};
use crate::aoi::class_model::ClassModel;
use crate::aoi::transition::TransitionModel;
use crate::app::config::Config;
use crate::types::Sample;
use crate::{Error, Result};

/// Table row tagged with the trajectory it came from
#[derive(Debug, Clone, Serialize)]
pub struct NamedRow<T> {
    pub trajectory: String,
    #[serde(flatten)]
    pub row: T,
}

/// Square score table over trajectory names
#[derive(Debug, Clone, Serialize)]
pub struct ScoreTable {
    pub names: Vec<String>,
    /// `values[row][col]`: trajectory `row` scored against model `col`
    pub values: Vec<Vec<f64>>,
}

impl ScoreTable {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let r = self.names.iter().position(|n| n == row)?;
        let c = self.names.iter().position(|n| n == col)?;
        Some(self.values[r][c])
    }
}

/// Merged results of a corpus run
#[derive(Debug, Clone, Serialize)]
pub struct CorpusReport {
    pub generated_at: DateTime<Utc>,
    pub saccades: Vec<NamedRow<SaccadeRow>>,
    pub fixations: Vec<NamedRow<FixationRow>>,
    pub saccade_totals: Vec<NamedRow<SaccadeTotals>>,
    pub fixation_totals: Vec<NamedRow<FixationTotals>>,
    pub entropy: BTreeMap<String, f64>,
    pub likelihood: ScoreTable,
    pub log_likelihood: ScoreTable,
    pub models: BTreeMap<String, TransitionModel>,
}

/// Named trajectories sharing one configuration
#[derive(Debug, Clone)]
pub struct Corpus {
    config: Config,
    recordings: BTreeMap<String, Vec<Sample>>,
}

impl Corpus {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            recordings: BTreeMap::new(),
        })
    }

    pub fn from_recordings(recordings: Vec<Recording>, config: Config) -> Result<Self> {
        let mut corpus = Self::new(config)?;
        for recording in recordings {
            corpus.add(recording.metadata.name, recording.samples)?;
        }
        Ok(corpus)
    }

    /// Add a trajectory; names must be unique
    pub fn add(&mut self, name: impl Into<String>, samples: Vec<Sample>) -> Result<()> {
        let name = name.into();
        if self.recordings.contains_key(&name) {
            return Err(Error::Config(format!("duplicate trajectory name '{}'", name)));
        }
        self.recordings.insert(name, samples);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recordings.keys().map(String::as_str)
    }

    fn trajectory(&self, name: &str, samples: &[Sample]) -> Result<Trajectory> {
        Trajectory::new(name, samples.to_vec(), self.config.clone())
    }

    /// Full pipeline for every trajectory, in name order
    pub fn reports(&self) -> Result<Vec<TrajectoryReport>> {
        self.recordings
            .par_iter()
            .map(|(name, samples)| self.trajectory(name, samples)?.analyze())
            .collect()
    }

    /// Transition models only (skips kinematics and classification)
    pub fn transition_models(&self) -> Result<BTreeMap<String, TransitionModel>> {
        self.recordings
            .par_iter()
            .map(|(name, samples)| {
                let mut trajectory = self.trajectory(name, samples)?;
                trajectory.preprocess()?;
                Ok((name.clone(), trajectory.transition_model()?))
            })
            .collect()
    }

    /// Analyze every trajectory and cross-score the transition models
    pub fn analyze(&self) -> Result<CorpusReport> {
        if self.is_empty() {
            return Err(Error::Config("corpus has no trajectories".to_string()));
        }
        info!(trajectories = self.len(), "Analyzing corpus");

        let reports = self.reports()?;

        let mut saccades = Vec::new();
        let mut fixations = Vec::new();
        let mut saccade_totals = Vec::new();
        let mut fixation_totals = Vec::new();
        let mut entropy = BTreeMap::new();
        let mut models = BTreeMap::new();

        for report in reports {
            let name = report.name;
            saccades.extend(report.saccades.into_iter().map(|row| NamedRow { trajectory: name.clone(), row }));
            fixations.extend(report.fixations.into_iter().map(|row| NamedRow { trajectory: name.clone(), row }));
            saccade_totals.push(NamedRow { trajectory: name.clone(), row: report.saccade_totals });
            fixation_totals.push(NamedRow { trajectory: name.clone(), row: report.fixation_totals });
            entropy.insert(name.clone(), report.entropy);
            models.insert(name, report.transitions);
        }

        let (likelihood, log_likelihood) = cross_scores(&models)?;
        debug!(saccades = saccades.len(), fixations = fixations.len(), "Merged event tables");

        Ok(CorpusReport {
            generated_at: Utc::now(),
            saccades,
            fixations,
            saccade_totals,
            fixation_totals,
            entropy,
            likelihood,
            log_likelihood,
            models,
        })
    }
}

/// Pairwise likelihood and log-likelihood tables over named models
pub fn cross_scores(models: &BTreeMap<String, TransitionModel>) -> Result<(ScoreTable, ScoreTable)> {
    let names: Vec<String> = models.keys().cloned().collect();
    let mut likelihood = Vec::with_capacity(names.len());
    let mut log_likelihood = Vec::with_capacity(names.len());

    for evaluated in models.values() {
        let mut l_row = Vec::with_capacity(names.len());
        let mut ll_row = Vec::with_capacity(names.len());
        for model in models.values() {
            l_row.push(evaluated.likelihood(model)?);
            ll_row.push(evaluated.log_likelihood(model)?);
        }
        likelihood.push(l_row);
        log_likelihood.push(ll_row);
    }

    Ok((
        ScoreTable { names: names.clone(), values: likelihood },
        ScoreTable { names, values: log_likelihood },
    ))
}

/// Fit per-class models from labelled recordings.
///
/// Every recording is reduced to its transition counts in parallel.
pub fn fit_class_model(classes: BTreeMap<String, Vec<Recording>>, config: &Config) -> Result<ClassModel> {
    let mut labelled = Vec::with_capacity(classes.len());
    for (class, recordings) in classes {
        let mut corpus = Corpus::new(config.clone())?;
        for recording in recordings {
            corpus.add(recording.metadata.name, recording.samples)?;
        }
        let counts = corpus
            .transition_models()?
            .into_values()
            .map(|model| model.counts().clone())
            .collect();
        labelled.push((class, counts));
    }
    ClassModel::fit(labelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::{CommonConfig, VelocityConfig, VelocityType};

    fn config() -> Config {
        Config {
            common: CommonConfig {
                size: [50.0, 30.0],
                resolution: [1000.0, 600.0],
                distance: 50.0,
                adjust_time: true,
                normalized: false,
                reference_point: None,
            },
            smoothing: None,
            velocity: VelocityConfig { velocity_type: VelocityType::FiniteDifference, window: 3 },
            ..Config::default()
        }
    }

    fn walk(points: &[(f64, f64)], repeats: usize) -> Vec<Sample> {
        points
            .iter()
            .cycle()
            .take(points.len() * repeats)
            .enumerate()
            .map(|(i, (x, y))| Sample::new(i as f64 * 10.0, *x, *y))
            .collect()
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut corpus = Corpus::new(config()).unwrap();
        corpus.add("a", walk(&[(10.0, 10.0)], 3)).unwrap();
        assert!(matches!(corpus.add("a", Vec::new()), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_corpus() {
        assert!(Corpus::new(config()).unwrap().analyze().is_err());
    }

    #[test]
    fn test_analyze_merges_in_name_order() {
        let mut corpus = Corpus::new(config()).unwrap();
        corpus.add("b", walk(&[(100.0, 100.0), (900.0, 100.0)], 5)).unwrap();
        corpus.add("a", walk(&[(100.0, 100.0), (100.0, 500.0)], 5)).unwrap();
        let report = corpus.analyze().unwrap();

        assert_eq!(report.likelihood.names, vec!["a", "b"]);
        assert_eq!(report.saccade_totals[0].trajectory, "a");
        assert_eq!(report.entropy.len(), 2);
        assert_eq!(report.models.len(), 2);

        // each model explains itself better than the other one
        let ll = &report.log_likelihood;
        assert!(ll.get("a", "a").unwrap() > ll.get("a", "b").unwrap());
        assert!(ll.get("b", "b").unwrap() > ll.get("b", "a").unwrap());
    }

    #[test]
    fn test_cross_scores_diagonal_matches_self_scores() {
        let mut models = BTreeMap::new();
        models.insert("x".to_string(), TransitionModel::from_sequence(&[1, 2, 1, 1], 3).unwrap());
        models.insert("y".to_string(), TransitionModel::from_sequence(&[3, 3, 2], 3).unwrap());
        let (l, ll) = cross_scores(&models).unwrap();
        let x = &models["x"];
        assert_eq!(ll.get("x", "x"), Some(x.log_likelihood(x).unwrap()));
        assert_eq!(l.get("x", "y"), Some(x.likelihood(&models["y"]).unwrap()));
        assert_eq!(ll.get("x", "z"), None);
    }

    #[test]
    fn test_fit_class_model_from_recordings() {
        let horizontal = walk(&[(100.0, 100.0), (900.0, 100.0)], 6);
        let vertical = walk(&[(100.0, 100.0), (100.0, 500.0)], 6);

        let mut classes = BTreeMap::new();
        classes.insert(
            "horizontal".to_string(),
            vec![Recording::new("h1", horizontal.clone()), Recording::new("h2", horizontal.clone())],
        );
        classes.insert("vertical".to_string(), vec![Recording::new("v1", vertical.clone())]);
        let model = fit_class_model(classes, &config()).unwrap();

        let mut probe = Trajectory::new("probe", horizontal, config()).unwrap();
        probe.preprocess().unwrap();
        let scores = model.classify(&probe.transition_model().unwrap()).unwrap();
        assert_eq!(scores.best, "horizontal");
    }
}
