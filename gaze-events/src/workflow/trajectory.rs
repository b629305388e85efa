//! Trajectory Pipeline
//!
//! A trajectory owns one recording's samples and the configuration used to
//! process them. Stages run strictly in order:
//!
//! ```text
//! Raw ──▶ Preprocessed ──▶ Kinematics ──▶ Classified
//!              │
//!              └──▶ AOI sequence ──▶ transition model
//! ```
//!
//! Calling a stage before its predecessor is a pipeline error.

use serde::Serialize;
use tracing::{debug, info};

use super::recording::Recording;
use crate::analysis::classifier::EventClassifier;
use crate::analysis::kinematics::AngularKinematics;
use crate::analysis::summary::{EventSummarizer, EventSummary, FixationRow, FixationTotals, SaccadeRow, SaccadeTotals};
use crate::aoi::grid::{group_by_time, AoiGrid};
use crate::aoi::stimulus::{Informativity, Stimulus};
use crate::aoi::transition::TransitionModel;
use crate::app::config::Config;
use crate::signal::preprocess::preprocess;
use crate::types::Sample;
use crate::{Error, Result};

/// Pipeline progress of a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Raw,
    Preprocessed,
    Kinematics,
    Classified,
}

/// Everything computed for one trajectory
#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryReport {
    pub name: String,
    pub samples: usize,
    pub duration: f64,
    pub saccades: Vec<SaccadeRow>,
    pub fixations: Vec<FixationRow>,
    pub saccade_totals: SaccadeTotals,
    pub fixation_totals: FixationTotals,
    pub transitions: TransitionModel,
    pub entropy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informativity: Option<Informativity>,
}

/// One recording moving through the pipeline
#[derive(Debug, Clone)]
pub struct Trajectory {
    name: String,
    raw: Vec<Sample>,
    samples: Vec<Sample>,
    config: Config,
    grid: AoiGrid,
    stage: Stage,
}

impl Trajectory {
    /// Validate the configuration against the recording and take ownership
    /// of the samples
    pub fn new(name: impl Into<String>, samples: Vec<Sample>, config: Config) -> Result<Self> {
        config.validate()?;
        config.validate_length(samples.len())?;
        let [width, height] = config.common.resolution;
        let grid = AoiGrid::new(config.aoi.cols, config.aoi.rows, width, height)?;
        Ok(Self {
            name: name.into(),
            raw: samples,
            samples: Vec::new(),
            config,
            grid,
            stage: Stage::Raw,
        })
    }

    pub fn from_recording(recording: Recording, config: Config) -> Result<Self> {
        Self::new(recording.metadata.name, recording.samples, config)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grid(&self) -> &AoiGrid {
        &self.grid
    }

    /// Samples as produced by the latest stage (raw before preprocessing)
    pub fn samples(&self) -> &[Sample] {
        if self.stage == Stage::Raw {
            &self.raw
        } else {
            &self.samples
        }
    }

    fn expect_stage(&self, required: Stage, operation: &str) -> Result<()> {
        if self.stage != required {
            return Err(Error::Pipeline(format!(
                "{} on '{}' needs stage {:?}, trajectory is at {:?}",
                operation, self.name, required, self.stage
            )));
        }
        Ok(())
    }

    fn expect_at_least(&self, required: Stage, operation: &str) -> Result<()> {
        if self.stage < required {
            return Err(Error::Pipeline(format!(
                "{} on '{}' needs stage {:?} or later, trajectory is at {:?}",
                operation, self.name, required, self.stage
            )));
        }
        Ok(())
    }

    /// Time adjustment, de-normalisation and smoothing
    pub fn preprocess(&mut self) -> Result<()> {
        self.expect_stage(Stage::Raw, "preprocess")?;
        self.samples = preprocess(&self.raw, &self.config.common, self.config.smoothing.as_ref())?;
        self.stage = Stage::Preprocessed;
        Ok(())
    }

    /// Visual angles, angular velocity and acceleration
    pub fn compute_kinematics(&mut self) -> Result<()> {
        self.expect_stage(Stage::Preprocessed, "compute_kinematics")?;
        AngularKinematics::new(&self.config.common, &self.config.velocity).apply(&mut self.samples)?;
        self.stage = Stage::Kinematics;
        Ok(())
    }

    /// Fixation/saccade labels and event groups
    pub fn classify(&mut self) -> Result<()> {
        self.expect_stage(Stage::Kinematics, "classify")?;
        EventClassifier::from_config(&self.config.oculus).classify(&mut self.samples)?;
        self.stage = Stage::Classified;
        Ok(())
    }

    /// Run every remaining event stage
    pub fn run(&mut self) -> Result<()> {
        if self.stage == Stage::Raw {
            self.preprocess()?;
        }
        if self.stage == Stage::Preprocessed {
            self.compute_kinematics()?;
        }
        if self.stage == Stage::Kinematics {
            self.classify()?;
        }
        Ok(())
    }

    /// Event rows and totals
    pub fn events(&self) -> Result<EventSummary> {
        self.expect_stage(Stage::Classified, "events")?;
        Ok(EventSummarizer::new().summarize(&self.samples))
    }

    /// AOI id sequence over the preprocessed pixel coordinates.
    ///
    /// Without time grouping each sample gets its `aoi_id`; with grouping
    /// one id per time bucket is returned and samples are left alone. The
    /// catch-all id is dropped when outside gaze is excluded.
    pub fn aoi_sequence(&mut self) -> Result<Vec<u32>> {
        self.expect_at_least(Stage::Preprocessed, "aoi_sequence")?;

        let ids = match self.config.aoi.group_duration {
            Some(duration) => group_by_time(&self.samples, duration)?
                .iter()
                .map(|s| self.grid.locate(s.x, s.y))
                .collect(),
            None => self.grid.partition(&mut self.samples),
        };

        if self.config.aoi.include_outside {
            Ok(ids)
        } else {
            let outside = self.grid.outside_id();
            Ok(ids.into_iter().filter(|id| *id != outside).collect())
        }
    }

    /// Transition counts and probabilities of the AOI sequence
    pub fn transition_model(&mut self) -> Result<TransitionModel> {
        let ids = self.aoi_sequence()?;
        let model = TransitionModel::from_sequence(&ids, self.grid.matrix_size(self.config.aoi.include_outside))?;
        debug!(
            trajectory = %self.name,
            points = ids.len(),
            transitions = model.transition_count(),
            "Built transition model"
        );
        Ok(model)
    }

    /// Gaze informativity over a stimulus image in screen pixels
    pub fn informativity(&self, stimulus: &Stimulus) -> Result<Option<Informativity>> {
        self.expect_at_least(Stage::Preprocessed, "informativity")?;
        Ok(stimulus.informativity(&self.samples))
    }

    /// Full pipeline: events, totals, transition model and entropy
    pub fn analyze(&mut self) -> Result<TrajectoryReport> {
        self.analyze_with(None)
    }

    pub fn analyze_with(&mut self, stimulus: Option<&Stimulus>) -> Result<TrajectoryReport> {
        self.run()?;
        let EventSummary {
            saccades,
            fixations,
            saccade_totals,
            fixation_totals,
        } = self.events()?;
        let transitions = self.transition_model()?;
        let entropy = transitions.entropy();
        let informativity = match stimulus {
            Some(stimulus) => self.informativity(stimulus)?,
            None => None,
        };

        let first = self.samples.first().map_or(0.0, |s| s.time);
        let last = self.samples.last().map_or(0.0, |s| s.time);

        info!(
            trajectory = %self.name,
            saccades = saccades.len(),
            fixations = fixations.len(),
            entropy,
            "Analyzed trajectory"
        );

        Ok(TrajectoryReport {
            name: self.name.clone(),
            samples: self.samples.len(),
            duration: last - first,
            saccades,
            fixations,
            saccade_totals,
            fixation_totals,
            transitions,
            entropy,
            informativity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::{CommonConfig, SmoothingConfig, VelocityConfig, VelocityType};

    fn pixel_config() -> Config {
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

    /// Two fixations joined by a fast jump
    fn samples() -> Vec<Sample> {
        let mut out = Vec::new();
        for i in 0..10 {
            out.push(Sample::new(100.0 + i as f64, 100.0 + (i % 2) as f64, 100.0));
        }
        for i in 0..10 {
            out.push(Sample::new(110.0 + i as f64, 850.0 + (i % 2) as f64, 500.0));
        }
        out
    }

    #[test]
    fn test_stages_must_run_in_order() {
        let mut trajectory = Trajectory::new("t", samples(), pixel_config()).unwrap();
        assert!(matches!(trajectory.classify(), Err(Error::Pipeline(_))));
        assert!(matches!(trajectory.compute_kinematics(), Err(Error::Pipeline(_))));
        assert!(matches!(trajectory.events(), Err(Error::Pipeline(_))));
        assert!(matches!(trajectory.aoi_sequence(), Err(Error::Pipeline(_))));

        trajectory.preprocess().unwrap();
        assert!(matches!(trajectory.preprocess(), Err(Error::Pipeline(_))));
        assert!(matches!(trajectory.classify(), Err(Error::Pipeline(_))));
        trajectory.compute_kinematics().unwrap();
        trajectory.classify().unwrap();
        assert_eq!(trajectory.stage(), Stage::Classified);
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let mut config = pixel_config();
        config.common.distance = 0.0;
        assert!(matches!(Trajectory::new("t", samples(), config), Err(Error::Config(_))));
    }

    #[test]
    fn test_smoothing_window_longer_than_recording() {
        let mut config = pixel_config();
        config.smoothing = Some(SmoothingConfig { window: 33, ..SmoothingConfig::default() });
        assert!(matches!(Trajectory::new("t", samples(), config), Err(Error::Config(_))));
    }

    #[test]
    fn test_analytical_window_longer_than_recording() {
        let mut config = pixel_config();
        config.velocity = VelocityConfig { velocity_type: VelocityType::Analytical, window: 13 };
        let short = samples()[..5].to_vec();
        assert!(matches!(Trajectory::new("t", short, config), Err(Error::Config(_))));
    }

    #[test]
    fn test_analyze_finds_jump() {
        let mut trajectory = Trajectory::new("t", samples(), pixel_config()).unwrap();
        let report = trajectory.analyze().unwrap();

        assert_eq!(report.samples, 20);
        assert_eq!(report.duration, 19.0);
        assert_eq!(report.saccades.len(), 1);
        assert_eq!(report.fixations.len(), 2);
        assert_eq!(trajectory.samples()[0].time, 0.0);

        // 1000x600 screen with a 5x5 grid: (100,100) is cell 1, (850,500) cell 25
        assert_eq!(report.transitions.size(), 26);
        assert_eq!(report.transitions.counts()[(24, 0)], 1.0);
        assert_eq!(report.transitions.transition_count(), 19.0);
        assert!(trajectory.samples().iter().all(|s| s.aoi_id.is_some()));
    }

    #[test]
    fn test_exclude_outside_shrinks_matrix() {
        let mut config = pixel_config();
        config.aoi.include_outside = false;
        let mut raw = samples();
        raw[3].x = -50.0;
        let mut trajectory = Trajectory::new("t", raw, config).unwrap();
        trajectory.preprocess().unwrap();
        let model = trajectory.transition_model().unwrap();
        assert_eq!(model.size(), 25);
        assert_eq!(model.transition_count(), 18.0);
    }

    #[test]
    fn test_time_grouping_compresses_sequence() {
        let mut config = pixel_config();
        config.aoi.group_duration = Some(5.0);
        let mut trajectory = Trajectory::new("t", samples(), config).unwrap();
        trajectory.preprocess().unwrap();
        let ids = trajectory.aoi_sequence().unwrap();
        assert_eq!(ids, vec![1, 1, 25, 25]);
    }

    #[test]
    fn test_informativity_needs_preprocessing() {
        let stimulus = Stimulus::from_rows(&vec![vec![1.0; 4]; 4]).unwrap();
        let mut trajectory = Trajectory::new("t", samples(), pixel_config()).unwrap();
        assert!(trajectory.informativity(&stimulus).is_err());
        trajectory.preprocess().unwrap();
        // every sample lies beyond the 4x4 stimulus
        assert!(trajectory.informativity(&stimulus).unwrap().is_none());
    }
}
