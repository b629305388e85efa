//! Event Classification
//!
//! Velocity-threshold (I-VT) labelling of samples into fixations and
//! saccades, optional label de-noising and grouping of consecutive equal
//! labels into events.

use tracing::debug;

use crate::app::config::{DetectionMethod, OculusConfig};
use crate::signal::preprocess::{fill_gaps, rolling, RollingStat};
use crate::types::{EventLabel, Sample};
use crate::{Error, Result};

/// Sample-level fixation/saccade classifier
#[derive(Debug, Clone)]
pub struct EventClassifier {
    method: DetectionMethod,
    velocity_threshold: f64,
    label_smoothing_window: Option<usize>,
}

impl EventClassifier {
    pub fn new(velocity_threshold: f64) -> Self {
        Self {
            method: DetectionMethod::Ivt,
            velocity_threshold,
            label_smoothing_window: None,
        }
    }

    pub fn from_config(config: &OculusConfig) -> Self {
        Self {
            method: config.method,
            velocity_threshold: config.velocity_threshold,
            label_smoothing_window: config.label_smoothing_window,
        }
    }

    /// Enable rolling-median de-noising of the labels
    pub fn with_label_smoothing(mut self, window: usize) -> Self {
        self.label_smoothing_window = Some(window);
        self
    }

    /// Label for a single angular velocity.
    ///
    /// A velocity equal to the threshold is still a fixation.
    pub fn label(&self, velocity: f64) -> EventLabel {
        if velocity > self.velocity_threshold {
            EventLabel::Saccade
        } else {
            EventLabel::Fixation
        }
    }

    /// Label every sample and assign event groups.
    ///
    /// Samples must already carry an angular velocity.
    pub fn classify(&self, samples: &mut [Sample]) -> Result<()> {
        match self.method {
            DetectionMethod::Ivt => {}
            DetectionMethod::Idt => {
                return Err(Error::NotImplemented("I-DT event detection".to_string()))
            }
            DetectionMethod::Anh => {
                return Err(Error::NotImplemented("ANH event detection".to_string()))
            }
        }

        let mut labels: Vec<EventLabel> = samples.iter().map(|s| self.label(s.velocity())).collect();
        if let Some(window) = self.label_smoothing_window {
            labels = smooth_labels(&labels, window);
        }

        for (s, label) in samples.iter_mut().zip(&labels) {
            s.event = Some(*label);
        }
        let groups = assign_groups(samples);

        debug!(
            samples = samples.len(),
            events = groups,
            threshold = self.velocity_threshold,
            "Classified samples"
        );
        Ok(())
    }

    /// Blink detection from pupil data
    pub fn detect_blinks(&self, _samples: &mut [Sample]) -> Result<()> {
        Err(Error::NotImplemented("blink detection".to_string()))
    }
}

/// Replace each label with the centred rolling median of the fixation
/// indicator.
///
/// Boundary gaps are back/forward filled; when the window does not fit at
/// all the labels are returned unchanged.
pub fn smooth_labels(labels: &[EventLabel], window: usize) -> Vec<EventLabel> {
    let indicator: Vec<f64> = labels
        .iter()
        .map(|l| if l.is_fixation() { 1.0 } else { 0.0 })
        .collect();
    let mut smoothed = rolling(&indicator, window, true, RollingStat::Median);
    fill_gaps(&mut smoothed);

    labels
        .iter()
        .zip(&smoothed)
        .map(|(original, v)| {
            if v.is_nan() {
                *original
            } else if *v >= 0.5 {
                EventLabel::Fixation
            } else {
                EventLabel::Saccade
            }
        })
        .collect()
}

/// Number consecutive runs of equal labels from 1; returns the run count.
///
/// Unlabelled samples break runs like a label change does.
pub fn assign_groups(samples: &mut [Sample]) -> u32 {
    let mut group = 0u32;
    let mut previous: Option<Option<EventLabel>> = None;
    for s in samples.iter_mut() {
        if previous != Some(s.event) {
            group += 1;
            previous = Some(s.event);
        }
        s.group_id = Some(group);
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_velocities(velocities: &[f64]) -> Vec<Sample> {
        velocities
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut s = Sample::new(i as f64, 0.0, 0.0);
                s.angular_velocity = Some(*v);
                s
            })
            .collect()
    }

    fn labels(samples: &[Sample]) -> Vec<EventLabel> {
        samples.iter().filter_map(|s| s.event).collect()
    }

    fn groups(samples: &[Sample]) -> Vec<u32> {
        samples.iter().filter_map(|s| s.group_id).collect()
    }

    #[test]
    fn test_ivt_alternating_labels() {
        let mut samples = with_velocities(&[10.0, 40.0, 5.0, 50.0]);
        EventClassifier::new(30.0).classify(&mut samples).unwrap();

        use EventLabel::*;
        assert_eq!(labels(&samples), vec![Fixation, Saccade, Fixation, Saccade]);
        assert_eq!(groups(&samples), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let classifier = EventClassifier::new(30.0);
        assert_eq!(classifier.label(30.0), EventLabel::Fixation);
        assert_eq!(classifier.label(30.0001), EventLabel::Saccade);
    }

    #[test]
    fn test_runs_share_group() {
        let mut samples = with_velocities(&[1.0, 2.0, 100.0, 120.0, 90.0, 3.0, 1.0]);
        EventClassifier::new(30.0).classify(&mut samples).unwrap();
        assert_eq!(groups(&samples), vec![1, 1, 2, 2, 2, 3, 3]);
    }

    #[test]
    fn test_label_smoothing_removes_single_sample_spike() {
        let mut samples = with_velocities(&[1.0, 2.0, 1.0, 90.0, 1.0, 2.0, 1.0]);
        EventClassifier::new(30.0)
            .with_label_smoothing(3)
            .classify(&mut samples)
            .unwrap();
        assert!(labels(&samples).iter().all(|l| l.is_fixation()));
        assert_eq!(groups(&samples), vec![1; 7]);
    }

    #[test]
    fn test_label_smoothing_fills_boundaries() {
        use EventLabel::*;
        let smoothed = smooth_labels(&[Saccade, Fixation, Fixation, Fixation, Saccade], 3);
        assert_eq!(smoothed, vec![Fixation; 5]);
    }

    #[test]
    fn test_label_smoothing_window_longer_than_sequence() {
        use EventLabel::*;
        let original = vec![Saccade, Fixation];
        assert_eq!(smooth_labels(&original, 5), original);
    }

    #[test]
    fn test_unsupported_methods() {
        let mut samples = with_velocities(&[1.0]);
        for method in [DetectionMethod::Idt, DetectionMethod::Anh] {
            let config = OculusConfig { method, ..OculusConfig::default() };
            let result = EventClassifier::from_config(&config).classify(&mut samples);
            assert!(matches!(result, Err(Error::NotImplemented(_))));
        }
        assert!(matches!(
            EventClassifier::new(30.0).detect_blinks(&mut samples),
            Err(Error::NotImplemented(_))
        ));
    }

    #[test]
    fn test_missing_velocity_is_fixation() {
        let mut samples = vec![Sample::new(0.0, 0.0, 0.0)];
        EventClassifier::new(30.0).classify(&mut samples).unwrap();
        assert_eq!(samples[0].event, Some(EventLabel::Fixation));
        assert_eq!(samples[0].group_id, Some(1));
    }

    #[test]
    fn test_empty_sequence() {
        let mut samples: Vec<Sample> = Vec::new();
        assert!(EventClassifier::new(30.0).classify(&mut samples).is_ok());
    }
}
