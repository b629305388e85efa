//! Corpus Integration Tests
//!
//! Several recordings analysed together: merged event tables, pairwise
//! transition scores, class models and the JSON files that carry them.

use std::collections::BTreeMap;

use gaze_events::app::config::Config;
use gaze_events::workflow::{fit_class_model, Corpus, Recording, Trajectory};
use gaze_events::Sample;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

const DT: f64 = 0.004;

/// Steady fixations joined by instantaneous jumps, `per_fixation` samples each
fn scanpath(points: &[(f64, f64)], per_fixation: usize) -> Vec<Sample> {
    points
        .iter()
        .flat_map(|p| std::iter::repeat(*p).take(per_fixation))
        .enumerate()
        .map(|(i, (x, y))| Sample::new(i as f64 * DT, x, y))
        .collect()
}

fn horizontal(per_fixation: usize) -> Vec<Sample> {
    scanpath(&[(0.3, 0.3), (0.7, 0.3), (0.3, 0.3), (0.7, 0.3)], per_fixation)
}

fn vertical(per_fixation: usize) -> Vec<Sample> {
    scanpath(&[(0.3, 0.3), (0.3, 0.7), (0.3, 0.3), (0.3, 0.7)], per_fixation)
}

fn corpus() -> Corpus {
    let mut corpus = Corpus::new(Config::default()).unwrap();
    corpus.add("vertical", vertical(50)).unwrap();
    corpus.add("horizontal", horizontal(50)).unwrap();
    corpus.add("still", scanpath(&[(0.3, 0.3)], 200)).unwrap();
    corpus
}

// ============================================================================
// Corpus comparison
// ============================================================================

#[test]
fn test_corpus_report_tables() {
    let report = corpus().analyze().unwrap();

    assert_eq!(report.likelihood.names, vec!["horizontal", "still", "vertical"]);
    assert_eq!(report.log_likelihood.values.len(), 3);
    assert!(report.log_likelihood.values.iter().all(|row| row.len() == 3));

    // three saccades in each moving scanpath, none while staring
    assert_eq!(report.saccades.len(), 6);
    assert!(report.saccades.iter().all(|row| row.trajectory != "still"));
    assert_eq!(report.fixations.len(), 4 + 4 + 1);

    let names: Vec<&str> = report.saccade_totals.iter().map(|r| r.trajectory.as_str()).collect();
    assert_eq!(names, vec!["horizontal", "still", "vertical"]);
}

#[test]
fn test_still_trajectory_has_zero_entropy() {
    let report = corpus().analyze().unwrap();
    assert_eq!(report.entropy["still"], 0.0);
    assert!(report.entropy["horizontal"] > 0.0);
}

#[test]
fn test_models_prefer_their_own_trajectory() {
    let report = corpus().analyze().unwrap();
    let ll = &report.log_likelihood;

    assert!(ll.get("horizontal", "horizontal").unwrap() > ll.get("horizontal", "vertical").unwrap());
    assert!(ll.get("vertical", "vertical").unwrap() > ll.get("vertical", "horizontal").unwrap());

    // a masked cell costs the sentinel, so log-likelihoods stay finite
    assert!(ll.values.iter().flatten().all(|v| v.is_finite()));
}

#[test]
fn test_corpus_matches_single_trajectory_runs() {
    let report = corpus().analyze().unwrap();

    let mut single = Trajectory::new("horizontal", horizontal(50), Config::default()).unwrap();
    let alone = single.analyze().unwrap();

    assert_eq!(report.entropy["horizontal"], alone.entropy);
    assert_eq!(report.models["horizontal"].counts(), alone.transitions.counts());
}

// ============================================================================
// Class models
// ============================================================================

#[test]
fn test_classify_by_scan_direction() {
    let mut classes = BTreeMap::new();
    classes.insert(
        "horizontal".to_string(),
        vec![Recording::new("h1", horizontal(50)), Recording::new("h2", horizontal(70))],
    );
    classes.insert(
        "vertical".to_string(),
        vec![Recording::new("v1", vertical(50)), Recording::new("v2", vertical(40))],
    );
    let model = fit_class_model(classes, &Config::default()).unwrap();
    assert_eq!(model.class_names().collect::<Vec<_>>(), vec!["horizontal", "vertical"]);

    for (probe, expected) in [(horizontal(45), "horizontal"), (vertical(65), "vertical")] {
        let mut trajectory = Trajectory::new("probe", probe, Config::default()).unwrap();
        trajectory.preprocess().unwrap();
        let scores = model.classify(&trajectory.transition_model().unwrap()).unwrap();
        assert_eq!(scores.best, expected);
        assert_eq!(scores.scores.len(), 2);
    }
}

#[test]
fn test_class_without_recordings_is_rejected() {
    let mut classes = BTreeMap::new();
    classes.insert("horizontal".to_string(), vec![Recording::new("h1", horizontal(50))]);
    classes.insert("empty".to_string(), Vec::new());
    assert!(matches!(
        fit_class_model(classes, &Config::default()),
        Err(gaze_events::Error::Config(_))
    ));
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_recordings_on_disk_to_corpus_report() {
    let dir = TempDir::new().unwrap();
    let paths = [dir.path().join("h.json"), dir.path().join("v.json")];
    Recording::new("horizontal", horizontal(50)).save(&paths[0]).unwrap();
    Recording::new("vertical", vertical(50)).save(&paths[1]).unwrap();

    let recordings: Vec<Recording> = paths.iter().map(|p| Recording::load(p).unwrap()).collect();
    assert_eq!(recordings[0].name(), "horizontal");
    assert_eq!(recordings[0].len(), 200);
    assert!(recordings[1].metadata.source.is_some());

    let report = Corpus::from_recordings(recordings, Config::default())
        .unwrap()
        .analyze()
        .unwrap();

    let out = dir.path().join("report.json");
    std::fs::write(&out, serde_json::to_string_pretty(&report).unwrap()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();

    assert!(json["generated_at"].is_string());
    // row fields are flattened next to the trajectory name
    assert_eq!(json["saccades"][0]["trajectory"], "horizontal");
    assert!(json["saccades"][0]["amplitude"].is_number());
    assert_eq!(json["likelihood"]["names"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["models"]["vertical"]["counts"].as_array().map(Vec::len), Some(26));
}

#[test]
fn test_duplicate_recording_names() {
    let recordings = vec![
        Recording::new("p01", horizontal(50)),
        Recording::new("p01", vertical(50)),
    ];
    assert!(Corpus::from_recordings(recordings, Config::default()).is_err());
}
