//! Event Parameters
//!
//! Per-event rows for saccades and fixations and per-trajectory totals.
//! Every statistic is computed over the event's own samples in visual-angle
//! space. Degenerate events never fail: undefined values are `NaN` and the
//! totals skip them.

use serde::Serialize;

use super::geometry::{fan_area, graham_scan, Point2};
use crate::types::{EventLabel, Orientation, Sample};

/// Minimum fixation size for a defined area
const MIN_AREA_SAMPLES: usize = 3;
/// Fixations with at least this many samples are reduced to their hull first
const HULL_SAMPLES: usize = 5;

/// One saccade
#[derive(Debug, Clone, Serialize)]
pub struct SaccadeRow {
    pub group_id: u32,
    pub nsamples: usize,
    pub duration: f64,
    pub amplitude_x: f64,
    pub amplitude_y: f64,
    pub amplitude: f64,
    pub path_length: f64,
    pub curvature: f64,
    pub peak_velocity: f64,
    pub mean_velocity: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub orientation: Orientation,
}

/// One fixation
#[derive(Debug, Clone, Serialize)]
pub struct FixationRow {
    pub group_id: u32,
    pub nsamples: usize,
    pub duration: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub area: f64,
}

/// Saccade aggregates over one trajectory
#[derive(Debug, Clone, Serialize)]
pub struct SaccadeTotals {
    pub count: usize,
    pub frequency: f64,
    pub horizontal_count: usize,
    pub vertical_count: usize,
    pub diagonal_count: usize,
    pub horizontal_frequency: f64,
    pub vertical_frequency: f64,
    pub diagonal_frequency: f64,
    pub mean_duration: f64,
    pub mean_amplitude: f64,
    pub mean_peak_velocity: f64,
    pub mean_velocity: f64,
}

/// Fixation aggregates over one trajectory
#[derive(Debug, Clone, Serialize)]
pub struct FixationTotals {
    pub count: usize,
    pub frequency: f64,
    pub total_duration: f64,
    pub mean_duration: f64,
    pub total_area: f64,
    pub mean_area: f64,
}

/// All event tables of one trajectory
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub saccades: Vec<SaccadeRow>,
    pub fixations: Vec<FixationRow>,
    pub saccade_totals: SaccadeTotals,
    pub fixation_totals: FixationTotals,
}

/// Mean ignoring `NaN`; `NaN` when nothing is left
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Sum ignoring `NaN`; 0 when nothing is left
pub fn nan_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().filter(|v| !v.is_nan()).sum()
}

/// Count over duration, 0 for a zero-length trajectory
fn frequency(count: usize, duration: f64) -> f64 {
    if duration > 0.0 {
        count as f64 / duration
    } else {
        0.0
    }
}

fn duration(samples: &[Sample]) -> f64 {
    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s.time), hi.max(s.time)));
    if samples.is_empty() {
        0.0
    } else {
        max - min
    }
}

fn centroid(samples: &[Sample]) -> (f64, f64) {
    (
        nan_mean(samples.iter().map(|s| s.angular().0)),
        nan_mean(samples.iter().map(|s| s.angular().1)),
    )
}

/// Consecutive runs of samples sharing a `group_id`
fn events(samples: &[Sample]) -> impl Iterator<Item = (u32, EventLabel, &[Sample])> {
    samples
        .chunk_by(|a, b| a.group_id == b.group_id)
        .filter_map(|run| {
            let first = run.first()?;
            Some((first.group_id?, first.event?, run))
        })
}

/// Builds event rows and totals from classified samples
#[derive(Debug, Clone, Copy, Default)]
pub struct EventSummarizer;

impl EventSummarizer {
    pub fn new() -> Self {
        Self
    }

    pub fn saccade(&self, group_id: u32, samples: &[Sample]) -> SaccadeRow {
        let (amplitude_x, amplitude_y, amplitude, path_length, orientation) = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) if samples.len() >= 2 => {
                let (x0, y0) = first.angular();
                let (x1, y1) = last.angular();
                let ax = (x1 - x0).abs();
                let ay = (y1 - y0).abs();
                let path: f64 = samples
                    .windows(2)
                    .map(|w| {
                        let (xa, ya) = w[0].angular();
                        let (xb, yb) = w[1].angular();
                        ((xb - xa).powi(2) + (yb - ya).powi(2)).sqrt()
                    })
                    .sum();
                let slope = (y1 - y0) / (x1 - x0);
                (ax, ay, ax.hypot(ay), path, Orientation::from_slope(slope))
            }
            // a single sample has a 0/0 slope
            _ => (f64::NAN, f64::NAN, f64::NAN, f64::NAN, Orientation::Diagonal),
        };

        let curvature = if amplitude == 0.0 || path_length == 0.0 {
            f64::NAN
        } else {
            path_length / amplitude
        };

        let peak_velocity = samples
            .iter()
            .map(Sample::velocity)
            .filter(|v| !v.is_nan())
            .fold(f64::NAN, f64::max);
        let (center_x, center_y) = centroid(samples);

        SaccadeRow {
            group_id,
            nsamples: samples.len(),
            duration: duration(samples),
            amplitude_x,
            amplitude_y,
            amplitude,
            path_length,
            curvature,
            peak_velocity,
            mean_velocity: nan_mean(samples.iter().map(Sample::velocity)),
            center_x,
            center_y,
            orientation,
        }
    }

    pub fn fixation(&self, group_id: u32, samples: &[Sample]) -> FixationRow {
        let (center_x, center_y) = centroid(samples);
        FixationRow {
            group_id,
            nsamples: samples.len(),
            duration: duration(samples),
            center_x,
            center_y,
            area: fixation_area(samples),
        }
    }

    pub fn saccades(&self, samples: &[Sample]) -> Vec<SaccadeRow> {
        events(samples)
            .filter(|(_, label, _)| *label == EventLabel::Saccade)
            .map(|(group, _, run)| self.saccade(group, run))
            .collect()
    }

    pub fn fixations(&self, samples: &[Sample]) -> Vec<FixationRow> {
        events(samples)
            .filter(|(_, label, _)| label.is_fixation())
            .map(|(group, _, run)| self.fixation(group, run))
            .collect()
    }

    /// Aggregate saccade rows; `duration` is the whole trajectory's
    pub fn saccade_totals(&self, rows: &[SaccadeRow], duration: f64) -> SaccadeTotals {
        let count_of = |o: Orientation| rows.iter().filter(|r| r.orientation == o).count();
        let horizontal_count = count_of(Orientation::Horizontal);
        let vertical_count = count_of(Orientation::Vertical);
        let diagonal_count = count_of(Orientation::Diagonal);

        SaccadeTotals {
            count: rows.len(),
            frequency: frequency(rows.len(), duration),
            horizontal_count,
            vertical_count,
            diagonal_count,
            horizontal_frequency: frequency(horizontal_count, duration),
            vertical_frequency: frequency(vertical_count, duration),
            diagonal_frequency: frequency(diagonal_count, duration),
            mean_duration: nan_mean(rows.iter().map(|r| r.duration)),
            mean_amplitude: nan_mean(rows.iter().map(|r| r.amplitude)),
            mean_peak_velocity: nan_mean(rows.iter().map(|r| r.peak_velocity)),
            mean_velocity: nan_mean(rows.iter().map(|r| r.mean_velocity)),
        }
    }

    pub fn fixation_totals(&self, rows: &[FixationRow], duration: f64) -> FixationTotals {
        FixationTotals {
            count: rows.len(),
            frequency: frequency(rows.len(), duration),
            total_duration: nan_sum(rows.iter().map(|r| r.duration)),
            mean_duration: nan_mean(rows.iter().map(|r| r.duration)),
            total_area: nan_sum(rows.iter().map(|r| r.area)),
            mean_area: nan_mean(rows.iter().map(|r| r.area)),
        }
    }

    /// Event rows and totals for a classified trajectory
    pub fn summarize(&self, samples: &[Sample]) -> EventSummary {
        let total_duration = duration(samples);
        let saccades = self.saccades(samples);
        let fixations = self.fixations(samples);
        EventSummary {
            saccade_totals: self.saccade_totals(&saccades, total_duration),
            fixation_totals: self.fixation_totals(&fixations, total_duration),
            saccades,
            fixations,
        }
    }
}

/// Spatial extent of a fixation in square degrees
pub fn fixation_area(samples: &[Sample]) -> f64 {
    if samples.len() < MIN_AREA_SAMPLES {
        return f64::NAN;
    }
    let points: Vec<Point2> = samples
        .iter()
        .map(|s| {
            let (x, y) = s.angular();
            Point2::new(x, y)
        })
        .collect();

    if points.len() < HULL_SAMPLES {
        fan_area(&points)
    } else {
        fan_area(&graham_scan(&points))
    }
}
