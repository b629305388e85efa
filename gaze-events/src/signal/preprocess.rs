//! Signal Preprocessing
//!
//! Prepares a raw recording for the angular stage: shifts time to start at
//! zero, rescales normalized coordinates to pixels and smooths every
//! non-time column with one rolling/polynomial filter.

use tracing::debug;

use super::savgol::SavitzkyGolay;
use crate::app::config::{CommonConfig, SmoothingConfig, SmoothingMethod};
use crate::types::Sample;
use crate::{Error, Result};

/// Statistic computed over a rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingStat {
    Median,
    Mean,
}

/// Rolling statistic with a fixed, full window.
///
/// Positions where the window does not fit inside the signal, or where it
/// covers a `NaN`, produce `NaN`. A centred window for index `i` spans
/// `[i + offset + 1 - window, i + offset]` with `offset = (window - 1) / 2`.
pub fn rolling(values: &[f64], window: usize, center: bool, stat: RollingStat) -> Vec<f64> {
    let n = values.len();
    if window == 0 {
        return vec![f64::NAN; n];
    }
    let offset = if center { (window - 1) / 2 } else { 0 };

    (0..n)
        .map(|i| {
            let end = i + offset + 1;
            if end < window || end > n {
                return f64::NAN;
            }
            let slice = &values[end - window..end];
            if slice.iter().any(|v| v.is_nan()) {
                return f64::NAN;
            }
            match stat {
                RollingStat::Mean => slice.iter().sum::<f64>() / window as f64,
                RollingStat::Median => median(slice),
            }
        })
        .collect()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Back-fill then forward-fill missing values in place.
///
/// A column with at least one valid value has no gaps afterwards; an
/// all-`NaN` column is left untouched.
pub fn fill_gaps(values: &mut [f64]) {
    let mut next = f64::NAN;
    for v in values.iter_mut().rev() {
        if v.is_nan() {
            *v = next;
        } else {
            next = *v;
        }
    }

    let mut prev = f64::NAN;
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = prev;
        } else {
            prev = *v;
        }
    }
}

/// Shift timestamps so the minimum is exactly 0
pub fn adjust_time(samples: &mut [Sample]) {
    let min_t = samples.iter().map(|s| s.time).fold(f64::INFINITY, f64::min);
    if min_t.is_finite() {
        for s in samples.iter_mut() {
            s.time -= min_t;
        }
    }
}

/// Rescale 0..1 coordinates to pixel resolution
pub fn denormalize(samples: &mut [Sample], resolution: [f64; 2]) {
    for s in samples.iter_mut() {
        s.x *= resolution[0];
        s.y *= resolution[1];
    }
}

/// Smooth a single column with the configured method
pub fn smooth_column(values: &[f64], config: &SmoothingConfig) -> Result<Vec<f64>> {
    if config.window == 0 || config.window > values.len() {
        return Err(Error::Config(format!(
            "smoothing window ({}) must be between 1 and the sequence length ({})",
            config.window,
            values.len()
        )));
    }

    let mut smoothed = match config.method {
        SmoothingMethod::Median => rolling(values, config.window, config.center, RollingStat::Median),
        SmoothingMethod::Mean => rolling(values, config.window, config.center, RollingStat::Mean),
        SmoothingMethod::Savgol => SavitzkyGolay::new(config.window, config.order)?.apply(values)?,
    };

    if config.fillna {
        fill_gaps(&mut smoothed);
    }
    Ok(smoothed)
}

/// Run time adjustment, de-normalisation and smoothing on a copy of the
/// samples
pub fn preprocess(
    samples: &[Sample],
    common: &CommonConfig,
    smoothing: Option<&SmoothingConfig>,
) -> Result<Vec<Sample>> {
    let mut out = samples.to_vec();

    if common.adjust_time {
        adjust_time(&mut out);
    }
    if common.normalized {
        denormalize(&mut out, common.resolution);
    }

    let Some(config) = smoothing else {
        return Ok(out);
    };

    let xs: Vec<f64> = out.iter().map(|s| s.x).collect();
    let ys: Vec<f64> = out.iter().map(|s| s.y).collect();
    let xs = smooth_column(&xs, config)?;
    let ys = smooth_column(&ys, config)?;
    for (s, (x, y)) in out.iter_mut().zip(xs.into_iter().zip(ys)) {
        s.x = x;
        s.y = y;
    }

    // Pupil columns only take part when every sample carries them
    if out.iter().all(|s| s.pupil_x.is_some() && s.pupil_y.is_some()) {
        let px: Vec<f64> = out.iter().map(|s| s.pupil_x.unwrap_or(f64::NAN)).collect();
        let py: Vec<f64> = out.iter().map(|s| s.pupil_y.unwrap_or(f64::NAN)).collect();
        let px = smooth_column(&px, config)?;
        let py = smooth_column(&py, config)?;
        for (s, (x, y)) in out.iter_mut().zip(px.into_iter().zip(py)) {
            s.pupil_x = Some(x);
            s.pupil_y = Some(y);
        }
    }

    debug!(
        samples = out.len(),
        method = ?config.method,
        window = config.window,
        "Smoothed gaze coordinates"
    );

    Ok(out)
}
