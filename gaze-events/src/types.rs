//! Core data types shared by every pipeline stage.

use serde::{Deserialize, Serialize};

/// One gaze sample.
///
/// `time`, `x` and `y` come from the recording. The remaining fields are
/// filled in by the pipeline stages in order and stay `None` until the stage
/// that owns them has run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Timestamp in recording units
    pub time: f64,
    /// Horizontal point of regard (pixels, or 0..1 when normalized)
    pub x: f64,
    /// Vertical point of regard (pixels, or 0..1 when normalized)
    pub y: f64,
    /// Pupil size along x, carried through smoothing only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pupil_x: Option<f64>,
    /// Pupil size along y, carried through smoothing only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pupil_y: Option<f64>,
    /// Horizontal visual angle (degrees)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_x: Option<f64>,
    /// Vertical visual angle (degrees)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_y: Option<f64>,
    /// Angular velocity (degrees per time unit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_velocity: Option<f64>,
    /// Angular acceleration (degrees per time unit squared)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_acceleration: Option<f64>,
    /// Oculomotor event label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventLabel>,
    /// Event group, starts at 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u32>,
    /// AOI cell id, starts at 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aoi_id: Option<u32>,
}

impl Sample {
    pub fn new(time: f64, x: f64, y: f64) -> Self {
        Self {
            time,
            x,
            y,
            pupil_x: None,
            pupil_y: None,
            angular_x: None,
            angular_y: None,
            angular_velocity: None,
            angular_acceleration: None,
            event: None,
            group_id: None,
            aoi_id: None,
        }
    }

    /// Attach pupil sizes
    pub fn with_pupil(mut self, pupil_x: f64, pupil_y: f64) -> Self {
        self.pupil_x = Some(pupil_x);
        self.pupil_y = Some(pupil_y);
        self
    }

    /// Angular coordinates, `NaN` before kinematics ran
    pub fn angular(&self) -> (f64, f64) {
        (
            self.angular_x.unwrap_or(f64::NAN),
            self.angular_y.unwrap_or(f64::NAN),
        )
    }

    /// Angular velocity, `NaN` before kinematics ran
    pub fn velocity(&self) -> f64 {
        self.angular_velocity.unwrap_or(f64::NAN)
    }
}

/// Label assigned to each sample by the event classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventLabel {
    Fixation,
    Saccade,
}

impl EventLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixation => "Fixation",
            Self::Saccade => "Saccade",
        }
    }

    pub fn is_fixation(&self) -> bool {
        matches!(self, Self::Fixation)
    }
}

/// Saccade direction class derived from the start/end slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
    Diagonal,
}

impl Orientation {
    /// Classify a slope `dy / dx`.
    ///
    /// Thresholds are asymmetric around the 45° slope: `d >= 2` is vertical,
    /// `d <= 0.5` horizontal, everything else (including `NaN`) diagonal.
    pub fn from_slope(d: f64) -> Self {
        if d >= 2.0 {
            Self::Vertical
        } else if d <= 0.5 {
            Self::Horizontal
        } else {
            Self::Diagonal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sample_has_no_derived_fields() {
        let s = Sample::new(1.0, 2.0, 3.0);
        assert!(s.angular_x.is_none());
        assert!(s.event.is_none());
        assert!(s.velocity().is_nan());
        let (ax, ay) = s.angular();
        assert!(ax.is_nan() && ay.is_nan());
    }

    #[test]
    fn test_orientation_thresholds() {
        assert_eq!(Orientation::from_slope(2.0), Orientation::Vertical);
        assert_eq!(Orientation::from_slope(10.0), Orientation::Vertical);
        assert_eq!(Orientation::from_slope(0.5), Orientation::Horizontal);
        assert_eq!(Orientation::from_slope(-3.0), Orientation::Horizontal);
        assert_eq!(Orientation::from_slope(1.0), Orientation::Diagonal);
        assert_eq!(Orientation::from_slope(f64::NAN), Orientation::Diagonal);
        assert_eq!(Orientation::from_slope(f64::INFINITY), Orientation::Vertical);
        assert_eq!(Orientation::from_slope(f64::NEG_INFINITY), Orientation::Horizontal);
    }

    #[test]
    fn test_sample_json_roundtrip_minimal() {
        let s: Sample = serde_json::from_str(r#"{"time": 0.5, "x": 10.0, "y": 20.0}"#).unwrap();
        assert_eq!(s.time, 0.5);
        assert!(s.pupil_x.is_none());

        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("angular_x"));
    }

    #[test]
    fn test_event_label_names() {
        assert_eq!(EventLabel::Fixation.as_str(), "Fixation");
        assert!(EventLabel::Fixation.is_fixation());
        assert!(!EventLabel::Saccade.is_fixation());
    }
}
