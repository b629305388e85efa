//! Configuration Management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Experiment geometry and input normalisation
    pub common: CommonConfig,
    /// Coordinate smoothing (absent = no smoothing)
    #[serde(default)]
    pub smoothing: Option<SmoothingConfig>,
    /// Angular velocity computation
    #[serde(default)]
    pub velocity: VelocityConfig,
    /// Oculomotor event detection
    #[serde(default)]
    pub oculus: OculusConfig,
    /// AOI grid and transition model
    #[serde(default)]
    pub aoi: AoiConfig,
}

/// Experiment settings shared by every stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonConfig {
    /// Physical screen size (width, height), same unit as `distance`
    pub size: [f64; 2],
    /// Screen resolution in pixels (width, height)
    pub resolution: [f64; 2],
    /// Eye-to-screen distance
    pub distance: f64,
    /// Shift timestamps so the first one is 0
    pub adjust_time: bool,
    /// Coordinates were recorded in the 0..1 range
    pub normalized: bool,
    /// Calibration point in pixels; screen centre when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_point: Option<[f64; 2]>,
}

/// Smoothing filter family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingMethod {
    /// Rolling median
    #[serde(alias = "med")]
    Median,
    /// Rolling mean
    #[serde(alias = "avg", alias = "average")]
    Mean,
    /// Savitzky-Golay polynomial filter
    Savgol,
}

/// Coordinate smoothing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Window length in samples
    pub window: usize,
    /// Centre the rolling window on the sample (rolling methods only)
    pub center: bool,
    /// Filter family
    pub method: SmoothingMethod,
    /// Polynomial order (savgol only)
    pub order: usize,
    /// Back-fill then forward-fill gaps left at the boundaries
    pub fillna: bool,
}

/// How angular displacement is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityType {
    /// First derivative of a Savitzky-Golay filter (order 2)
    Analytical,
    /// Per-sample difference
    FiniteDifference,
}

/// Angular velocity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VelocityConfig {
    /// Displacement method
    pub velocity_type: VelocityType,
    /// Savitzky-Golay window (analytical only)
    pub window: usize,
}

/// Event detection algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionMethod {
    /// Identification by velocity threshold
    #[serde(rename = "IVT")]
    Ivt,
    /// Identification by dispersion threshold
    #[serde(rename = "IDT")]
    Idt,
    /// Adaptive noise-based detection
    #[serde(rename = "ANH")]
    Anh,
}

/// Oculomotor event detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OculusConfig {
    /// Detector
    pub method: DetectionMethod,
    /// Saccade velocity threshold (degrees per time unit)
    pub velocity_threshold: f64,
    /// Odd window for rolling-median label de-noising
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_smoothing_window: Option<usize>,
}

/// AOI grid configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AoiConfig {
    /// Grid columns
    pub cols: usize,
    /// Grid rows
    pub rows: usize,
    /// Compress samples into groups of this duration before mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_duration: Option<f64>,
    /// Keep the catch-all cell for points outside the screen
    pub include_outside: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            common: CommonConfig::default(),
            smoothing: Some(SmoothingConfig::default()),
            velocity: VelocityConfig::default(),
            oculus: OculusConfig::default(),
            aoi: AoiConfig::default(),
        }
    }
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            size: [59.0, 33.0],
            resolution: [1920.0, 1080.0],
            distance: 50.0,
            adjust_time: true,
            normalized: true,
            reference_point: None,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: 33,
            center: true,
            method: SmoothingMethod::Median,
            order: 2,
            fillna: true,
        }
    }
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            velocity_type: VelocityType::Analytical,
            window: 13,
        }
    }
}

impl Default for OculusConfig {
    fn default() -> Self {
        Self {
            method: DetectionMethod::Ivt,
            velocity_threshold: 30.0,
            label_smoothing_window: None,
        }
    }
}

impl Default for AoiConfig {
    fn default() -> Self {
        Self {
            cols: 5,
            rows: 5,
            group_duration: None,
            include_outside: true,
        }
    }
}

fn positive_pair(name: &str, pair: [f64; 2]) -> Result<(), crate::Error> {
    if pair.iter().all(|v| v.is_finite() && *v > 0.0) {
        Ok(())
    } else {
        Err(crate::Error::Config(format!(
            "{} must be two positive numbers, got {:?}", name, pair
        )))
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        positive_pair("common.size", self.common.size)?;
        positive_pair("common.resolution", self.common.resolution)?;
        if !self.common.distance.is_finite() || self.common.distance <= 0.0 {
            return Err(crate::Error::Config(format!(
                "common.distance must be positive, got {}", self.common.distance
            )));
        }
        if let Some(point) = self.common.reference_point {
            if !point.iter().all(|v| v.is_finite()) {
                return Err(crate::Error::Config(format!(
                    "common.reference_point must be finite, got {:?}", point
                )));
            }
        }

        if let Some(smoothing) = &self.smoothing {
            if smoothing.window == 0 {
                return Err(crate::Error::Config("smoothing.window must be > 0".to_string()));
            }
            if smoothing.method == SmoothingMethod::Savgol {
                if smoothing.window % 2 == 0 {
                    return Err(crate::Error::Config(format!(
                        "smoothing.window must be odd for savgol, got {}", smoothing.window
                    )));
                }
                if smoothing.order >= smoothing.window {
                    return Err(crate::Error::Config(format!(
                        "smoothing.order must be less than window ({}), got {}",
                        smoothing.window, smoothing.order
                    )));
                }
            }
        }

        if self.velocity.velocity_type == VelocityType::Analytical
            && (self.velocity.window < 3 || self.velocity.window % 2 == 0)
        {
            return Err(crate::Error::Config(format!(
                "velocity.window must be odd and >= 3, got {}", self.velocity.window
            )));
        }

        if !self.oculus.velocity_threshold.is_finite() {
            return Err(crate::Error::Config(format!(
                "oculus.velocity_threshold must be finite, got {}", self.oculus.velocity_threshold
            )));
        }
        if let Some(window) = self.oculus.label_smoothing_window {
            if window == 0 || window % 2 == 0 {
                return Err(crate::Error::Config(format!(
                    "oculus.label_smoothing_window must be odd, got {}", window
                )));
            }
        }

        if self.aoi.cols == 0 || self.aoi.rows == 0 {
            return Err(crate::Error::Config(format!(
                "aoi grid must have at least one cell, got {}x{}", self.aoi.cols, self.aoi.rows
            )));
        }
        if let Some(duration) = self.aoi.group_duration {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(crate::Error::Config(format!(
                    "aoi.group_duration must be positive, got {}", duration
                )));
            }
        }
        Ok(())
    }

    /// Check the filter windows against a recording of `len` samples
    pub fn validate_length(&self, len: usize) -> Result<(), crate::Error> {
        if let Some(smoothing) = &self.smoothing {
            if smoothing.window > len {
                return Err(crate::Error::Config(format!(
                    "smoothing.window ({}) exceeds sequence length ({})", smoothing.window, len
                )));
            }
        }
        if self.velocity.velocity_type == VelocityType::Analytical && self.velocity.window > len {
            return Err(crate::Error::Config(format!(
                "velocity.window ({}) exceeds sequence length ({})", self.velocity.window, len
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, crate::Error> {
        let config: Self = toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gaze_events").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Look up a dotted key such as `oculus.velocity_threshold`
    pub fn get(&self, key: &str) -> Result<Option<toml::Value>, crate::Error> {
        let root = toml::Value::try_from(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        Ok(key
            .split('.')
            .try_fold(&root, |value, part| value.get(part))
            .cloned())
    }
}
