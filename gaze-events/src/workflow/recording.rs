//! Recording Files
//!
//! Gaze recordings on disk are JSON. Either a bare array of samples
//! (`[{"time": .., "x": .., "y": ..}, ...]`) or a full recording object with
//! metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::Sample;

/// Current recording format version
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

/// Recording metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingMetadata {
    /// Short name, used as the trajectory key
    pub name: String,
    /// File the samples were read from
    pub source: Option<String>,
    /// When the samples were imported
    pub imported_at: DateTime<Utc>,
    /// Number of samples
    pub sample_count: usize,
    /// Time span covered by the samples, in recording units
    pub duration: f64,
    /// Version of the recording format
    pub format_version: String,
}

impl RecordingMetadata {
    pub fn new(name: String) -> Self {
        Self {
            name,
            source: None,
            imported_at: Utc::now(),
            sample_count: 0,
            duration: 0.0,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }
}

impl Default for RecordingMetadata {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// A named gaze recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub metadata: RecordingMetadata,
    pub samples: Vec<Sample>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordingFile {
    Full(Recording),
    Bare(Vec<Sample>),
}

/// File stem of a path, the default recording name
pub fn shortname(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string())
}

impl Recording {
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        let mut metadata = RecordingMetadata::new(name.into());
        metadata.sample_count = samples.len();
        metadata.duration = span(&samples);
        Self { metadata, samples }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Save recording to a file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a recording.
    ///
    /// Bare sample arrays are named after the file stem. Logs a warning if
    /// a full recording was saved with an unknown format version.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut recording = match serde_json::from_str::<RecordingFile>(&content)? {
            RecordingFile::Full(recording) => {
                if recording.metadata.format_version != CURRENT_FORMAT_VERSION {
                    tracing::warn!(
                        name = %recording.metadata.name,
                        found = %recording.metadata.format_version,
                        expected = CURRENT_FORMAT_VERSION,
                        "Recording has different format version; some fields may use default values"
                    );
                }
                recording
            }
            RecordingFile::Bare(samples) => Self::new(shortname(path), samples),
        };

        if recording.metadata.name.is_empty() {
            recording.metadata.name = shortname(path);
        }
        recording.metadata.source = Some(path.display().to_string());
        tracing::debug!(
            name = %recording.metadata.name,
            samples = recording.samples.len(),
            "Loaded recording"
        );
        Ok(recording)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn span(samples: &[Sample]) -> f64 {
    let min = samples.iter().map(|s| s.time).fold(f64::INFINITY, f64::min);
    let max = samples.iter().map(|s| s.time).fold(f64::NEG_INFINITY, f64::max);
    if samples.is_empty() {
        0.0
    } else {
        max - min
    }
}
