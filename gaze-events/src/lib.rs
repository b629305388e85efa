//! # Gaze Events
//!
//! Turns raw gaze-tracking recordings (timestamp, screen x/y) into classified
//! oculomotor events, area-of-interest transition statistics and comparative
//! scores used to tell viewing behaviours apart.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gaze_events::{Config, Sample, Trajectory};
//!
//! let samples: Vec<Sample> = (0..200)
//!     .map(|i| Sample::new(i as f64 * 4.0, 0.5, 0.5))
//!     .collect();
//!
//! let mut trajectory = Trajectory::new("subject_01", samples, Config::default())
//!     .expect("valid configuration");
//! let report = trajectory.analyze().expect("pipeline runs");
//!
//! println!("{} fixations, entropy {:.3}", report.fixations.len(), report.entropy);
//! ```
//!
//! ## Architecture
//!
//! - [`signal`]: time normalisation, de-normalisation and smoothing filters
//! - [`analysis`]: visual-angle kinematics, I-VT classification, event parameters
//! - [`aoi`]: AOI grids, transition matrices, class models
//! - [`workflow`]: per-trajectory pipeline and the parallel corpus layer
//! - [`app`]: CLI and configuration management
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Samples   │───▶│ Preprocess  │───▶│  Angular    │───▶│    I-VT     │
//! │ (t, x, y)   │    │ (smoothing) │    │ kinematics  │    │ classifier  │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                           │                                     │
//!                           ▼                                     ▼
//!                    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//!                    │ AOI grid    │───▶│ Transition  │    │   Event     │
//!                    │ partition   │    │   model     │    │ summaries   │
//!                    └─────────────┘    └─────────────┘    └─────────────┘
//! ```

pub mod types;
pub mod signal;
pub mod analysis;
pub mod aoi;
pub mod app;
pub mod workflow;

// Re-export commonly used types
pub use app::config::Config;
pub use types::{EventLabel, Orientation, Sample};
pub use aoi::{AoiGrid, ClassModel, TransitionModel};
pub use workflow::{Corpus, CorpusReport, Trajectory, TrajectoryReport};

/// Result type alias for the gaze event pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the gaze event pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
