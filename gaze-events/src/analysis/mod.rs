//! Oculomotor analysis
//!
//! Turns preprocessed gaze samples into classified events using:
//! - Visual-angle projection and angular kinematics
//! - I-VT fixation/saccade classification
//! - Per-event parameters (amplitude, curvature, convex-hull area)

pub mod geometry;
pub mod kinematics;
pub mod classifier;
pub mod summary;

pub use geometry::{graham_scan, Point2};
pub use kinematics::{AngularKinematics, VisualAngleProjection};
pub use classifier::EventClassifier;
pub use summary::{EventSummarizer, EventSummary, FixationRow, SaccadeRow};
