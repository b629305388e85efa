//! Areas of interest
//!
//! Spatial partitioning of gaze sequences and the Markov models built on
//! top of it:
//! - Uniform grid and rectangle cells with a catch-all for off-screen gaze
//! - Transition count / probability / log-probability matrices
//! - Per-class pooled models for trajectory classification
//! - Stimulus informativity

pub mod rectangle;
pub mod grid;
pub mod transition;
pub mod class_model;
pub mod stimulus;

pub use rectangle::Rectangle;
pub use grid::{group_by_time, AoiGrid};
pub use transition::{TransitionModel, LOG_ZERO_SENTINEL};
pub use class_model::{ClassModel, ClassScores};
pub use stimulus::{Informativity, Stimulus};
