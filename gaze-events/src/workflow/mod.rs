//! Workflow Module
//!
//! Orchestrates the pipeline from a loaded recording to per-trajectory and
//! corpus-level reports.

pub mod recording;
pub mod trajectory;
pub mod corpus;

pub use recording::{Recording, RecordingMetadata};
pub use trajectory::{Stage, Trajectory, TrajectoryReport};
pub use corpus::{fit_class_model, Corpus, CorpusReport, ScoreTable};
