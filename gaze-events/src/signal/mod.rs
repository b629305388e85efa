//! Signal preprocessing
//!
//! Time normalisation, coordinate de-normalisation and smoothing filters
//! applied before any angular computation.

pub mod preprocess;
pub mod savgol;

pub use preprocess::{fill_gaps, preprocess, rolling, RollingStat};
pub use savgol::SavitzkyGolay;
