//! Detector Module - bot classification engine
//!
//! Data preparation, decision-tree training, model persistence and
//! single-record prediction. Everything here is synchronous; the HTTP layer
//! runs it on the blocking pool.

pub mod artifact;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod loader;
pub mod predictor;
pub mod prepare;
pub mod split;
pub mod store;
pub mod trainer;
pub mod tree;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export common types
pub use artifact::TrainingMetrics;
pub use encoding::EncodingMode;
pub use error::DetectorError;
pub use loader::ModelLoader;
pub use predictor::PredictionResult;
pub use store::{FileModelStore, ModelStore};
pub use trainer::TrainingOptions;
pub use tree::{SplitCriterion, TreeParams};
