//! Persisted model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::encoding::CategoryEncoding;
use super::tree::DecisionTreeClassifier;

/// Held-out evaluation of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub train_rows: usize,
    pub test_rows: usize,
    /// `None` when the test partition is empty
    pub test_accuracy: Option<f64>,
    pub classes: Vec<i64>,
}

/// A fitted tree with everything needed to score new records
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub encoding: CategoryEncoding,
    pub tree: DecisionTreeClassifier,
    pub metrics: TrainingMetrics,
}

impl ModelArtifact {
    pub fn new(encoding: CategoryEncoding, tree: DecisionTreeClassifier, metrics: TrainingMetrics) -> Self {
        Self {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            encoding,
            tree,
            metrics,
        }
    }

    /// Feature schema, in model column order
    pub fn feature_schema(&self) -> &[String] {
        self.tree.feature_names()
    }
}
