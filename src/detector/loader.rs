//! Model Loader - returns the persisted model, training one on first use

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use super::artifact::ModelArtifact;
use super::error::DetectorResult;
use super::store::ModelStore;
use super::trainer::{train_model, TrainingOptions};

pub struct ModelLoader {
    store: Arc<dyn ModelStore>,
    training_data: PathBuf,
    options: TrainingOptions,
    training: Mutex<()>,
}

impl ModelLoader {
    pub fn new(store: Arc<dyn ModelStore>, training_data: impl Into<PathBuf>, options: TrainingOptions) -> Self {
        Self {
            store,
            training_data: training_data.into(),
            options,
            training: Mutex::new(()),
        }
    }

    /// Load the stored model, or train and store one if there is none.
    ///
    /// The store is consulted on every call. Concurrent callers that find
    /// no model wait on a single training run.
    pub fn get_model(&self) -> DetectorResult<ModelArtifact> {
        if self.store.exists() {
            return self.store.load();
        }

        let _guard = self.training.lock();
        if self.store.exists() {
            return self.store.load();
        }

        tracing::info!("No model at {}, training a new one", self.store.location());
        train_model(&self.training_data, self.store.as_ref(), &self.options)
    }

    /// Retrain on the default dataset, replacing the stored model
    pub fn retrain(&self) -> DetectorResult<ModelArtifact> {
        let _guard = self.training.lock();
        train_model(&self.training_data, self.store.as_ref(), &self.options)
    }
}
