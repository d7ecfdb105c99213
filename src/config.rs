//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::detector::{EncodingMode, SplitCriterion, TrainingOptions, TreeParams};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Where the fitted model is persisted
    pub model_path: PathBuf,

    /// Default training dataset (CSV)
    pub training_data_path: PathBuf,

    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the train/test shuffle
    pub random_seed: u64,

    /// Split quality measure for the decision tree
    pub split_criterion: SplitCriterion,

    /// Optional depth limit for the decision tree
    pub max_depth: Option<usize>,

    /// How the boolean-like profile columns are encoded
    pub category_encoding: EncodingMode,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            model_path: PathBuf::from("model/bot_detector.json"),
            training_data_path: PathBuf::from("training_data_2_csv_UTF.csv"),
            test_size: 0.25,
            random_seed: 42,
            split_criterion: SplitCriterion::Entropy,
            max_depth: None,
            category_encoding: EncodingMode::Canonical,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parsed("PORT").unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            training_data_path: env::var("TRAINING_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.training_data_path),

            test_size: parsed::<f64>("TEST_SIZE")
                .filter(|t| (0.0..1.0).contains(t))
                .unwrap_or(defaults.test_size),

            random_seed: parsed("RANDOM_SEED").unwrap_or(defaults.random_seed),

            split_criterion: parsed("SPLIT_CRITERION").unwrap_or(defaults.split_criterion),

            max_depth: parsed::<usize>("MAX_DEPTH").filter(|d| *d > 0),

            category_encoding: parsed("CATEGORY_ENCODING").unwrap_or(defaults.category_encoding),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Training options derived from this configuration
    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            test_size: self.test_size,
            random_seed: self.random_seed,
            tree: TreeParams {
                criterion: self.split_criterion,
                max_depth: self.max_depth,
                ..Default::default()
            },
            encoding: self.category_encoding,
        }
    }
}

/// Parse an environment variable, ignoring absent or malformed values
fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
