//! Predictor - scores a single account record
//!
//! A submitted record rarely carries every training column, and the tree
//! needs exactly its fitted columns in fitted order, so every record is
//! aligned to the model's feature schema before scoring.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::artifact::ModelArtifact;
use super::dataset::Cell;
use super::error::{DetectorError, DetectorResult};
use super::loader::ModelLoader;
use super::prepare::ID_COLUMN;

/// Account id reported when the record has none
pub const UNKNOWN_ACCOUNT: &str = "Unknown";

/// Probabilities reported when the model cannot estimate them
pub const FALLBACK_PROBABILITY: [f64; 2] = [0.5, 0.5];

/// Named feature values in column order
pub type FeatureRow = Vec<(String, Cell)>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub account_id: Value,
    pub is_bot: bool,
    pub confidence: f64,
    pub probability: Vec<f64>,
}

/// Columns touched while aligning a row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alignment {
    /// Schema columns missing from the row, filled with 0
    pub filled: Vec<String>,
    /// Row columns outside the schema, removed
    pub dropped: Vec<String>,
}

impl Alignment {
    pub fn is_noop(&self) -> bool {
        self.filled.is_empty() && self.dropped.is_empty()
    }
}

/// Reshape `row` to exactly the `schema` columns, in schema order
pub fn align_features(row: &[(String, Cell)], schema: &[String]) -> (FeatureRow, Alignment) {
    let values: HashMap<&str, &Cell> = row.iter().map(|(k, v)| (k.as_str(), v)).collect();

    let mut alignment = Alignment::default();
    let aligned = schema
        .iter()
        .map(|name| match values.get(name.as_str()) {
            Some(cell) => (name.clone(), (*cell).clone()),
            None => {
                alignment.filled.push(name.clone());
                (name.clone(), Cell::Number(0.0))
            }
        })
        .collect();

    alignment.dropped = row
        .iter()
        .filter(|(name, _)| !schema.contains(name))
        .map(|(name, _)| name.clone())
        .collect();

    (aligned, alignment)
}

/// Score a record with an already loaded model
pub fn predict_with(model: &ModelArtifact, account: &Map<String, Value>) -> DetectorResult<PredictionResult> {
    if account.is_empty() {
        return Err(DetectorError::EmptyRecord);
    }

    let account_id = account
        .get(ID_COLUMN)
        .cloned()
        .unwrap_or_else(|| Value::String(UNKNOWN_ACCOUNT.to_string()));

    let mut row: FeatureRow = account
        .iter()
        .filter(|(name, _)| name.as_str() != ID_COLUMN)
        .map(|(name, value)| (name.clone(), Cell::from_json(value)))
        .collect();

    model.encoding.apply_row(&mut row)?;

    let (aligned, alignment) = align_features(&row, model.feature_schema());
    if !alignment.is_noop() {
        tracing::debug!(
            "Aligned record {}: filled {:?}, dropped {:?}",
            account_id,
            alignment.filled,
            alignment.dropped
        );
    }

    let features = aligned
        .iter()
        .map(|(name, cell)| cell.to_feature(name))
        .collect::<DetectorResult<Vec<f64>>>()?;

    let label = model.tree.predict(&features)?;
    let probability = match model.tree.predict_proba(&features) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Probability estimate unavailable ({}), using fallback", e);
            FALLBACK_PROBABILITY.to_vec()
        }
    };
    let confidence = probability.iter().copied().fold(0.0, f64::max);

    Ok(PredictionResult {
        account_id,
        is_bot: label != 0,
        confidence,
        probability,
    })
}

/// Load the model through `loader` and score a record
pub fn predict(loader: &ModelLoader, account: &Map<String, Value>) -> DetectorResult<PredictionResult> {
    if account.is_empty() {
        return Err(DetectorError::EmptyRecord);
    }
    let model = loader.get_model()?;
    predict_with(&model, account)
}
