//! Trainer - fits and persists the bot classifier

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::artifact::{ModelArtifact, TrainingMetrics};
use super::dataset::{Cell, Table};
use super::encoding::{category_token, CategoryEncoding, EncodingMode};
use super::error::{DetectorError, DetectorResult};
use super::prepare::{prepare, ID_COLUMN, TARGET_COLUMN};
use super::split::train_test_split;
use super::store::ModelStore;
use super::tree::{DecisionTreeClassifier, TreeParams};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOptions {
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    pub random_seed: u64,
    pub tree: TreeParams,
    pub encoding: EncodingMode,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            test_size: 0.25,
            random_seed: 42,
            tree: TreeParams::default(),
            encoding: EncodingMode::Canonical,
        }
    }
}

/// Train on the CSV at `path` and persist the result
pub fn train_model(
    path: &Path,
    store: &dyn ModelStore,
    options: &TrainingOptions,
) -> DetectorResult<ModelArtifact> {
    tracing::info!("Training model from {}", path.display());
    let start = Instant::now();

    let table = Table::from_csv_path(path)?;
    let artifact = fit_table(table, options)?;
    store.save(&artifact)?;

    tracing::info!(
        "Model {} trained in {:?}: {} train / {} test rows, test accuracy {}",
        artifact.model_id,
        start.elapsed(),
        artifact.metrics.train_rows,
        artifact.metrics.test_rows,
        artifact
            .metrics
            .test_accuracy
            .map(|a| format!("{:.3}", a))
            .unwrap_or_else(|| "n/a".to_string()),
    );
    Ok(artifact)
}

/// Fit a model on an in-memory table without persisting it
pub fn fit_table(table: Table, options: &TrainingOptions) -> DetectorResult<ModelArtifact> {
    if table.is_empty() {
        return Err(DetectorError::EmptyDataset);
    }

    let encoding = CategoryEncoding::fit(options.encoding, &table);
    let mut prepared = prepare(table, &encoding)?.table;

    prepared.remove_column(ID_COLUMN);
    let labels = prepared
        .remove_column(TARGET_COLUMN)
        .ok_or_else(|| DetectorError::MissingTarget(TARGET_COLUMN.to_string()))?;
    let labels = labels
        .iter()
        .map(parse_label)
        .collect::<DetectorResult<Vec<i64>>>()?;

    let feature_names = prepared.columns().to_vec();
    if feature_names.is_empty() {
        return Err(DetectorError::NoFeatures);
    }

    let mut missing = 0usize;
    let mut x = Vec::with_capacity(prepared.n_rows());
    for row in prepared.rows() {
        let values = row
            .iter()
            .zip(&feature_names)
            .map(|(cell, name)| {
                if cell.is_missing() {
                    missing += 1;
                }
                cell.to_feature(name)
            })
            .collect::<DetectorResult<Vec<f64>>>()?;
        x.push(values);
    }
    if missing > 0 {
        tracing::warn!("{} missing feature value(s) filled with 0", missing);
    }

    let split = train_test_split(x.len(), options.test_size, options.random_seed)?;
    let x_train: Vec<Vec<f64>> = split.train.iter().map(|&i| x[i].clone()).collect();
    let y_train: Vec<i64> = split.train.iter().map(|&i| labels[i]).collect();

    let mut tree = DecisionTreeClassifier::new(TreeParams {
        seed: Some(options.random_seed),
        ..options.tree.clone()
    });
    tree.fit(feature_names, &x_train, &y_train)?;

    let test_accuracy = if split.test.is_empty() {
        None
    } else {
        let mut correct = 0usize;
        for &i in &split.test {
            if tree.predict(&x[i])? == labels[i] {
                correct += 1;
            }
        }
        Some(correct as f64 / split.test.len() as f64)
    };

    let metrics = TrainingMetrics {
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        test_accuracy,
        classes: tree.classes().to_vec(),
    };

    Ok(ModelArtifact::new(encoding, tree, metrics))
}

/// Target cell to an integer class label
fn parse_label(cell: &Cell) -> DetectorResult<i64> {
    let invalid = || DetectorError::InvalidLabel {
        column: TARGET_COLUMN.to_string(),
        value: cell.to_string(),
    };
    match cell {
        Cell::Number(n) if n.fract() == 0.0 => Ok(*n as i64),
        Cell::Text(_) => match category_token(cell).as_str() {
            "True" => Ok(1),
            "False" => Ok(0),
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}
