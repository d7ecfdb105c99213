//! Decision Tree Classifier
//!
//! Thin wrapper over smartcore's CART classifier. The wrapper owns what the
//! service needs around the fitted tree: the feature schema, the sorted class
//! labels, row-width checks and the binary-only probability contract.

use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier as CartClassifier, DecisionTreeClassifierParameters,
    SplitCriterion as CartCriterion,
};

use super::error::{DetectorError, DetectorResult};

type Cart = CartClassifier<f64, i64, DenseMatrix<f64>, Vec<i64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitCriterion {
    #[default]
    Entropy,
    Gini,
}

impl From<SplitCriterion> for CartCriterion {
    fn from(criterion: SplitCriterion) -> Self {
        match criterion {
            SplitCriterion::Entropy => CartCriterion::Entropy,
            SplitCriterion::Gini => CartCriterion::Gini,
        }
    }
}

impl std::str::FromStr for SplitCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entropy" => Ok(SplitCriterion::Entropy),
            "gini" => Ok(SplitCriterion::Gini),
            other => Err(format!("unknown split criterion '{}'", other)),
        }
    }
}

/// Tree hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub criterion: SplitCriterion,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            criterion: SplitCriterion::Entropy,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: None,
        }
    }
}

impl TreeParams {
    fn to_parameters(&self) -> DecisionTreeClassifierParameters {
        DecisionTreeClassifierParameters {
            criterion: self.criterion.into(),
            max_depth: self.max_depth.map(|d| u16::try_from(d).unwrap_or(u16::MAX)),
            min_samples_leaf: self.min_samples_leaf.max(1),
            min_samples_split: self.min_samples_split.max(2),
            seed: self.seed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
enum Fitted {
    /// Every training label was the same; smartcore needs two classes
    Constant(i64),
    Tree(Cart),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    params: TreeParams,
    feature_names: Vec<String>,
    classes: Vec<i64>,
    fitted: Option<Fitted>,
}

fn model_error(e: impl std::fmt::Display) -> DetectorError {
    DetectorError::Model(e.to_string())
}

fn single_row(row: &[f64]) -> DetectorResult<DenseMatrix<f64>> {
    DenseMatrix::from_2d_vec(&vec![row.to_vec()]).map_err(model_error)
}

impl DecisionTreeClassifier {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            feature_names: Vec::new(),
            classes: Vec::new(),
            fitted: None,
        }
    }

    /// Fit on row-major features `x` and labels `y`
    pub fn fit(&mut self, feature_names: Vec<String>, x: &[Vec<f64>], y: &[i64]) -> DetectorResult<()> {
        if x.is_empty() {
            return Err(DetectorError::EmptyDataset);
        }
        if feature_names.is_empty() {
            return Err(DetectorError::NoFeatures);
        }
        if let Some(row) = x.iter().find(|r| r.len() != feature_names.len()) {
            return Err(DetectorError::FeatureCountMismatch {
                expected: feature_names.len(),
                actual: row.len(),
            });
        }

        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let fitted = match classes.as_slice() {
            [only] => {
                tracing::warn!("All {} training labels are {}, fitting a constant model", y.len(), only);
                Fitted::Constant(*only)
            }
            _ => {
                let matrix = DenseMatrix::from_2d_vec(&x.to_vec()).map_err(model_error)?;
                let tree = Cart::fit(&matrix, &y.to_vec(), self.params.to_parameters()).map_err(model_error)?;
                Fitted::Tree(tree)
            }
        };

        tracing::debug!(
            "Fitted decision tree on {} rows, {} features, classes {:?}",
            x.len(),
            feature_names.len(),
            classes
        );
        self.feature_names = feature_names;
        self.classes = classes;
        self.fitted = Some(fitted);
        Ok(())
    }

    /// Feature schema the tree was fitted on
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Sorted class labels
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn fitted_for(&self, row: &[f64]) -> DetectorResult<&Fitted> {
        let fitted = self.fitted.as_ref().ok_or(DetectorError::NotFitted)?;
        if row.len() != self.feature_names.len() {
            return Err(DetectorError::FeatureCountMismatch {
                expected: self.feature_names.len(),
                actual: row.len(),
            });
        }
        Ok(fitted)
    }

    /// Predicted class label
    pub fn predict(&self, row: &[f64]) -> DetectorResult<i64> {
        match self.fitted_for(row)? {
            Fitted::Constant(class) => Ok(*class),
            Fitted::Tree(tree) => {
                let labels = tree.predict(&single_row(row)?).map_err(model_error)?;
                labels.first().copied().ok_or(DetectorError::NotFitted)
            }
        }
    }

    /// Probability of each class for a binary model
    pub fn predict_proba(&self, row: &[f64]) -> DetectorResult<Vec<f64>> {
        match self.fitted_for(row)? {
            Fitted::Tree(tree) if self.classes.len() == 2 => {
                let proba = tree.predict_proba(&single_row(row)?).map_err(model_error)?;
                Ok((0..self.classes.len()).map(|j| *proba.get((0, j))).collect())
            }
            _ => Err(DetectorError::ProbabilityUnavailable(self.classes.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    fn xor() -> (Vec<Vec<f64>>, Vec<i64>) {
        let x = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        (x, vec![0, 1, 1, 0])
    }

    #[test]
    fn test_learns_separable_data() {
        let x = vec![vec![1.0, 5.0], vec![2.0, 5.0], vec![8.0, 5.0], vec![9.0, 5.0]];
        let y = vec![0, 0, 1, 1];

        let mut tree = DecisionTreeClassifier::new(TreeParams::default());
        tree.fit(names(2), &x, &y).unwrap();

        assert_eq!(tree.classes(), &[0, 1]);
        assert_eq!(tree.predict(&[1.5, 0.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[7.0, 0.0]).unwrap(), 1);
        assert_eq!(tree.predict_proba(&[7.0, 0.0]).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_grows_through_zero_gain_splits() {
        // No single split of XOR data lowers entropy, yet the leaves can
        // still be made pure.
        let (x, y) = xor();
        let mut tree = DecisionTreeClassifier::new(TreeParams::default());
        tree.fit(names(2), &x, &y).unwrap();

        let predicted: Vec<i64> = x.iter().map(|row| tree.predict(row).unwrap()).collect();
        assert_eq!(predicted, y);
        assert_eq!(tree.predict_proba(&[0.0, 1.0]).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let (x, y) = xor();
        let params = TreeParams { max_depth: Some(1), ..Default::default() };
        let mut tree = DecisionTreeClassifier::new(params);
        tree.fit(names(2), &x, &y).unwrap();

        let correct = x
            .iter()
            .zip(&y)
            .filter(|(row, label)| tree.predict(row).unwrap() == **label)
            .count();
        assert!(correct < x.len());
    }

    #[test]
    fn test_threshold_is_midpoint() {
        let x = vec![vec![2.0], vec![4.0]];
        let mut tree = DecisionTreeClassifier::new(TreeParams::default());
        tree.fit(names(1), &x, &[0, 1]).unwrap();

        assert_eq!(tree.predict(&[2.9]).unwrap(), 0);
        assert_eq!(tree.predict(&[3.1]).unwrap(), 1);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![(i % 7) as f64, (i % 3) as f64]).collect();
        let y: Vec<i64> = (0..20).map(|i| if i % 5 == 0 { 1 } else { 0 }).collect();
        let params = TreeParams { max_depth: Some(2), ..Default::default() };

        let mut tree = DecisionTreeClassifier::new(params);
        tree.fit(names(2), &x, &y).unwrap();

        for row in &x {
            let proba = tree.predict_proba(row).unwrap();
            assert_eq!(proba.len(), 2);
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_class_has_no_probabilities() {
        let mut tree = DecisionTreeClassifier::new(TreeParams::default());
        tree.fit(names(1), &[vec![1.0], vec![2.0]], &[1, 1]).unwrap();

        assert_eq!(tree.predict(&[5.0]).unwrap(), 1);
        assert!(matches!(
            tree.predict_proba(&[5.0]),
            Err(DetectorError::ProbabilityUnavailable(1))
        ));
    }

    #[test]
    fn test_rejects_wrong_width() {
        let mut tree = DecisionTreeClassifier::new(TreeParams::default());
        assert!(matches!(tree.predict(&[1.0]), Err(DetectorError::NotFitted)));

        tree.fit(names(2), &[vec![1.0, 2.0], vec![3.0, 4.0]], &[0, 1]).unwrap();
        assert!(matches!(
            tree.predict(&[1.0]),
            Err(DetectorError::FeatureCountMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_gini_criterion() {
        let x = vec![vec![0.0], vec![0.0], vec![1.0], vec![1.0]];
        let params = TreeParams { criterion: SplitCriterion::Gini, ..Default::default() };
        let mut tree = DecisionTreeClassifier::new(params);
        tree.fit(names(1), &x, &[0, 0, 1, 1]).unwrap();
        assert_eq!(tree.predict(&[1.0]).unwrap(), 1);
    }

    #[test]
    fn test_fitted_tree_survives_serde() {
        let (x, y) = xor();
        let mut tree = DecisionTreeClassifier::new(TreeParams::default());
        tree.fit(names(2), &x, &y).unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let restored: DecisionTreeClassifier = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.feature_names(), tree.feature_names());
        for (row, label) in x.iter().zip(&y) {
            assert_eq!(restored.predict(row).unwrap(), *label);
        }
    }
}
