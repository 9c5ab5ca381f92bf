//! Classical estimators in their exported JSON form.
//!
//! Each variant mirrors what the training pipeline exports for a fitted
//! scikit-learn style model. Inference is a fixed number of arithmetic steps
//! per row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ports::PredictorError;

fn default_threshold() -> f64 {
    0.5
}

/// Per-feature standardization applied before a linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(format!(
                "scaler has {} means and {} scales, expected {n_features}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err("scaler mean contains a non-finite value".into());
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err("scaler scale must be finite and non-zero".into());
        }
        Ok(())
    }

    fn transform(&self, i: usize, x: f64) -> f64 {
        (x - self.mean[i]) / self.scale[i]
    }
}

/// A binary decision tree stored as a flat node array rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go `left` when `row[feature] <= threshold`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        label: i64,
    },
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("decision tree has no nodes".into());
        }
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= n_features {
                    return Err(format!(
                        "node {i} splits on feature {feature}, model has {n_features}"
                    ));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {i} has a non-finite threshold"));
                }
                // Children must point forward, which rules out cycles.
                for child in [*left, *right] {
                    if child <= i || child >= len {
                        return Err(format!("node {i} has invalid child index {child}"));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> i64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { label } => return *label,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Fitted estimator, tagged by `kind` in the exported JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression {
        #[serde(default)]
        scaler: Option<StandardScaler>,
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    LinearSvm {
        #[serde(default)]
        scaler: Option<StandardScaler>,
        weights: Vec<f64>,
        bias: f64,
    },
    DecisionTree {
        tree: DecisionTree,
    },
    RandomForest {
        trees: Vec<DecisionTree>,
    },
}

fn validate_linear(
    scaler: Option<&StandardScaler>,
    weights: &[f64],
    offset: f64,
    n_features: usize,
) -> Result<(), String> {
    if weights.len() != n_features {
        return Err(format!(
            "{} weights for {n_features} features",
            weights.len()
        ));
    }
    if weights.iter().any(|w| !w.is_finite()) || !offset.is_finite() {
        return Err("linear parameters must be finite".into());
    }
    if let Some(scaler) = scaler {
        scaler.validate(n_features)?;
    }
    Ok(())
}

fn decision_value(scaler: Option<&StandardScaler>, weights: &[f64], offset: f64, row: &[f64]) -> f64 {
    weights
        .iter()
        .zip(row)
        .enumerate()
        .map(|(i, (w, x))| {
            let x = scaler.map_or(*x, |s| s.transform(i, *x));
            w * x
        })
        .sum::<f64>()
        + offset
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Estimator {
    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression { .. } => "logistic_regression",
            Self::LinearSvm { .. } => "linear_svm",
            Self::DecisionTree { .. } => "decision_tree",
            Self::RandomForest { .. } => "random_forest",
        }
    }

    /// Check internal consistency against the declared input width.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        match self {
            Self::LogisticRegression {
                scaler,
                coefficients,
                intercept,
                threshold,
            } => {
                if !(*threshold > 0.0 && *threshold < 1.0) {
                    return Err(format!("threshold {threshold} must lie in (0, 1)"));
                }
                validate_linear(scaler.as_ref(), coefficients, *intercept, n_features)
            }
            Self::LinearSvm {
                scaler,
                weights,
                bias,
            } => validate_linear(scaler.as_ref(), weights, *bias, n_features),
            Self::DecisionTree { tree } => tree.validate(n_features),
            Self::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".into());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(n_features)
                        .map_err(|e| format!("tree {i}: {e}"))?;
                }
                Ok(())
            }
        }
    }

    /// Predict the label of one row whose width was already checked.
    ///
    /// # Errors
    /// Returns `PredictorError::NonFiniteOutput` if a linear decision value
    /// overflows.
    pub fn predict_row(&self, row: &[f64]) -> Result<i64, PredictorError> {
        match self {
            Self::LogisticRegression {
                scaler,
                coefficients,
                intercept,
                threshold,
            } => {
                let z = decision_value(scaler.as_ref(), coefficients, *intercept, row);
                if !z.is_finite() {
                    return Err(PredictorError::NonFiniteOutput);
                }
                Ok(i64::from(sigmoid(z) >= *threshold))
            }
            Self::LinearSvm {
                scaler,
                weights,
                bias,
            } => {
                let d = decision_value(scaler.as_ref(), weights, *bias, row);
                if !d.is_finite() {
                    return Err(PredictorError::NonFiniteOutput);
                }
                Ok(i64::from(d > 0.0))
            }
            Self::DecisionTree { tree } => Ok(tree.predict_row(row)),
            Self::RandomForest { trees } => {
                let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
                for tree in trees {
                    *votes.entry(tree.predict_row(row)).or_default() += 1;
                }
                // Ascending iteration with a strict comparison keeps the
                // smallest label on ties.
                let mut best: Option<(i64, usize)> = None;
                for (label, count) in votes {
                    if best.map_or(true, |(_, c)| count > c) {
                        best = Some((label, count));
                    }
                }
                best.map(|(label, _)| label)
                    .ok_or_else(|| PredictorError::Internal("random forest cast no votes".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: i64, right: i64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { label: left },
                TreeNode::Leaf { label: right },
            ],
        }
    }

    #[test]
    fn test_logistic_threshold() {
        let model = Estimator::LogisticRegression {
            scaler: None,
            coefficients: vec![1.0, -1.0],
            intercept: 0.0,
            threshold: 0.5,
        };
        assert_eq!(model.predict_row(&[2.0, 1.0]), Ok(1));
        assert_eq!(model.predict_row(&[1.0, 2.0]), Ok(0));
        // sigmoid(0) == 0.5 is on the positive side of the threshold
        assert_eq!(model.predict_row(&[0.0, 0.0]), Ok(1));
    }

    #[test]
    fn test_scaler_applied_before_weights() {
        let model = Estimator::LinearSvm {
            scaler: Some(StandardScaler {
                mean: vec![100.0],
                scale: vec![10.0],
            }),
            weights: vec![1.0],
            bias: 0.0,
        };
        assert_eq!(model.predict_row(&[110.0]), Ok(1));
        assert_eq!(model.predict_row(&[90.0]), Ok(0));
        // Exactly on the hyperplane is the negative class.
        assert_eq!(model.predict_row(&[100.0]), Ok(0));
    }

    #[test]
    fn test_linear_overflow_is_an_error() {
        let model = Estimator::LinearSvm {
            scaler: None,
            weights: vec![f64::MAX, f64::MAX],
            bias: 0.0,
        };
        assert_eq!(
            model.predict_row(&[f64::MAX, f64::MAX]),
            Err(PredictorError::NonFiniteOutput)
        );
    }

    #[test]
    fn test_tree_split_is_inclusive_left() {
        let model = Estimator::DecisionTree {
            tree: stump(0, 2.5, 0, 1),
        };
        assert_eq!(model.predict_row(&[2.5]), Ok(0));
        assert_eq!(model.predict_row(&[2.6]), Ok(1));
    }

    #[test]
    fn test_forest_majority_and_tie() {
        let forest = Estimator::RandomForest {
            trees: vec![stump(0, 1.0, 0, 1), stump(0, 2.0, 0, 1), stump(0, 3.0, 0, 1)],
        };
        assert_eq!(forest.predict_row(&[2.5]), Ok(1));
        assert_eq!(forest.predict_row(&[1.5]), Ok(0));

        let tied = Estimator::RandomForest {
            trees: vec![stump(0, 1.0, 1, 0), stump(0, 1.0, 0, 1)],
        };
        assert_eq!(tied.predict_row(&[0.0]), Ok(0));
    }

    #[test]
    fn test_validation_rejects_bad_structures() {
        let short = Estimator::LogisticRegression {
            scaler: None,
            coefficients: vec![1.0],
            intercept: 0.0,
            threshold: 0.5,
        };
        assert!(short.validate(2).is_err());

        let bad_threshold = Estimator::LogisticRegression {
            scaler: None,
            coefficients: vec![1.0],
            intercept: 0.0,
            threshold: 1.0,
        };
        assert!(bad_threshold.validate(1).is_err());

        let zero_scale = Estimator::LinearSvm {
            scaler: Some(StandardScaler {
                mean: vec![0.0],
                scale: vec![0.0],
            }),
            weights: vec![1.0],
            bias: 0.0,
        };
        assert!(zero_scale.validate(1).is_err());

        let cyclic = Estimator::DecisionTree {
            tree: DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 0,
                        threshold: 0.0,
                        left: 0,
                        right: 1,
                    },
                    TreeNode::Leaf { label: 1 },
                ],
            },
        };
        assert!(cyclic.validate(1).is_err());

        let out_of_range_feature = Estimator::DecisionTree {
            tree: stump(3, 0.0, 0, 1),
        };
        assert!(out_of_range_feature.validate(3).is_err());
        assert!(Estimator::RandomForest { trees: vec![] }.validate(1).is_err());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"kind": "logistic_regression", "coefficients": [0.5], "intercept": -1.0}"#;
        let model: Estimator = serde_json::from_str(json).expect("parse");
        assert_eq!(model.kind(), "logistic_regression");
        assert!(model.validate(1).is_ok());

        let json = r#"{"kind": "decision_tree", "tree": {"nodes": [{"leaf": {"label": 1}}]}}"#;
        let model: Estimator = serde_json::from_str(json).expect("parse");
        assert_eq!(model.predict_row(&[0.0]), Ok(1));
    }
}
