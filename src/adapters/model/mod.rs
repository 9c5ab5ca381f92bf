//! Model adapter: JSON-exported classifiers implementing `Predictor`.
//!
//! The training pipeline exports each fitted model as a JSON document:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "n_features": 8,
//!   "feature_names": ["Pregnancies", "..."],
//!   "estimator": { "kind": "linear_svm", "weights": [...], "bias": -1.2 }
//! }
//! ```
//!
//! Documents are validated structurally when parsed, so a loaded model can
//! always run inference on correctly sized rows.

mod estimator;
pub mod manifest;

use serde::{Deserialize, Serialize};

use crate::domain::FeatureVector;
use crate::ports::{Predictor, PredictorError};

pub use estimator::{DecisionTree, Estimator, StandardScaler, TreeNode};

/// Export format version understood by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Errors raised while parsing an exported model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Malformed model JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Unsupported model format version {0} (expected {FORMAT_VERSION})")]
    UnsupportedVersion(u32),

    #[error("Inconsistent model: {0}")]
    Invalid(String),
}

/// A fitted classifier as exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedModel {
    pub format_version: u32,
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub estimator: Estimator,
}

impl ExportedModel {
    /// Parse and validate an exported model.
    ///
    /// # Errors
    /// Returns `ModelError` if the JSON is malformed or the parameters are
    /// inconsistent with the declared feature count.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_slice(bytes)?;
        model.validate()?;
        Ok(model)
    }

    /// Check the model is usable for inference.
    ///
    /// # Errors
    /// Returns `ModelError` describing the first problem found.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion(self.format_version));
        }
        if self.n_features == 0 {
            return Err(ModelError::Invalid("n_features must be positive".into()));
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != self.n_features {
            return Err(ModelError::Invalid(format!(
                "{} feature names for {} features",
                self.feature_names.len(),
                self.n_features
            )));
        }
        self.estimator
            .validate(self.n_features)
            .map_err(ModelError::Invalid)
    }
}

impl Predictor for ExportedModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<i64>, PredictorError> {
        rows.iter()
            .enumerate()
            .map(|(row_idx, row)| {
                if row.len() != self.n_features {
                    return Err(PredictorError::Dimension {
                        row: row_idx,
                        expected: self.n_features,
                        got: row.len(),
                    });
                }
                if let Some(feature) = row.as_slice().iter().position(|x| !x.is_finite()) {
                    return Err(PredictorError::NonFiniteInput {
                        row: row_idx,
                        feature,
                    });
                }
                self.estimator.predict_row(row.as_slice())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svm(n: usize) -> ExportedModel {
        ExportedModel {
            format_version: FORMAT_VERSION,
            n_features: n,
            feature_names: Vec::new(),
            estimator: Estimator::LinearSvm {
                scaler: None,
                weights: vec![1.0; n],
                bias: -1.0,
            },
        }
    }

    #[test]
    fn test_predict_batch() {
        let model = svm(2);
        let rows = vec![
            FeatureVector::new(vec![1.0, 1.0]),
            FeatureVector::new(vec![0.0, 0.5]),
        ];
        assert_eq!(model.predict(&rows), Ok(vec![1, 0]));
    }

    #[test]
    fn test_rejects_wrong_width() {
        let model = svm(3);
        let err = model
            .predict(&[FeatureVector::new(vec![1.0, 2.0])])
            .expect_err("short row");
        assert_eq!(
            err,
            PredictorError::Dimension {
                row: 0,
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let model = svm(2);
        let err = model
            .predict(&[FeatureVector::new(vec![1.0, f64::NAN])])
            .expect_err("nan");
        assert_eq!(err, PredictorError::NonFiniteInput { row: 0, feature: 1 });
    }

    #[test]
    fn test_from_json_validates() {
        let ok = serde_json::to_vec(&svm(2)).expect("serialize");
        assert!(ExportedModel::from_json(&ok).is_ok());

        let mut bad_names = svm(2);
        bad_names.feature_names = vec!["only_one".into()];
        let bytes = serde_json::to_vec(&bad_names).expect("serialize");
        assert!(matches!(
            ExportedModel::from_json(&bytes),
            Err(ModelError::Invalid(_))
        ));

        let mut future = svm(2);
        future.format_version = 2;
        let bytes = serde_json::to_vec(&future).expect("serialize");
        assert!(matches!(
            ExportedModel::from_json(&bytes),
            Err(ModelError::UnsupportedVersion(2))
        ));

        assert!(matches!(
            ExportedModel::from_json(b"\x80\x04pickle"),
            Err(ModelError::Format(_))
        ));
    }
}
