//! Predictor port: Trait for opaque pre-trained classifiers.
//!
//! The application never looks inside a model. It only needs the declared
//! input width and a batch `predict` over rows.

use crate::domain::FeatureVector;

/// Errors raised by a predictor during inference.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictorError {
    #[error("Row {row} has {got} features, model expects {expected}")]
    Dimension {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Row {row} contains a non-finite value at feature {feature}")]
    NonFiniteInput { row: usize, feature: usize },

    #[error("Model produced a non-finite decision value")]
    NonFiniteOutput,

    #[error("Model internal error: {0}")]
    Internal(String),
}

/// A pre-trained binary classifier.
///
/// Implementations are immutable after construction and shared across
/// sessions without locking.
pub trait Predictor: Send + Sync {
    /// Number of features each input row must carry.
    fn n_features(&self) -> usize;

    /// Predict one label per row.
    ///
    /// # Errors
    /// Returns `PredictorError` if a row is malformed or inference fails.
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<i64>, PredictorError>;
}
