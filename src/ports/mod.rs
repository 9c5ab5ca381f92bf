//! Ports layer: Trait definitions for external collaborators.
//!
//! The persisted models are owned by an external training pipeline; this
//! trait is the only surface the application relies on.

mod predictor;

pub use predictor::{Predictor, PredictorError};
