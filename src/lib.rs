//! # Prognos
//!
//! Disease-selection-driven prediction forms over pre-trained classifiers.
//!
//! The user picks one of a closed set of disease categories, fills in that
//! category's ordered input fields, and receives a binary verdict from the
//! category's model. Models are loaded once at startup and shared read-only.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Categories, parameter catalog, feature vectors, verdicts
//! - `ports`: The opaque `Predictor` capability
//! - `adapters`: JSON-exported estimators, signed manifests, log sanitizing
//! - `application`: Model registry, prediction dispatcher, form state
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{DiseaseCategory, FeatureVector, PredictionResult, Verdict};

/// Result type for Prognos operations
pub type Result<T> = std::result::Result<T, PrognosError>;

/// Main error type for Prognos
#[derive(Debug, thiserror::Error)]
pub enum PrognosError {
    #[error("Failed to load models: {0}")]
    Load(#[from] application::LoadError),

    #[error("Configuration error: {0}")]
    Config(#[from] domain::ConfigError),

    #[error(transparent)]
    NotFound(#[from] application::NotFoundError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] application::PredictionError),

    #[error("Invalid input: {0}")]
    Form(#[from] application::FormError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
