//! Application layer: Use cases and services.
//!
//! Orchestrates the domain catalog with loaded predictors:
//! - `registry`: startup loading of one predictor per category
//! - `dispatcher`: routing a feature vector to its category's predictor
//! - `form`: per-session input state and the request state machine

mod dispatcher;
mod form;
mod registry;

pub use dispatcher::{PredictionDispatcher, PredictionError};
pub use form::{FieldInput, FormError, FormPhase, PredictionForm, PROMPT};
pub use registry::{LoadError, ModelPaths, ModelRegistry, ModelTrust, NotFoundError};
