//! Adapters layer: Concrete implementations of ports.
//!
//! - `model`: JSON-exported classifiers and signed model manifests
//! - `sanitize`: redaction of patient inputs in log output

pub mod model;
pub mod sanitize;

pub use model::{ExportedModel, ModelError};
