//! Domain layer: Core types of the prediction console.
//!
//! Pure Rust types with no I/O. The category set is closed and the
//! parameter catalog is static data.

mod catalog;
mod category;
mod features;
mod prediction;

pub use catalog::{
    field_key, fields_for, fields_for_name, sample_values, ConfigError, ParamKind, ParameterSpec,
};
pub use category::DiseaseCategory;
pub use features::FeatureVector;
pub use prediction::{PredictionResult, Verdict};
