//! Prediction dispatcher: routes one feature vector to its category's model.

use std::sync::Arc;

use crate::domain::{fields_for, DiseaseCategory, FeatureVector, PredictionResult};
use crate::ports::PredictorError;

use super::registry::{ModelRegistry, NotFoundError};

/// Per-request prediction failures. Shown to the user, never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("{category} expects {expected} values, got {got}")]
    DimensionMismatch {
        category: DiseaseCategory,
        expected: usize,
        got: usize,
    },

    #[error("{category} model failed: {source}")]
    Predictor {
        category: DiseaseCategory,
        #[source]
        source: PredictorError,
    },

    #[error("{category} model returned {got} labels for a single row")]
    LabelCount { category: DiseaseCategory, got: usize },
}

/// Dispatches prediction requests against a shared, read-only registry.
#[derive(Debug, Clone)]
pub struct PredictionDispatcher {
    registry: Arc<ModelRegistry>,
}

impl PredictionDispatcher {
    #[must_use]
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Run the category's predictor on a single row.
    ///
    /// The vector must hold exactly one value per catalog field, in catalog
    /// order. Short or long vectors are rejected, never padded.
    ///
    /// # Errors
    /// Returns `PredictionError` on a dimensionality mismatch or a predictor
    /// failure.
    pub fn predict(
        &self,
        category: DiseaseCategory,
        features: &FeatureVector,
    ) -> Result<PredictionResult, PredictionError> {
        let expected = fields_for(category).len();
        if features.len() != expected {
            tracing::warn!(
                "Rejected {} request: {} values for {} fields",
                category,
                features.len(),
                expected
            );
            return Err(PredictionError::DimensionMismatch {
                category,
                expected,
                got: features.len(),
            });
        }

        let labels = self
            .registry
            .get(category)
            .predict(std::slice::from_ref(features))
            .map_err(|source| {
                tracing::error!("{} predictor failed: {}", category, source);
                PredictionError::Predictor { category, source }
            })?;

        let label = match labels.as_slice() {
            [label] => *label,
            other => {
                return Err(PredictionError::LabelCount {
                    category,
                    got: other.len(),
                })
            }
        };

        let result = PredictionResult::new(category, label);
        if result.label_out_of_range() {
            tracing::warn!(
                "{} predictor returned label {} outside {{0, 1}}; reporting as absent",
                category,
                label
            );
        }
        tracing::info!("Prediction complete: {} -> {:?}", category, result.verdict);
        Ok(result)
    }

    /// Like [`predict`](Self::predict), with the category given by name.
    ///
    /// # Errors
    /// Returns `NotFound` for an unregistered name, otherwise as `predict`.
    pub fn predict_named(
        &self,
        name: &str,
        features: &FeatureVector,
    ) -> crate::Result<PredictionResult> {
        let (category, _) = self.registry.get_by_name(name).map_err(|e: NotFoundError| {
            tracing::warn!("Prediction requested for unknown category {:?}", name);
            e
        })?;
        Ok(self.predict(category, features)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::tests::{fixed_registry, FixedLabel};
    use crate::application::registry::{ModelPaths, ModelTrust};
    use crate::domain::{sample_values, Verdict};
    use crate::ports::Predictor;
    use crate::PrognosError;
    use std::path::Path;

    fn bundled() -> PredictionDispatcher {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let registry = ModelRegistry::load(&ModelPaths::in_dir(&dir), &ModelTrust::AllowUnsigned)
            .expect("bundled models load");
        PredictionDispatcher::new(Arc::new(registry))
    }

    struct Failing;

    impl Predictor for Failing {
        fn n_features(&self) -> usize {
            7
        }

        fn predict(&self, _rows: &[FeatureVector]) -> Result<Vec<i64>, PredictorError> {
            Err(PredictorError::Internal("boom".into()))
        }
    }

    fn registry_with(
        category: DiseaseCategory,
        predictor: Arc<dyn Predictor>,
    ) -> Arc<ModelRegistry> {
        let entries = DiseaseCategory::ALL.map(|c| {
            if c == category {
                (c, predictor.clone())
            } else {
                let p: Arc<dyn Predictor> = Arc::new(FixedLabel {
                    label: 0,
                    n_features: c.expected_features(),
                });
                (c, p)
            }
        });
        Arc::new(ModelRegistry::from_predictors(entries).expect("registry"))
    }

    #[test]
    fn test_diabetes_scenario() {
        let dispatcher = bundled();
        let features = FeatureVector::new(sample_values(DiseaseCategory::Diabetes).to_vec());
        let result = dispatcher
            .predict(DiseaseCategory::Diabetes, &features)
            .expect("prediction");

        assert_eq!(result.category.name(), "Diabetes");
        assert!(matches!(result.verdict, Verdict::Has | Verdict::DoesNotHave));
        assert!(result.message().starts_with("The person "));
        assert!(result.message().ends_with("Diabetes"));
    }

    #[test]
    fn test_predict_is_deterministic() {
        let dispatcher = bundled();
        for category in DiseaseCategory::ALL {
            let features = FeatureVector::new(sample_values(category).to_vec());
            let first = dispatcher.predict(category, &features).expect("first");
            let second = dispatcher.predict(category, &features).expect("second");
            assert_eq!(first.verdict, second.verdict);
            assert_eq!(first.raw_label, second.raw_label);
        }
    }

    #[test]
    fn test_all_zero_vectors_accepted() {
        let dispatcher = bundled();
        for category in DiseaseCategory::ALL {
            let result = dispatcher.predict(category, &FeatureVector::zeros(category));
            assert!(result.is_ok(), "{category} rejected zeros: {result:?}");
        }
    }

    #[test]
    fn test_short_heart_vector_rejected() {
        let dispatcher = bundled();
        let features = FeatureVector::new(vec![0.0; 12]);
        let err = dispatcher
            .predict(DiseaseCategory::HeartDisease, &features)
            .expect_err("12 values for 13 fields");
        assert_eq!(
            err,
            PredictionError::DimensionMismatch {
                category: DiseaseCategory::HeartDisease,
                expected: 13,
                got: 12
            }
        );
    }

    #[test]
    fn test_long_vector_rejected() {
        let dispatcher = PredictionDispatcher::new(Arc::new(fixed_registry(1)));
        let err = dispatcher
            .predict(DiseaseCategory::HypoThyroid, &FeatureVector::new(vec![0.0; 8]))
            .expect_err("too long");
        assert!(matches!(err, PredictionError::DimensionMismatch { got: 8, .. }));
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let dispatcher = PredictionDispatcher::new(Arc::new(fixed_registry(1)));
        let err = dispatcher
            .predict_named("Kidney Disease", &FeatureVector::new(vec![0.0; 8]))
            .expect_err("unknown");
        assert!(matches!(err, PrognosError::NotFound(_)));
    }

    #[test]
    fn test_predict_named_routes_by_display_name() {
        let dispatcher = PredictionDispatcher::new(Arc::new(fixed_registry(1)));
        let result = dispatcher
            .predict_named("Hypo-Thyroid", &FeatureVector::zeros(DiseaseCategory::HypoThyroid))
            .expect("known");
        assert_eq!(result.category, DiseaseCategory::HypoThyroid);
        assert_eq!(result.message(), "The person has Hypo-Thyroid");
    }

    #[test]
    fn test_predictor_failure_surfaces() {
        let registry = registry_with(DiseaseCategory::HypoThyroid, Arc::new(Failing));
        let dispatcher = PredictionDispatcher::new(registry);
        let err = dispatcher
            .predict(
                DiseaseCategory::HypoThyroid,
                &FeatureVector::zeros(DiseaseCategory::HypoThyroid),
            )
            .expect_err("failing model");
        assert!(matches!(
            err,
            PredictionError::Predictor {
                category: DiseaseCategory::HypoThyroid,
                source: PredictorError::Internal(_)
            }
        ));
    }

    #[test]
    fn test_out_of_range_label_reads_as_absent() {
        let dispatcher = PredictionDispatcher::new(Arc::new(fixed_registry(2)));
        let result = dispatcher
            .predict(
                DiseaseCategory::LungCancer,
                &FeatureVector::zeros(DiseaseCategory::LungCancer),
            )
            .expect("prediction");
        assert_eq!(result.verdict, Verdict::DoesNotHave);
        assert_eq!(result.raw_label, 2);
        assert!(result.label_out_of_range());
    }
}
