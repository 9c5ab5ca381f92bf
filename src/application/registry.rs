//! Model registry: one loaded predictor per disease category.
//!
//! Built once at startup and shared read-only (`Arc<ModelRegistry>`) with
//! every session. A registry always holds a predictor for every category, and
//! every predictor's input width matches the parameter catalog.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ed25519_dalek::VerifyingKey;

use crate::adapters::model::manifest::{ManifestError, VerifiedManifest};
use crate::adapters::{ExportedModel, ModelError};
use crate::domain::{fields_for, DiseaseCategory};
use crate::ports::Predictor;

/// Errors raised while building the registry. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Model file for {category} not found at {path:?}")]
    Missing {
        category: DiseaseCategory,
        path: PathBuf,
    },

    #[error("Failed to read model file {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model file {path:?} is not a valid predictor: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("{category} model expects {model} features but the catalog defines {catalog}")]
    DimensionMismatch {
        category: DiseaseCategory,
        model: usize,
        catalog: usize,
    },

    #[error("Model integrity check failed: {0}")]
    Integrity(#[from] ManifestError),

    #[error("Unsigned models can only be loaded in debug builds")]
    UnsignedNotAllowed,

    #[error(
        "No model signing key configured; set {key_env}, or {unsigned_env}=1 to load unsigned models in a debug build"
    )]
    NoVerifyingKey {
        key_env: &'static str,
        unsigned_env: &'static str,
    },

    #[error("Predictor for {0} supplied more than once")]
    Duplicate(DiseaseCategory),

    #[error("No predictor supplied for {0}")]
    Incomplete(DiseaseCategory),
}

/// Lookup of a category name with no registered predictor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No predictor registered for category {0:?}")]
pub struct NotFoundError(pub String);

/// Where each category's model file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    paths: [PathBuf; DiseaseCategory::COUNT],
}

impl ModelPaths {
    /// Default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            paths: DiseaseCategory::ALL.map(|c| dir.join(c.model_file_name())),
        }
    }

    /// Override the file for one category.
    #[must_use]
    pub fn with_path(mut self, category: DiseaseCategory, path: impl Into<PathBuf>) -> Self {
        self.paths[category.index()] = path.into();
        self
    }

    #[must_use]
    pub fn get(&self, category: DiseaseCategory) -> &Path {
        &self.paths[category.index()]
    }
}

/// How model files are authenticated before use.
#[derive(Debug, Clone)]
pub enum ModelTrust {
    /// Every file must be listed in a `manifest.json` signed by this key,
    /// located in the file's directory.
    RequireSignature(VerifyingKey),
    /// Skip manifest checks. Refused in release builds.
    AllowUnsigned,
}

/// Immutable category -> predictor mapping.
pub struct ModelRegistry {
    predictors: [Arc<dyn Predictor>; DiseaseCategory::COUNT],
}

impl ModelRegistry {
    /// Load every category's model file.
    ///
    /// # Errors
    /// Returns `LoadError` if any file is missing, unreadable, fails its
    /// integrity check, is not a valid model, or disagrees with the catalog
    /// on the number of features.
    pub fn load(paths: &ModelPaths, trust: &ModelTrust) -> Result<Self, LoadError> {
        if matches!(trust, ModelTrust::AllowUnsigned) {
            if !cfg!(debug_assertions) {
                return Err(LoadError::UnsignedNotAllowed);
            }
            tracing::warn!("Loading UNSIGNED models; manifest verification is disabled");
        }

        let mut manifests: BTreeMap<PathBuf, VerifiedManifest> = BTreeMap::new();
        let mut loaded: Vec<(DiseaseCategory, Arc<dyn Predictor>)> =
            Vec::with_capacity(DiseaseCategory::COUNT);

        for category in DiseaseCategory::ALL {
            let path = paths.get(category);
            if !path.is_file() {
                return Err(LoadError::Missing {
                    category,
                    path: path.to_path_buf(),
                });
            }

            let bytes = fs::read(path).map_err(|source| LoadError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

            if let ModelTrust::RequireSignature(key) = trust {
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."))
                    .to_path_buf();
                let manifest = match manifests.entry(dir) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        let verified = VerifiedManifest::verify(entry.key(), key)?;
                        entry.insert(verified)
                    }
                };
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| ManifestError::Unlisted(path.display().to_string()))?;
                manifest.check_file(file_name, &bytes)?;
            }

            let model = ExportedModel::from_json(&bytes).map_err(|source| LoadError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;

            tracing::info!(
                "Loaded {} model from {:?} ({}, {} features)",
                category,
                path,
                model.estimator.kind(),
                model.n_features
            );
            let predictor: Arc<dyn Predictor> = Arc::new(model);
            loaded.push((category, predictor));
        }

        Self::from_predictors(loaded)
    }

    /// Build a registry from already constructed predictors.
    ///
    /// # Errors
    /// Returns `LoadError` if a category is missing or duplicated, or if a
    /// predictor's input width disagrees with the catalog.
    pub fn from_predictors(
        predictors: impl IntoIterator<Item = (DiseaseCategory, Arc<dyn Predictor>)>,
    ) -> Result<Self, LoadError> {
        let mut slots: [Option<Arc<dyn Predictor>>; DiseaseCategory::COUNT] = Default::default();

        for (category, predictor) in predictors {
            let catalog = fields_for(category).len();
            let model = predictor.n_features();
            if model != catalog || model != category.expected_features() {
                return Err(LoadError::DimensionMismatch {
                    category,
                    model,
                    catalog,
                });
            }
            let slot = &mut slots[category.index()];
            if slot.is_some() {
                return Err(LoadError::Duplicate(category));
            }
            *slot = Some(predictor);
        }

        let take = |slot: Option<Arc<dyn Predictor>>, category: DiseaseCategory| {
            slot.ok_or(LoadError::Incomplete(category))
        };
        let [diabetes, heart, parkinsons, lung, thyroid] = slots;
        Ok(Self {
            predictors: [
                take(diabetes, DiseaseCategory::Diabetes)?,
                take(heart, DiseaseCategory::HeartDisease)?,
                take(parkinsons, DiseaseCategory::Parkinsons)?,
                take(lung, DiseaseCategory::LungCancer)?,
                take(thyroid, DiseaseCategory::HypoThyroid)?,
            ],
        })
    }

    /// Predictor for `category`.
    #[must_use]
    pub fn get(&self, category: DiseaseCategory) -> &dyn Predictor {
        self.predictors[category.index()].as_ref()
    }

    /// Predictor for a category given by display name.
    ///
    /// # Errors
    /// Returns `NotFoundError` if no category has that name.
    pub fn get_by_name(&self, name: &str) -> Result<(DiseaseCategory, &dyn Predictor), NotFoundError> {
        let category =
            DiseaseCategory::from_name(name).ok_or_else(|| NotFoundError(name.to_string()))?;
        Ok((category, self.get(category)))
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for category in DiseaseCategory::ALL {
            map.entry(&category.name(), &self.get(category).n_features());
        }
        map.finish()
    }
}
