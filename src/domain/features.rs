//! Feature vectors fed to predictors.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{fields_for, DiseaseCategory};

/// Ordered numeric encoding of one user's answers for a category.
///
/// Values are wiped from memory when the vector is dropped.
#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap values given in catalog order.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// All-zero vector sized for `category`.
    #[must_use]
    pub fn zeros(category: DiseaseCategory) -> Self {
        Self::new(vec![0.0; fields_for(category).len()])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl From<&[f64]> for FeatureVector {
    fn from(values: &[f64]) -> Self {
        Self::new(values.to_vec())
    }
}

// Values stay out of Debug output so they cannot leak through `{:?}` logging.
impl std::fmt::Debug for FeatureVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureVector")
            .field("len", &self.values.len())
            .finish_non_exhaustive()
    }
}
