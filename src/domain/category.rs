//! Supported prediction tasks.

use std::fmt;
use std::str::FromStr;

/// One of the closed set of disease-prediction tasks.
///
/// The variant order is the display order of the category selector and the
/// slot order of the model registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiseaseCategory {
    Diabetes,
    HeartDisease,
    Parkinsons,
    LungCancer,
    HypoThyroid,
}

impl DiseaseCategory {
    /// Number of categories.
    pub const COUNT: usize = 5;

    /// All categories in selector order.
    pub const ALL: [DiseaseCategory; Self::COUNT] = [
        Self::Diabetes,
        Self::HeartDisease,
        Self::Parkinsons,
        Self::LungCancer,
        Self::HypoThyroid,
    ];

    /// Human-readable name, as shown to the user and used in verdicts.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes",
            Self::HeartDisease => "Heart Disease",
            Self::Parkinsons => "Parkinsons",
            Self::LungCancer => "Lung Cancer",
            Self::HypoThyroid => "Hypo-Thyroid",
        }
    }

    /// Number of features the category's predictor consumes.
    ///
    /// Checked against both the parameter catalog and each loaded model.
    #[must_use]
    pub const fn expected_features(&self) -> usize {
        match self {
            Self::Diabetes => 8,
            Self::HeartDisease => 13,
            Self::Parkinsons => 22,
            Self::LungCancer => 15,
            Self::HypoThyroid => 7,
        }
    }

    /// Default model file name inside the model directory.
    #[must_use]
    pub fn model_file_name(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes_model.json",
            Self::HeartDisease => "heart_disease_model.json",
            Self::Parkinsons => "parkinsons_model.json",
            Self::LungCancer => "lungs_disease_model.json",
            Self::HypoThyroid => "thyroid_model.json",
        }
    }

    /// Slot index in [`Self::ALL`].
    #[must_use]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Look up a category by its display name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for DiseaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiseaseCategory {
    type Err = super::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| super::ConfigError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, category) in DiseaseCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for category in DiseaseCategory::ALL {
            let parsed: DiseaseCategory = category.name().parse().expect("known name");
            assert_eq!(parsed, category);
        }
        assert!("Kidney Disease".parse::<DiseaseCategory>().is_err());
    }

    #[test]
    fn test_model_file_names_are_distinct() {
        let mut names: Vec<_> = DiseaseCategory::ALL
            .iter()
            .map(|c| c.model_file_name())
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DiseaseCategory::COUNT);
    }
}
