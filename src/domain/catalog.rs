//! Parameter catalog: the ordered input fields of every category.
//!
//! The order of each list is the column order the category's model was
//! trained on. Reordering an entry silently changes predictions.

use super::DiseaseCategory;

/// Kind of value a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Decimal number, stepped by whole units in the form.
    Numeric,
}

/// One labeled input field of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub label: &'static str,
    pub kind: ParamKind,
}

impl ParameterSpec {
    const fn numeric(label: &'static str) -> Self {
        Self {
            label,
            kind: ParamKind::Numeric,
        }
    }

    /// Widget key for this field.
    #[must_use]
    pub fn key(&self) -> String {
        field_key(self.label)
    }
}

/// Derive a widget key from a field label.
#[must_use]
pub fn field_key(label: &str) -> String {
    label.replace(' ', "_")
}

/// Catalog lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown disease category: {0}")]
    UnknownCategory(String),
}

const DIABETES: [ParameterSpec; 8] = [
    ParameterSpec::numeric("Pregnancies"),
    ParameterSpec::numeric("Glucose"),
    ParameterSpec::numeric("Blood Pressure"),
    ParameterSpec::numeric("Skin Thickness"),
    ParameterSpec::numeric("Insulin"),
    ParameterSpec::numeric("BMI"),
    ParameterSpec::numeric("Diabetes Pedigree Function"),
    ParameterSpec::numeric("Age"),
];

const HEART_DISEASE: [ParameterSpec; 13] = [
    ParameterSpec::numeric("Age"),
    ParameterSpec::numeric("Sex (1=Male, 0=Female)"),
    ParameterSpec::numeric("Chest Pain Type (0-3)"),
    ParameterSpec::numeric("Resting BP"),
    ParameterSpec::numeric("Cholesterol"),
    ParameterSpec::numeric("Fasting Blood Sugar (1=True, 0=False)"),
    ParameterSpec::numeric("Resting ECG (0-2)"),
    ParameterSpec::numeric("Max Heart Rate"),
    ParameterSpec::numeric("Exercise Induced Angina (1=Yes, 0=No)"),
    ParameterSpec::numeric("ST Depression"),
    ParameterSpec::numeric("Slope (0-2)"),
    ParameterSpec::numeric("Major Vessels (0-3)"),
    ParameterSpec::numeric("Thal (0-2)"),
];

const PARKINSONS: [ParameterSpec; 22] = [
    ParameterSpec::numeric("MDVP:Fo(Hz)"),
    ParameterSpec::numeric("MDVP:Fhi(Hz)"),
    ParameterSpec::numeric("MDVP:Flo(Hz)"),
    ParameterSpec::numeric("MDVP:Jitter(%)"),
    ParameterSpec::numeric("MDVP:Jitter(Abs)"),
    ParameterSpec::numeric("MDVP:RAP"),
    ParameterSpec::numeric("MDVP:PPQ"),
    ParameterSpec::numeric("Jitter:DDP"),
    ParameterSpec::numeric("MDVP:Shimmer"),
    ParameterSpec::numeric("MDVP:Shimmer(dB)"),
    ParameterSpec::numeric("Shimmer:APQ3"),
    ParameterSpec::numeric("Shimmer:APQ5"),
    ParameterSpec::numeric("MDVP:APQ"),
    ParameterSpec::numeric("Shimmer:DDA"),
    ParameterSpec::numeric("NHR"),
    ParameterSpec::numeric("HNR"),
    ParameterSpec::numeric("RPDE"),
    ParameterSpec::numeric("DFA"),
    ParameterSpec::numeric("Spread1"),
    ParameterSpec::numeric("Spread2"),
    ParameterSpec::numeric("D2"),
    ParameterSpec::numeric("PPE"),
];

const LUNG_CANCER: [ParameterSpec; 15] = [
    ParameterSpec::numeric("Gender (1=Male, 0=Female)"),
    ParameterSpec::numeric("Age"),
    ParameterSpec::numeric("Smoking (1=Yes, 0=No)"),
    ParameterSpec::numeric("Yellow Fingers"),
    ParameterSpec::numeric("Anxiety"),
    ParameterSpec::numeric("Peer Pressure"),
    ParameterSpec::numeric("Chronic Disease"),
    ParameterSpec::numeric("Fatigue"),
    ParameterSpec::numeric("Allergy"),
    ParameterSpec::numeric("Wheezing"),
    ParameterSpec::numeric("Alcohol Consuming"),
    ParameterSpec::numeric("Coughing"),
    ParameterSpec::numeric("Shortness of Breath"),
    ParameterSpec::numeric("Swallowing Difficulty"),
    ParameterSpec::numeric("Chest Pain"),
];

const HYPO_THYROID: [ParameterSpec; 7] = [
    ParameterSpec::numeric("Age"),
    ParameterSpec::numeric("Sex (1=Male, 0=Female)"),
    ParameterSpec::numeric("On Thyroxine (1=Yes, 0=No)"),
    ParameterSpec::numeric("TSH Level"),
    ParameterSpec::numeric("T3 Measured (1=Yes, 0=No)"),
    ParameterSpec::numeric("T3 Level"),
    ParameterSpec::numeric("TT4 Level"),
];

/// Ordered input fields for `category`.
#[must_use]
pub fn fields_for(category: DiseaseCategory) -> &'static [ParameterSpec] {
    match category {
        DiseaseCategory::Diabetes => &DIABETES,
        DiseaseCategory::HeartDisease => &HEART_DISEASE,
        DiseaseCategory::Parkinsons => &PARKINSONS,
        DiseaseCategory::LungCancer => &LUNG_CANCER,
        DiseaseCategory::HypoThyroid => &HYPO_THYROID,
    }
}

/// Ordered input fields for a category given by display name.
///
/// # Errors
/// Returns `ConfigError::UnknownCategory` if no category has that name.
pub fn fields_for_name(name: &str) -> Result<&'static [ParameterSpec], ConfigError> {
    let category: DiseaseCategory = name.parse()?;
    Ok(fields_for(category))
}

/// A representative input row per category, in catalog order.
#[must_use]
pub fn sample_values(category: DiseaseCategory) -> &'static [f64] {
    match category {
        DiseaseCategory::Diabetes => &[1.0, 85.0, 66.0, 29.0, 0.0, 26.6, 0.351, 31.0],
        DiseaseCategory::HeartDisease => &[
            63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 2.3, 0.0, 0.0, 1.0,
        ],
        DiseaseCategory::Parkinsons => &[
            119.992, 157.302, 74.997, 0.00784, 0.00007, 0.0037, 0.00554, 0.01109, 0.04374,
            0.426, 0.02182, 0.0313, 0.02971, 0.06545, 0.02211, 21.033, 0.414783, 0.815285,
            -4.813031, 0.266482, 2.301442, 0.284654,
        ],
        DiseaseCategory::LungCancer => &[
            1.0, 69.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        ],
        DiseaseCategory::HypoThyroid => &[41.0, 0.0, 0.0, 1.3, 1.0, 2.5, 125.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_expected_dimensionality() {
        for category in DiseaseCategory::ALL {
            assert_eq!(
                fields_for(category).len(),
                category.expected_features(),
                "{category}"
            );
            assert_eq!(sample_values(category).len(), category.expected_features());
        }
        assert_eq!(fields_for(DiseaseCategory::Parkinsons).len(), 22);
    }

    #[test]
    fn test_keys_replace_spaces() {
        let fields = fields_for(DiseaseCategory::Diabetes);
        assert_eq!(fields[2].key(), "Blood_Pressure");
        assert_eq!(fields[6].key(), "Diabetes_Pedigree_Function");
        assert_eq!(field_key("MDVP:Fo(Hz)"), "MDVP:Fo(Hz)");
    }

    #[test]
    fn test_keys_unique_within_category() {
        for category in DiseaseCategory::ALL {
            let mut keys: Vec<String> = fields_for(category).iter().map(|p| p.key()).collect();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), fields_for(category).len(), "{category}");
        }
    }

    #[test]
    fn test_diabetes_order() {
        let labels: Vec<_> = fields_for(DiseaseCategory::Diabetes)
            .iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(
            labels,
            [
                "Pregnancies",
                "Glucose",
                "Blood Pressure",
                "Skin Thickness",
                "Insulin",
                "BMI",
                "Diabetes Pedigree Function",
                "Age"
            ]
        );
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(fields_for_name("Hypo-Thyroid").map(<[_]>::len), Ok(7));
        assert_eq!(
            fields_for_name("Kidney Disease"),
            Err(ConfigError::UnknownCategory("Kidney Disease".to_string()))
        );
    }
}
