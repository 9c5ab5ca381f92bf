//! Prediction outcome types.

use super::DiseaseCategory;

/// Binary outcome of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Condition present
    Has,
    /// Condition absent
    DoesNotHave,
}

impl Verdict {
    /// Interpret a raw predictor label.
    ///
    /// Only `1` means the condition is present; every other label, including
    /// labels outside `{0, 1}`, reads as absent.
    #[must_use]
    pub fn from_label(label: i64) -> Self {
        if label == 1 {
            Self::Has
        } else {
            Self::DoesNotHave
        }
    }
}

/// Result of one prediction request. Rendered once, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub category: DiseaseCategory,
    pub verdict: Verdict,

    /// Label exactly as returned by the predictor
    pub raw_label: i64,

    pub predicted_at: chrono::DateTime<chrono::Utc>,
}

impl PredictionResult {
    #[must_use]
    pub fn new(category: DiseaseCategory, raw_label: i64) -> Self {
        Self {
            category,
            verdict: Verdict::from_label(raw_label),
            raw_label,
            predicted_at: chrono::Utc::now(),
        }
    }

    /// The user-facing verdict line.
    #[must_use]
    pub fn message(&self) -> String {
        match self.verdict {
            Verdict::Has => format!("The person has {}", self.category),
            Verdict::DoesNotHave => format!("The person does not have {}", self.category),
        }
    }

    /// Whether the predictor returned a label outside `{0, 1}`.
    #[must_use]
    pub fn label_out_of_range(&self) -> bool {
        !matches!(self.raw_label, 0 | 1)
    }
}
