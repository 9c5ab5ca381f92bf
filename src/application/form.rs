//! Prediction form: per-session input state for the selected category.
//!
//! One text buffer per catalog field, addressed by the field's key. Buffers
//! hold exactly what the user typed; an empty buffer reads as 0. The form
//! owns the request state machine:
//!
//! ```text
//! AwaitingInput --submit--> Predicted | Failed
//!       ^                        |
//!       +---- edit / switch -----+
//! ```

use std::collections::BTreeMap;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::{
    fields_for, sample_values, DiseaseCategory, FeatureVector, ParameterSpec, PredictionResult,
};

use super::dispatcher::PredictionDispatcher;

/// Prompt shown under the page title.
pub const PROMPT: &str = "Enter the required details below to predict the outcome.";

/// Decimal places kept when stepping a value.
const STEP_PRECISION: f64 = 1e9;

/// Form input errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{label}: Invalid number")]
    InvalidNumber { label: &'static str },

    #[error("No field with key {0:?}")]
    UnknownField(String),
}

/// Where the current request stands.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPhase {
    AwaitingInput,
    Predicted(PredictionResult),
    Failed(String),
}

/// One input control.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FieldInput {
    #[zeroize(skip)]
    spec: ParameterSpec,
    buffer: String,
}

impl FieldInput {
    fn new(spec: ParameterSpec) -> Self {
        Self {
            spec,
            buffer: String::new(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.spec.label
    }

    #[must_use]
    pub fn key(&self) -> String {
        self.spec.key()
    }

    /// Raw text as typed. Empty means the default of 0.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Parsed value of the buffer.
    ///
    /// # Errors
    /// Returns `FormError::InvalidNumber` if the buffer is not a finite number.
    pub fn value(&self) -> Result<f64, FormError> {
        let text = self.buffer.trim();
        if text.is_empty() {
            return Ok(0.0);
        }
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(FormError::InvalidNumber {
                label: self.spec.label,
            })
    }

    fn set(&mut self, value: f64) {
        self.buffer.zeroize();
        self.buffer = value.to_string();
    }
}

impl std::fmt::Debug for FieldInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldInput")
            .field("label", &self.spec.label)
            .finish_non_exhaustive()
    }
}

/// Input form for one category at a time.
#[derive(Debug, Clone)]
pub struct PredictionForm {
    category: DiseaseCategory,
    fields: Vec<FieldInput>,
    selected: usize,
    phase: FormPhase,
}

impl PredictionForm {
    /// Form for `category` with every value at 0.
    #[must_use]
    pub fn new(category: DiseaseCategory) -> Self {
        Self::render(category, None)
    }

    /// Build the input set for `category`.
    ///
    /// Entries of `prior` whose key names a field of `category` become that
    /// field's value; everything else starts at 0.
    #[must_use]
    pub fn render(category: DiseaseCategory, prior: Option<&BTreeMap<String, f64>>) -> Self {
        let fields = fields_for(category)
            .iter()
            .map(|spec| {
                let mut field = FieldInput::new(*spec);
                if let Some(value) = prior.and_then(|p| p.get(&spec.key())) {
                    field.set(*value);
                }
                field
            })
            .collect();

        Self {
            category,
            fields,
            selected: 0,
            phase: FormPhase::AwaitingInput,
        }
    }

    /// Switch to `category`. Returns whether anything changed.
    ///
    /// Re-selecting the current category keeps in-progress input; switching
    /// resets every value to 0.
    pub fn select_category(&mut self, category: DiseaseCategory) -> bool {
        if category == self.category {
            return false;
        }
        tracing::debug!("Form switched from {} to {}", self.category, category);
        *self = Self::new(category);
        true
    }

    #[must_use]
    pub fn category(&self) -> DiseaseCategory {
        self.category
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldInput] {
        &self.fields
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    /// Page title for the current category.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} Prediction", self.category)
    }

    /// Label of the submit action.
    #[must_use]
    pub fn submit_label(&self) -> String {
        format!("Predict {}", self.category)
    }

    /// Current value of the field with `key`.
    ///
    /// # Errors
    /// Returns `FormError` for an unknown key or an unparseable buffer.
    pub fn value(&self, key: &str) -> Result<f64, FormError> {
        self.field(key)?.value()
    }

    /// Key -> current value for every field.
    ///
    /// # Errors
    /// Returns the first `FormError::InvalidNumber` in catalog order.
    pub fn values(&self) -> Result<BTreeMap<String, f64>, FormError> {
        self.fields
            .iter()
            .map(|f| Ok((f.key(), f.value()?)))
            .collect()
    }

    /// Overwrite the field with `key`.
    ///
    /// # Errors
    /// Returns `FormError::UnknownField` if no field has that key.
    pub fn set_value(&mut self, key: &str, value: f64) -> Result<(), FormError> {
        let idx = self
            .fields
            .iter()
            .position(|f| f.key() == key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))?;
        self.fields[idx].set(value);
        self.edited();
        Ok(())
    }

    /// Values in catalog order, ready for the dispatcher.
    ///
    /// # Errors
    /// Returns the first `FormError::InvalidNumber` in catalog order.
    pub fn feature_vector(&self) -> Result<FeatureVector, FormError> {
        let values = self
            .fields
            .iter()
            .map(FieldInput::value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FeatureVector::new(values))
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected == 0 {
            self.selected = self.fields.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    /// Append to the focused buffer. Only digits, `.` and `-` are accepted.
    pub fn input_char(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            self.fields[self.selected].buffer.push(c);
            self.edited();
        }
    }

    pub fn delete_char(&mut self) {
        if self.fields[self.selected].buffer.pop().is_some() {
            self.edited();
        }
    }

    pub fn clear_field(&mut self) {
        self.fields[self.selected].buffer.zeroize();
        self.edited();
    }

    /// Add `delta` to the focused value.
    ///
    /// # Errors
    /// Returns `FormError::InvalidNumber` if the focused buffer does not
    /// parse; the buffer is left untouched.
    pub fn step(&mut self, delta: f64) -> Result<(), FormError> {
        let field = &mut self.fields[self.selected];
        let current = field.value()?;
        let raw = current + delta;
        if !raw.is_finite() {
            return Err(FormError::InvalidNumber {
                label: field.label(),
            });
        }
        let scaled = raw * STEP_PRECISION;
        let stepped = if scaled.is_finite() {
            scaled.round() / STEP_PRECISION
        } else {
            raw
        };
        field.set(stepped);
        self.edited();
        Ok(())
    }

    /// Fill every field with the category's sample row.
    pub fn load_sample(&mut self) {
        for (field, value) in self.fields.iter_mut().zip(sample_values(self.category)) {
            field.set(*value);
        }
        self.edited();
    }

    /// Run the current values through `dispatcher` and record the outcome.
    pub fn submit(&mut self, dispatcher: &PredictionDispatcher) -> &FormPhase {
        let outcome = match self.feature_vector() {
            Ok(features) => dispatcher
                .predict(self.category, &features)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(result) => self.record_result(result),
            Err(message) => self.record_failure(message),
        }
        &self.phase
    }

    pub fn record_result(&mut self, result: PredictionResult) {
        self.phase = FormPhase::Predicted(result);
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.phase = FormPhase::Failed(message.into());
    }

    fn field(&self, key: &str) -> Result<&FieldInput, FormError> {
        self.fields
            .iter()
            .find(|f| f.key() == key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }

    // Any edit invalidates the last outcome.
    fn edited(&mut self) {
        self.phase = FormPhase::AwaitingInput;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::tests::fixed_registry;
    use crate::domain::Verdict;
    use std::sync::Arc;

    fn dispatcher(label: i64) -> PredictionDispatcher {
        PredictionDispatcher::new(Arc::new(fixed_registry(label)))
    }

    #[test]
    fn test_new_form_is_all_zero() {
        for category in DiseaseCategory::ALL {
            let form = PredictionForm::new(category);
            assert_eq!(form.fields().len(), fields_for(category).len());
            assert_eq!(form.feature_vector().expect("valid"), FeatureVector::zeros(category));
            assert_eq!(form.phase(), &FormPhase::AwaitingInput);
        }
    }

    #[test]
    fn test_titles() {
        let form = PredictionForm::new(DiseaseCategory::HeartDisease);
        assert_eq!(form.title(), "Heart Disease Prediction");
        assert_eq!(form.submit_label(), "Predict Heart Disease");
    }

    #[test]
    fn test_reselecting_same_category_preserves_input() {
        let mut form = PredictionForm::new(DiseaseCategory::Diabetes);
        form.set_value("Glucose", 140.0).expect("known key");

        assert!(!form.select_category(DiseaseCategory::Diabetes));
        assert_eq!(form.value("Glucose"), Ok(140.0));
    }

    #[test]
    fn test_switching_category_resets_fields() {
        let mut form = PredictionForm::new(DiseaseCategory::HeartDisease);
        form.set_value("Age", 63.0).expect("known key");

        assert!(form.select_category(DiseaseCategory::HypoThyroid));
        let labels: Vec<_> = form.fields().iter().map(FieldInput::label).collect();
        let expected: Vec<_> = fields_for(DiseaseCategory::HypoThyroid)
            .iter()
            .map(|s| s.label)
            .collect();
        assert_eq!(labels, expected);
        // "Age" exists in both categories but is not carried over.
        assert_eq!(form.value("Age"), Ok(0.0));
        assert_eq!(
            form.value("Cholesterol"),
            Err(FormError::UnknownField("Cholesterol".into()))
        );
    }

    #[test]
    fn test_render_with_prior_values() {
        let prior: BTreeMap<String, f64> = [
            ("BMI".to_string(), 26.6),
            ("Not_A_Field".to_string(), 9.0),
        ]
        .into_iter()
        .collect();
        let form = PredictionForm::render(DiseaseCategory::Diabetes, Some(&prior));

        let values = form.values().expect("valid");
        assert_eq!(values.len(), 8);
        assert_eq!(values["BMI"], 26.6);
        assert_eq!(values["Glucose"], 0.0);
        assert!(!values.contains_key("Not_A_Field"));
    }

    #[test]
    fn test_keys_use_underscores() {
        let mut form = PredictionForm::new(DiseaseCategory::Diabetes);
        form.set_value("Diabetes_Pedigree_Function", 0.351)
            .expect("known key");
        assert_eq!(form.value("Diabetes_Pedigree_Function"), Ok(0.351));
        assert!(form.set_value("Diabetes Pedigree Function", 1.0).is_err());
    }

    #[test]
    fn test_typing_and_navigation() {
        let mut form = PredictionForm::new(DiseaseCategory::Diabetes);
        form.next_field();
        for c in "1x20".chars() {
            form.input_char(c);
        }
        assert_eq!(form.fields()[1].buffer(), "120");

        form.delete_char();
        assert_eq!(form.value("Glucose"), Ok(12.0));

        form.prev_field();
        form.prev_field();
        assert_eq!(form.selected(), 7);

        form.next_field();
        assert_eq!(form.selected(), 0);
    }

    #[test]
    fn test_step_adjusts_by_whole_units() {
        let mut form = PredictionForm::new(DiseaseCategory::Parkinsons);
        form.step(1.0).expect("step");
        form.step(1.0).expect("step");
        form.step(-1.0).expect("step");
        assert_eq!(form.value("MDVP:Fo(Hz)"), Ok(1.0));

        form.set_value("MDVP:Fo(Hz)", 0.1).expect("known key");
        form.step(1.0).expect("step");
        assert_eq!(form.fields()[0].buffer(), "1.1");
    }

    #[test]
    fn test_step_on_huge_value_stays_numeric() {
        let mut form = PredictionForm::new(DiseaseCategory::Diabetes);
        form.set_value("Pregnancies", 1e300).expect("known key");
        form.step(1.0).expect("step");
        assert_eq!(form.value("Pregnancies"), Ok(1e300));

        form.set_value("Pregnancies", f64::MAX).expect("known key");
        form.step(1.0).expect("step");
        assert_eq!(form.value("Pregnancies"), Ok(f64::MAX));
    }

    #[test]
    fn test_invalid_buffer_reported_by_label() {
        let mut form = PredictionForm::new(DiseaseCategory::Diabetes);
        for c in "1.2.3".chars() {
            form.input_char(c);
        }
        assert_eq!(
            form.feature_vector(),
            Err(FormError::InvalidNumber {
                label: "Pregnancies"
            })
        );
        assert!(form.step(1.0).is_err());
        assert_eq!(form.fields()[0].buffer(), "1.2.3");

        form.clear_field();
        assert!(form.feature_vector().is_ok());
    }

    #[test]
    fn test_load_sample_populates_catalog_order() {
        let mut form = PredictionForm::new(DiseaseCategory::Diabetes);
        form.load_sample();
        assert_eq!(
            form.feature_vector().expect("valid").as_slice(),
            &[1.0, 85.0, 66.0, 29.0, 0.0, 26.6, 0.351, 31.0]
        );
    }

    #[test]
    fn test_submit_records_prediction() {
        let mut form = PredictionForm::new(DiseaseCategory::LungCancer);
        let result = match form.submit(&dispatcher(1)) {
            FormPhase::Predicted(result) => result.clone(),
            other => panic!("expected a prediction, got {other:?}"),
        };
        assert_eq!(result.verdict, Verdict::Has);
        assert_eq!(result.message(), "The person has Lung Cancer");
    }

    #[test]
    fn test_edit_returns_to_awaiting_input() {
        let mut form = PredictionForm::new(DiseaseCategory::Diabetes);
        form.submit(&dispatcher(0));
        assert!(matches!(form.phase(), FormPhase::Predicted(_)));

        form.input_char('5');
        assert_eq!(form.phase(), &FormPhase::AwaitingInput);

        form.submit(&dispatcher(0));
        form.select_category(DiseaseCategory::Parkinsons);
        assert_eq!(form.phase(), &FormPhase::AwaitingInput);
    }

    #[test]
    fn test_submit_with_invalid_input_fails_visibly() {
        let mut form = PredictionForm::new(DiseaseCategory::HypoThyroid);
        form.input_char('-');
        let phase = form.submit(&dispatcher(1));
        assert_eq!(phase, &FormPhase::Failed("Age: Invalid number".into()));
    }
}
