//! Terminal prompts for the prediction form.

use crate::error::Result;
use crate::form::{CHOICE_FIELDS, ChoiceField, DAYS_LEFT_FIELD, DURATION_FIELD, FormSubmission};
use dialoguer::{Confirm, Input, Select};

/// Source of form submissions.
///
/// The session loop only talks to this trait, so it can be driven by a
/// terminal or by a scripted sequence in tests.
pub trait FormInput {
    /// Read one complete submission.
    fn read_submission(&mut self) -> Result<FormSubmission>;

    /// Ask whether to price another flight.
    fn predict_again(&mut self) -> Result<bool>;
}

/// Interactive prompts on the current terminal.
///
/// Drop-downs start at the previous answer so repeated predictions only need
/// the fields that changed.
#[derive(Debug, Default)]
pub struct TerminalForm {
    last: FormSubmission,
}

impl TerminalForm {
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&self, field: &ChoiceField) -> Result<String> {
        let current = self.last.choice(field.name).unwrap_or_default();
        let default = field
            .options
            .iter()
            .position(|option| *option == current)
            .unwrap_or(0);

        let index = Select::new()
            .with_prompt(field.label)
            .items(field.options)
            .default(default)
            .interact()?;
        Ok(field.options[index].to_string())
    }

    fn duration(&self) -> Result<f64> {
        let hours: f64 = Input::new()
            .with_prompt(DURATION_FIELD.label)
            .default(self.last.duration_hours)
            .validate_with(|value: &f64| -> std::result::Result<(), String> {
                if !value.is_finite() {
                    return Err("Enter a number".to_string());
                }
                DURATION_FIELD.check(*value)
            })
            .interact_text()?;
        Ok(DURATION_FIELD.snap(hours))
    }

    fn days_left(&self) -> Result<i64> {
        let days: i64 = Input::new()
            .with_prompt(DAYS_LEFT_FIELD.label)
            .default(self.last.days_left)
            .validate_with(|value: &i64| DAYS_LEFT_FIELD.check(*value))
            .interact_text()?;
        Ok(days)
    }
}

impl FormInput for TerminalForm {
    fn read_submission(&mut self) -> Result<FormSubmission> {
        let mut submission = self.last.clone();
        for field in &CHOICE_FIELDS {
            let value = self.select(field)?;
            if let Some(slot) = submission.choice_mut(field.name) {
                *slot = value;
            }
        }
        submission.duration_hours = self.duration()?;
        submission.days_left = self.days_left()?;

        self.last = submission.clone();
        Ok(submission)
    }

    fn predict_again(&mut self) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt("Predict another fare?")
            .default(true)
            .interact()?)
    }
}
