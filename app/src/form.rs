//! The prediction form: field definitions, submissions and the predictor.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──submit──▶ Predicting ──price or error──▶ Idle
//! ```
//!
//! A submission always ends back in `Idle`. Failures are rendered as a
//! message and never end the session.

use crate::error::{PredictorError, Result};
use crate::state::LoadedArtifacts;
use fare_processing::schema::{self, AIRLINES, CITIES, CLASSES, STOP_BUCKETS, TIME_BUCKETS};
use fare_processing::{FlightRecord, hours_to_minutes};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// FIELD DEFINITIONS
// ============================================================================

/// A drop-down field.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChoiceField {
    pub name: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
}

/// A bounded numeric field.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NumberField<T> {
    pub name: &'static str,
    pub label: &'static str,
    pub min: T,
    pub max: T,
    pub default: T,
    pub step: T,
}

impl<T: PartialOrd + Copy + std::fmt::Display> NumberField<T> {
    /// Check that `value` lies within `[min, max]`.
    pub fn check(&self, value: T) -> std::result::Result<(), String> {
        if value < self.min || value > self.max {
            return Err(format!(
                "{} must be between {} and {}",
                self.label, self.min, self.max
            ));
        }
        Ok(())
    }
}

impl NumberField<f64> {
    /// Snap `value` to the nearest multiple of `step`.
    pub fn snap(&self, value: f64) -> f64 {
        let steps = (value / self.step).round();
        // Round again so 2.5 stays 2.5 instead of 2.5000000000000004.
        (steps * self.step * 1e6).round() / 1e6
    }
}

/// The categorical fields, in the order they are asked.
pub const CHOICE_FIELDS: [ChoiceField; 7] = [
    ChoiceField {
        name: schema::AIRLINE,
        label: "Airline",
        options: &AIRLINES,
    },
    ChoiceField {
        name: schema::SOURCE_CITY,
        label: "Source City",
        options: &CITIES,
    },
    ChoiceField {
        name: schema::DEPARTURE_TIME,
        label: "Departure Time",
        options: &TIME_BUCKETS,
    },
    ChoiceField {
        name: schema::STOPS,
        label: "Number of Stops",
        options: &STOP_BUCKETS,
    },
    ChoiceField {
        name: schema::ARRIVAL_TIME,
        label: "Arrival Time",
        options: &TIME_BUCKETS,
    },
    ChoiceField {
        name: schema::DESTINATION_CITY,
        label: "Destination City",
        options: &CITIES,
    },
    ChoiceField {
        name: schema::CLASS,
        label: "Class",
        options: &CLASSES,
    },
];

/// Flight duration, entered in hours.
pub const DURATION_FIELD: NumberField<f64> = NumberField {
    name: schema::DURATION,
    label: "Duration (hours)",
    min: 1.0,
    max: 30.0,
    default: 2.5,
    step: 0.1,
};

pub const DAYS_LEFT_FIELD: NumberField<i64> = NumberField {
    name: schema::DAYS_LEFT,
    label: "Days Left Until Departure",
    min: 1,
    max: 50,
    default: 7,
    step: 1,
};

// ============================================================================
// SUBMISSION
// ============================================================================

/// One filled-in form. `duration_hours` is in hours, as entered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSubmission {
    pub airline: String,
    pub source_city: String,
    pub departure_time: String,
    pub stops: String,
    pub arrival_time: String,
    pub destination_city: String,
    pub class: String,
    pub duration_hours: f64,
    pub days_left: i64,
}

impl FormSubmission {
    /// The value of the categorical field `name`.
    pub fn choice(&self, name: &str) -> Option<&str> {
        let value = match name {
            schema::AIRLINE => &self.airline,
            schema::SOURCE_CITY => &self.source_city,
            schema::DEPARTURE_TIME => &self.departure_time,
            schema::STOPS => &self.stops,
            schema::ARRIVAL_TIME => &self.arrival_time,
            schema::DESTINATION_CITY => &self.destination_city,
            schema::CLASS => &self.class,
            _ => return None,
        };
        Some(value)
    }

    pub fn choice_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            schema::AIRLINE => Some(&mut self.airline),
            schema::SOURCE_CITY => Some(&mut self.source_city),
            schema::DEPARTURE_TIME => Some(&mut self.departure_time),
            schema::STOPS => Some(&mut self.stops),
            schema::ARRIVAL_TIME => Some(&mut self.arrival_time),
            schema::DESTINATION_CITY => Some(&mut self.destination_city),
            schema::CLASS => Some(&mut self.class),
            _ => None,
        }
    }

    /// Check every field against its definition.
    pub fn validate(&self) -> Result<()> {
        for field in &CHOICE_FIELDS {
            let value = self.choice(field.name).unwrap_or_default();
            if !field.options.contains(&value) {
                return Err(PredictorError::Prediction(format!(
                    "'{}' is not a valid {}",
                    value, field.label
                )));
            }
        }
        if !self.duration_hours.is_finite() {
            return Err(PredictorError::Prediction(format!(
                "{} must be a number",
                DURATION_FIELD.label
            )));
        }
        DURATION_FIELD
            .check(self.duration_hours)
            .map_err(PredictorError::Prediction)?;
        DAYS_LEFT_FIELD
            .check(self.days_left)
            .map_err(PredictorError::Prediction)?;
        Ok(())
    }

    /// The record the model sees. Duration is converted to whole minutes,
    /// matching the loaded training data.
    pub fn to_record(&self) -> Result<FlightRecord> {
        self.validate()?;
        Ok(FlightRecord {
            airline: self.airline.clone(),
            source_city: self.source_city.clone(),
            departure_time: self.departure_time.clone(),
            stops: self.stops.clone(),
            arrival_time: self.arrival_time.clone(),
            destination_city: self.destination_city.clone(),
            class: self.class.clone(),
            duration: hours_to_minutes(self.duration_hours),
            days_left: self.days_left,
        })
    }
}

impl Default for FormSubmission {
    /// The first option of every drop-down and the numeric defaults.
    fn default() -> Self {
        Self {
            airline: AIRLINES[0].to_string(),
            source_city: CITIES[0].to_string(),
            departure_time: TIME_BUCKETS[0].to_string(),
            stops: STOP_BUCKETS[0].to_string(),
            arrival_time: TIME_BUCKETS[0].to_string(),
            destination_city: CITIES[0].to_string(),
            class: CLASSES[0].to_string(),
            duration_hours: DURATION_FIELD.default,
            days_left: DAYS_LEFT_FIELD.default,
        }
    }
}

// ============================================================================
// PREDICTOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PredictorState {
    Idle,
    Predicting,
}

/// Prices submissions with a set of loaded artifacts.
#[derive(Debug)]
pub struct Predictor<'a> {
    artifacts: &'a LoadedArtifacts,
    state: PredictorState,
}

impl<'a> Predictor<'a> {
    pub fn new(artifacts: &'a LoadedArtifacts) -> Self {
        Self {
            artifacts,
            state: PredictorState::Idle,
        }
    }

    pub fn state(&self) -> PredictorState {
        self.state
    }

    /// Predict the price of `submission`.
    pub fn predict(&mut self, submission: &FormSubmission) -> Result<f64> {
        self.state = PredictorState::Predicting;
        let outcome = submission
            .to_record()
            .and_then(|record| self.artifacts.predict(&record));
        self.state = PredictorState::Idle;

        if let Ok(price) = &outcome {
            debug!("Predicted {:.2} for {:?}", price, submission);
        }
        outcome
    }

    /// Predict and render the result line shown to the user.
    pub fn submit(&mut self, submission: &FormSubmission) -> String {
        match self.predict(submission) {
            Ok(price) => format_price(price),
            Err(err) if !err.is_fatal() => err.to_string(),
            Err(other) => PredictorError::Prediction(other.to_string()).to_string(),
        }
    }
}

pub fn format_price(price: f64) -> String {
    format!("Predicted Price: ₹{:.2}", price)
}
