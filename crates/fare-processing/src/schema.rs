//! Flight record schema: column names, column roles and category vocabularies.
//!
//! The role of every column is fixed in [`COLUMN_ROLES`]. Consumers look a
//! column up by name instead of inferring numeric vs categorical handling
//! from the data.

use serde::{Deserialize, Serialize};

pub const AIRLINE: &str = "airline";
pub const SOURCE_CITY: &str = "source_city";
pub const DEPARTURE_TIME: &str = "departure_time";
pub const STOPS: &str = "stops";
pub const ARRIVAL_TIME: &str = "arrival_time";
pub const DESTINATION_CITY: &str = "destination_city";
pub const CLASS: &str = "class";
pub const DURATION: &str = "duration";
pub const DAYS_LEFT: &str = "days_left";
pub const PRICE: &str = "price";

/// How a column takes part in training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    /// Standardized numeric feature.
    Numeric,
    /// One-hot encoded categorical feature.
    Categorical,
    /// Regression target.
    Target,
}

/// Static column → role table.
pub const COLUMN_ROLES: &[(&str, ColumnRole)] = &[
    (AIRLINE, ColumnRole::Categorical),
    (SOURCE_CITY, ColumnRole::Categorical),
    (DEPARTURE_TIME, ColumnRole::Categorical),
    (STOPS, ColumnRole::Categorical),
    (ARRIVAL_TIME, ColumnRole::Categorical),
    (DESTINATION_CITY, ColumnRole::Categorical),
    (CLASS, ColumnRole::Categorical),
    (DURATION, ColumnRole::Numeric),
    (DAYS_LEFT, ColumnRole::Numeric),
    (PRICE, ColumnRole::Target),
];

/// Numeric feature columns, in output order.
pub const NUMERIC_FEATURES: [&str; 2] = [DURATION, DAYS_LEFT];

/// Categorical feature columns, in output order.
pub const CATEGORICAL_FEATURES: [&str; 7] = [
    AIRLINE,
    SOURCE_CITY,
    DEPARTURE_TIME,
    STOPS,
    ARRIVAL_TIME,
    DESTINATION_CITY,
    CLASS,
];

pub const AIRLINES: [&str; 6] = [
    "SpiceJet",
    "AirAsia",
    "Vistara",
    "GO_FIRST",
    "Indigo",
    "Air_India",
];

pub const CITIES: [&str; 6] = [
    "Delhi",
    "Mumbai",
    "Bangalore",
    "Kolkata",
    "Hyderabad",
    "Chennai",
];

pub const TIME_BUCKETS: [&str; 6] = [
    "Early_Morning",
    "Morning",
    "Afternoon",
    "Evening",
    "Night",
    "Late_Night",
];

pub const STOP_BUCKETS: [&str; 3] = ["zero", "one", "two_or_more"];

pub const CLASSES: [&str; 2] = ["Economy", "Business"];

/// Look up the role of a column. `None` for columns outside the schema.
pub fn column_role(name: &str) -> Option<ColumnRole> {
    COLUMN_ROLES
        .iter()
        .find(|(column, _)| *column == name)
        .map(|(_, role)| *role)
}

/// A single feature value borrowed from a [`FlightRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Numeric(f64),
    Categorical(&'a str),
}

/// One flight, without its price.
///
/// `duration` is always expressed in whole minutes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightRecord {
    pub airline: String,
    pub source_city: String,
    pub departure_time: String,
    pub stops: String,
    pub arrival_time: String,
    pub destination_city: String,
    pub class: String,
    pub duration: i64,
    pub days_left: i64,
}

impl FlightRecord {
    /// Fetch a feature by column name.
    pub fn value(&self, column: &str) -> Option<FeatureValue<'_>> {
        let value = match column {
            AIRLINE => FeatureValue::Categorical(&self.airline),
            SOURCE_CITY => FeatureValue::Categorical(&self.source_city),
            DEPARTURE_TIME => FeatureValue::Categorical(&self.departure_time),
            STOPS => FeatureValue::Categorical(&self.stops),
            ARRIVAL_TIME => FeatureValue::Categorical(&self.arrival_time),
            DESTINATION_CITY => FeatureValue::Categorical(&self.destination_city),
            CLASS => FeatureValue::Categorical(&self.class),
            DURATION => FeatureValue::Numeric(self.duration as f64),
            DAYS_LEFT => FeatureValue::Numeric(self.days_left as f64),
            _ => return None,
        };
        Some(value)
    }

    pub fn numeric(&self, column: &str) -> Option<f64> {
        match self.value(column)? {
            FeatureValue::Numeric(v) => Some(v),
            FeatureValue::Categorical(_) => None,
        }
    }

    pub fn categorical(&self, column: &str) -> Option<&str> {
        match self.value(column)? {
            FeatureValue::Categorical(v) => Some(v),
            FeatureValue::Numeric(_) => None,
        }
    }
}
