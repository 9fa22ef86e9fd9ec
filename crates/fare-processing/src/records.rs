//! Conversion between DataFrames and typed [`FlightRecord`]s.

use crate::error::{ProcessingError, Result};
use crate::schema::{
    AIRLINE, ARRIVAL_TIME, CLASS, DAYS_LEFT, DEPARTURE_TIME, DESTINATION_CITY, DURATION,
    FlightRecord, PRICE, SOURCE_CITY, STOPS,
};
use polars::prelude::*;

fn materialized<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|column| column.as_materialized_series())
        .map_err(|_| ProcessingError::ColumnNotFound(name.to_string()))
}

fn null_error(name: &str, row: usize) -> ProcessingError {
    ProcessingError::InvalidData(format!("column '{}' has a missing value at row {}", name, row))
}

fn string_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = materialized(df, name)?.cast(&DataType::String)?;
    series
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.map(str::to_string).ok_or_else(|| null_error(name, row)))
        .collect()
}

fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let series = materialized(df, name)?.cast(&DataType::Int64)?;
    series
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| null_error(name, row)))
        .collect()
}

fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = materialized(df, name)?.cast(&DataType::Float64)?;
    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| null_error(name, row)))
        .collect()
}

/// Extract the feature columns of `df` as records. Extra columns are ignored.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<FlightRecord>> {
    let airline = string_values(df, AIRLINE)?;
    let source_city = string_values(df, SOURCE_CITY)?;
    let departure_time = string_values(df, DEPARTURE_TIME)?;
    let stops = string_values(df, STOPS)?;
    let arrival_time = string_values(df, ARRIVAL_TIME)?;
    let destination_city = string_values(df, DESTINATION_CITY)?;
    let class = string_values(df, CLASS)?;
    let duration = i64_values(df, DURATION)?;
    let days_left = i64_values(df, DAYS_LEFT)?;

    let records = airline
        .into_iter()
        .zip(source_city)
        .zip(departure_time)
        .zip(stops)
        .zip(arrival_time)
        .zip(destination_city)
        .zip(class)
        .zip(duration.into_iter().zip(days_left))
        .map(
            |(
                ((((((airline, source_city), departure_time), stops), arrival_time), destination_city), class),
                (duration, days_left),
            )| FlightRecord {
                airline,
                source_city,
                departure_time,
                stops,
                arrival_time,
                destination_city,
                class,
                duration,
                days_left,
            },
        )
        .collect();

    Ok(records)
}

/// Extract the `price` column.
pub fn targets_from_frame(df: &DataFrame) -> Result<Vec<f64>> {
    f64_values(df, PRICE)
}

/// Build a DataFrame from records, optionally with a `price` column.
pub fn frame_from_records(records: &[FlightRecord], prices: Option<&[f64]>) -> Result<DataFrame> {
    fn strings(records: &[FlightRecord], get: fn(&FlightRecord) -> &str) -> Vec<&str> {
        records.iter().map(get).collect()
    }

    let mut columns: Vec<Column> = vec![
        Column::new(AIRLINE.into(), strings(records, |r| &r.airline)),
        Column::new(SOURCE_CITY.into(), strings(records, |r| &r.source_city)),
        Column::new(DEPARTURE_TIME.into(), strings(records, |r| &r.departure_time)),
        Column::new(STOPS.into(), strings(records, |r| &r.stops)),
        Column::new(ARRIVAL_TIME.into(), strings(records, |r| &r.arrival_time)),
        Column::new(DESTINATION_CITY.into(), strings(records, |r| &r.destination_city)),
        Column::new(CLASS.into(), strings(records, |r| &r.class)),
        Column::new(
            DURATION.into(),
            records.iter().map(|r| r.duration).collect::<Vec<i64>>(),
        ),
        Column::new(
            DAYS_LEFT.into(),
            records.iter().map(|r| r.days_left).collect::<Vec<i64>>(),
        ),
    ];

    if let Some(prices) = prices {
        if prices.len() != records.len() {
            return Err(ProcessingError::InvalidData(format!(
                "{} prices for {} records",
                prices.len(),
                records.len()
            )));
        }
        columns.push(Column::new(PRICE.into(), prices.to_vec()));
    }

    Ok(DataFrame::new(columns)?)
}
