//! Raw data loading and cleaning.
//!
//! The loader reads the raw CSV export, rewrites `duration` from fractional
//! hours to whole minutes, drops exact duplicate rows and persists the result
//! as a Parquet snapshot for the training stage.

use crate::error::{ProcessingError, Result, ResultExt};
use crate::persist::write_with_cleanup;
use crate::schema::DURATION;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Convert a duration in fractional hours to whole minutes (truncating).
#[inline]
pub fn hours_to_minutes(hours: f64) -> i64 {
    (hours * 60.0).trunc() as i64
}

/// What happened while loading the raw file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub duplicates_removed: usize,
    pub rows_kept: usize,
}

/// Loader for the raw flight price export.
pub struct DataLoader;

impl DataLoader {
    /// Read, convert and deduplicate the raw file at `path`.
    pub fn load(path: &Path) -> Result<(DataFrame, LoadSummary)> {
        let mut df = read_csv(path)?;
        let rows_read = df.height();
        info!("Read {} rows and {} columns", rows_read, df.width());

        convert_duration(&mut df)?;
        let df = remove_duplicates(&df)?;

        let summary = LoadSummary {
            rows_read,
            duplicates_removed: rows_read - df.height(),
            rows_kept: df.height(),
        };
        if summary.duplicates_removed > 0 {
            info!("Removed {} duplicate rows", summary.duplicates_removed);
        } else {
            debug!("No duplicate rows found");
        }

        Ok((df, summary))
    }
}

/// Load the cleaned table from the raw file at `path`.
pub fn load_raw_data(path: &Path) -> Result<DataFrame> {
    DataLoader::load(path).map(|(df, _)| df)
}

/// Read a CSV file with a header row.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ProcessingError::DataFileNotFound {
            path: path.to_path_buf(),
        });
    }

    CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .context(format!("Failed to read {}", path.display()))
}

/// Rewrite the `duration` column from fractional hours to whole minutes.
///
/// Accepts a numeric or textual column. Missing and unparseable values are
/// rejected.
pub fn convert_duration(df: &mut DataFrame) -> Result<()> {
    let column = df
        .column(DURATION)
        .map_err(|_| ProcessingError::ColumnNotFound(DURATION.to_string()))?;
    let series = column.as_materialized_series();

    let hours: Vec<Option<f64>> = match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .map(|value| value.and_then(|v| v.trim().parse::<f64>().ok()))
            .collect(),
        _ => {
            let as_float = series.cast(&DataType::Float64)?;
            as_float.f64()?.into_iter().collect()
        }
    };

    let mut minutes = Vec::with_capacity(hours.len());
    for (row, value) in hours.into_iter().enumerate() {
        match value {
            Some(h) if h.is_finite() => minutes.push(hours_to_minutes(h)),
            _ => {
                return Err(ProcessingError::InvalidData(format!(
                    "row {}: '{}' is not a duration in hours",
                    row, DURATION
                )));
            }
        }
    }

    df.replace(DURATION, Series::new(DURATION.into(), minutes))?;
    Ok(())
}

/// Drop rows whose every field equals an earlier row. Keeps first occurrences
/// in their original order.
pub fn remove_duplicates(df: &DataFrame) -> Result<DataFrame> {
    Ok(df.unique_stable(None, UniqueKeepStrategy::First, None)?)
}

/// Persist the cleaned table as a Parquet snapshot.
///
/// Parent directories are created as needed. A failed write leaves no file
/// behind.
pub fn save_snapshot(df: &mut DataFrame, path: &Path) -> Result<()> {
    write_with_cleanup::<ProcessingError, _>(path, |writer| {
        ParquetWriter::new(writer).finish(df)?;
        Ok(())
    })
    .context(format!("Failed to save snapshot to {}", path.display()))?;

    info!("Snapshot saved: {}", path.display());
    Ok(())
}

/// Read a snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ProcessingError::SnapshotNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    ParquetReader::new(file)
        .finish()
        .context(format!("Failed to read snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame() -> DataFrame {
        df![
            "airline" => ["Indigo", "Indigo", "Vistara"],
            "duration" => [2.5, 2.5, 2.17],
            "days_left" => [7i64, 7, 12],
        ]
        .unwrap()
    }

    #[test]
    fn test_hours_to_minutes_truncates() {
        assert_eq!(hours_to_minutes(2.5), 150);
        assert_eq!(hours_to_minutes(2.17), 130);
        assert_eq!(hours_to_minutes(1.0), 60);
        assert_eq!(hours_to_minutes(0.99), 59);
    }

    #[test]
    fn test_hours_to_minutes_matches_floor() {
        let mut hours = 0.0;
        while hours <= 30.0 {
            assert_eq!(hours_to_minutes(hours), (hours * 60.0).floor() as i64);
            hours += 0.07;
        }
    }

    #[test]
    fn test_convert_duration_numeric_column() {
        let mut df = frame();
        convert_duration(&mut df).unwrap();

        let minutes: Vec<Option<i64>> = df
            .column(DURATION)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(minutes, vec![Some(150), Some(150), Some(130)]);
    }

    #[test]
    fn test_convert_duration_text_column() {
        let mut df = df![
            "duration" => ["2.5", " 10.25 "],
        ]
        .unwrap();
        convert_duration(&mut df).unwrap();

        let minutes: Vec<Option<i64>> = df
            .column(DURATION)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(minutes, vec![Some(150), Some(615)]);
    }

    #[test]
    fn test_convert_duration_rejects_garbage() {
        let mut df = df![
            "duration" => ["2.5", "two hours"],
        ]
        .unwrap();
        let err = convert_duration(&mut df).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");
    }

    #[test]
    fn test_convert_duration_missing_column() {
        let mut df = df!["airline" => ["Indigo"]].unwrap();
        let err = convert_duration(&mut df).unwrap_err();
        assert!(matches!(err, ProcessingError::ColumnNotFound(ref c) if c == "duration"));
    }

    #[test]
    fn test_remove_duplicates_keeps_first_in_order() {
        let df = df![
            "airline" => ["Vistara", "Indigo", "Vistara", "AirAsia"],
            "days_left" => [3i64, 7, 3, 1],
        ]
        .unwrap();

        let deduped = remove_duplicates(&df).unwrap();
        let airlines: Vec<Option<&str>> = deduped
            .column("airline")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            airlines,
            vec![Some("Vistara"), Some("Indigo"), Some("AirAsia")]
        );
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let once = remove_duplicates(&frame()).unwrap();
        let twice = remove_duplicates(&once).unwrap();
        assert_eq!(once.height(), 2);
        assert_eq!(twice.height(), once.height());
    }

    #[test]
    fn test_read_csv_missing_file() {
        let err = read_csv(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), "DATA_FILE_NOT_FOUND");
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("processed_data.parquet");

        let mut df = frame();
        convert_duration(&mut df).unwrap();
        save_snapshot(&mut df, &path).unwrap();

        let restored = load_snapshot(&path).unwrap();
        assert!(restored.equals(&df));
    }

    #[test]
    fn test_load_snapshot_missing() {
        let err = load_snapshot(Path::new("missing.parquet")).unwrap_err();
        assert_eq!(err.error_code(), "SNAPSHOT_NOT_FOUND");
    }
}
