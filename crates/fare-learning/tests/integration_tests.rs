//! Integration tests for the preprocessor builder and the trainer.
//!
//! These tests build a synthetic snapshot under a temporary project root and
//! run the training stage end to end.

use fare_learning::{
    LearningError, NamedModel, Preprocessor, Trainer, TrainerConfig, select_best,
};
use fare_processing::schema::{AIRLINES, CITIES, CLASSES, STOP_BUCKETS, TIME_BUCKETS};
use fare_processing::{
    FlightRecord, ProjectPaths, SplitConfig, frame_from_records, hours_to_minutes, save_snapshot,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Helper Functions
// ============================================================================

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values[rng.gen_range(0..values.len())]
}

/// A price that is exactly linear in the encoded features.
fn linear_price(record: &FlightRecord) -> f64 {
    let airline = AIRLINES
        .iter()
        .position(|a| *a == record.airline)
        .unwrap_or(0) as f64;
    let stops = STOP_BUCKETS
        .iter()
        .position(|s| *s == record.stops)
        .unwrap_or(0) as f64;
    let business = if record.class == "Business" { 1.0 } else { 0.0 };

    3000.0 + 450.0 * airline + 1800.0 * stops + 25000.0 * business
        + 4.0 * record.duration as f64
        - 60.0 * record.days_left as f64
}

fn synthetic_flights(rows: usize, seed: u64) -> (Vec<FlightRecord>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let records: Vec<FlightRecord> = (0..rows)
        .map(|_| FlightRecord {
            airline: pick(&mut rng, &AIRLINES).to_string(),
            source_city: pick(&mut rng, &CITIES).to_string(),
            departure_time: pick(&mut rng, &TIME_BUCKETS).to_string(),
            stops: pick(&mut rng, &STOP_BUCKETS).to_string(),
            arrival_time: pick(&mut rng, &TIME_BUCKETS).to_string(),
            destination_city: pick(&mut rng, &CITIES).to_string(),
            class: pick(&mut rng, &CLASSES).to_string(),
            duration: hours_to_minutes(rng.gen_range(1.0..30.0)),
            days_left: rng.gen_range(1..50),
        })
        .collect();
    let prices = records.iter().map(linear_price).collect();
    (records, prices)
}

fn small_config() -> TrainerConfig {
    TrainerConfig::builder()
        .n_estimators(8)
        .build()
        .expect("valid config")
}

/// Project root with a snapshot and a declared preprocessor.
fn prepared_project(rows: usize) -> (tempfile::TempDir, ProjectPaths) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let paths = ProjectPaths::new(dir.path());

    let (records, prices) = synthetic_flights(rows, 11);
    let mut df = frame_from_records(&records, Some(&prices)).unwrap();
    save_snapshot(&mut df, &paths.snapshot()).unwrap();
    Preprocessor::flight_default()
        .save(&paths.preprocessor())
        .unwrap();

    (dir, paths)
}

fn indigo_morning() -> FlightRecord {
    FlightRecord {
        airline: "Indigo".to_string(),
        source_city: "Delhi".to_string(),
        departure_time: "Morning".to_string(),
        stops: "zero".to_string(),
        arrival_time: "Evening".to_string(),
        destination_city: "Mumbai".to_string(),
        class: "Economy".to_string(),
        duration: hours_to_minutes(2.5),
        days_left: 7,
    }
}

// ============================================================================
// End-to-end Training
// ============================================================================

#[test]
fn test_run_writes_every_artifact() {
    let (_dir, paths) = prepared_project(200);

    let trainer = Trainer::new(small_config(), SplitConfig::default());
    let outcome = trainer.run(&paths).unwrap();

    for name in ["Linear Regression", "Random Forest", "Gradient Boosting"] {
        assert!(paths.model(name).exists(), "{} was not saved", name);
    }
    assert!(paths.best_model().exists());
    assert!(paths.metrics_table().exists());
    assert!(paths.training_report().exists());

    assert_eq!(outcome.report.train_rows, 160);
    assert_eq!(outcome.report.test_rows, 40);
    assert_eq!(outcome.metrics.rows().len(), 3);

    let preprocessor = Preprocessor::load(&paths.preprocessor()).unwrap();
    assert!(preprocessor.is_fitted());
    assert_eq!(
        preprocessor.n_features_out().unwrap(),
        outcome.report.n_features
    );
}

#[test]
fn test_metrics_csv_matches_outcome() {
    let (_dir, paths) = prepared_project(120);
    let outcome = Trainer::new(small_config(), SplitConfig::default())
        .run(&paths)
        .unwrap();

    let table = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(paths.metrics_table()))
        .unwrap()
        .finish()
        .unwrap();

    let columns: Vec<String> = table
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(columns, vec!["Model", "MSE", "R2"]);
    let models: Vec<Option<&str>> = table
        .column("Model")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        models,
        vec![
            Some("Linear Regression"),
            Some("Random Forest"),
            Some("Gradient Boosting"),
        ]
    );
    assert_eq!(outcome.metrics.rows()[0].model, "Linear Regression");
}

#[test]
fn test_dominating_model_is_persisted_as_best() {
    let (_dir, paths) = prepared_project(300);
    let outcome = Trainer::new(small_config(), SplitConfig::default())
        .run(&paths)
        .unwrap();

    // Prices are linear in the features, so least squares is exact.
    let linear = outcome.metrics.get("Linear Regression").unwrap();
    assert!(linear.r2 > 0.999_999);
    for row in outcome.metrics.rows().iter().skip(1) {
        assert!(row.r2 < linear.r2);
    }

    let best = NamedModel::load(&paths.best_model()).unwrap();
    assert_eq!(best.name, "Linear Regression");
    assert_eq!(best.name, select_best(&outcome.metrics).unwrap().model);
    assert_eq!(outcome.report.best_model, best.name);
}

#[test]
fn test_training_is_reproducible() {
    let (_dir_a, paths_a) = prepared_project(150);
    let (_dir_b, paths_b) = prepared_project(150);
    let trainer = Trainer::new(small_config(), SplitConfig::default());

    let first = trainer.run(&paths_a).unwrap();
    let second = trainer.run(&paths_b).unwrap();

    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.best_model, second.best_model);
}

#[test]
fn test_serving_a_single_record() {
    let (_dir, paths) = prepared_project(200);
    Trainer::new(small_config(), SplitConfig::default())
        .run(&paths)
        .unwrap();

    let preprocessor = Preprocessor::load(&paths.preprocessor()).unwrap();
    let model = NamedModel::load(&paths.best_model()).unwrap();

    let record = indigo_morning();
    assert_eq!(record.duration, 150);

    let features = preprocessor.transform(&[record]).unwrap();
    assert_eq!(features.nrows(), 1);
    assert_eq!(features.ncols(), preprocessor.n_features_out().unwrap());

    let prediction = model.predict(features.view()).unwrap();
    assert_eq!(prediction.len(), 1);
    assert!(prediction[0].is_finite());
    assert!(prediction[0] >= 0.0);
}

// ============================================================================
// Stage Ordering
// ============================================================================

#[test]
fn test_train_without_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ProjectPaths::new(dir.path());

    let err = Trainer::default().run(&paths).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.error_code(), "SNAPSHOT_NOT_FOUND");
}

#[test]
fn test_train_without_preprocessor() {
    let (_dir, paths) = prepared_project(50);
    std::fs::remove_file(paths.preprocessor()).unwrap();

    let err = Trainer::new(small_config(), SplitConfig::default())
        .run(&paths)
        .unwrap_err();
    assert!(matches!(err, LearningError::ArtifactNotFound { .. }));
    assert!(!paths.best_model().exists());
}
