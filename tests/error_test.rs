//! Tests for error types

use ensemble_signal::Error;

#[test]
fn test_missing_column_error() {
    let error = Error::MissingColumn("label".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Missing required column"));
    assert!(error_str.contains("'label'"));
}

#[test]
fn test_invalid_value_error() {
    let error = Error::InvalidValue {
        column: "f1".to_string(),
        row: 3,
        message: "'abc' is not numeric".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("column 'f1'"));
    assert!(error_str.contains("row 3"));
    assert!(error_str.contains("abc"));
}

#[test]
fn test_artifact_not_found_error() {
    let error = Error::ArtifactNotFound {
        feature: "f1".to_string(),
        family: "forest".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Artifact not found"));
    assert!(error_str.contains("'forest'"));
    assert!(error.is_not_found());
}

#[test]
fn test_fit_failed_error() {
    let error = Error::FitFailed {
        family: "logit".to_string(),
        reason: "needs at least 2 distinct class(es)".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Fitting logit failed"));
    assert!(!error.is_not_found());
}

#[test]
fn test_storage_error() {
    let error = Error::StorageError("file not found".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Storage error"));
    assert!(error_str.contains("file not found"));
}

#[test]
fn test_invalid_input_error() {
    let error = Error::InvalidInput("holdout_percent must be within 1..=99".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid input"));
    assert!(error_str.contains("holdout_percent"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
    assert!(error_str.contains("missing.csv"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("JSON error"));
}

#[test]
fn test_error_debug_format() {
    let error = Error::MissingColumn("timestamp".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("MissingColumn"));
}
