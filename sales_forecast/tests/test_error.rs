use forecast_math::MathError;
use sales_forecast::error::ForecastError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);

    match forecast_error {
        ForecastError::IoError(_) => {}
        _ => panic!("Expected IoError variant"),
    }

    let json_error = serde_json::from_str::<f64>("not json").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::SerializationError(_)
    ));
}

#[test]
fn test_math_error_conversion() {
    let invalid = ForecastError::from(MathError::InvalidInput("length mismatch".to_string()));
    assert!(matches!(invalid, ForecastError::InvalidParameter(_)));

    let singular = ForecastError::from(MathError::CalculationError("singular".to_string()));
    match singular {
        ForecastError::ForecastFailure(msg) => assert!(msg.contains("singular")),
        other => panic!("Expected ForecastFailure, got {:?}", other),
    }
}

#[test]
fn test_internal_math_error_is_a_forecast_failure() {
    let error = ForecastError::internal(MathError::InvalidInput(
        "Actual and predicted lengths differ: 2 vs 1".to_string(),
    ));
    match error {
        ForecastError::ForecastFailure(msg) => assert!(msg.contains("lengths differ")),
        other => panic!("Expected ForecastFailure, got {:?}", other),
    }

    let error = ForecastError::internal(MathError::CalculationError("singular".to_string()));
    assert!(matches!(error, ForecastError::ForecastFailure(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InsufficientData { needed: 60, got: 59 };
    let error_string = format!("{}", error);

    assert!(error_string.contains("60"));
    assert!(error_string.contains("59"));
    assert!(error.is_insufficient_data());

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error = ForecastError::from(io_error);
    let error_string = format!("{}", error);

    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
    assert!(!error.is_insufficient_data());
}
