//! Accuracy metrics for paired actual/predicted series
//!
//! MAPE skips every term whose actual value is exactly zero: the term is
//! undefined there. The mean is taken over the remaining terms and the number
//! of skipped terms is reported so callers can flag the metric.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Outcome of a MAPE computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapeReport {
    /// Mean absolute percentage error in percent, `None` when every actual is zero
    pub value: Option<f64>,
    /// Number of terms that entered the mean
    pub evaluated: usize,
    /// Number of terms skipped because the actual value was zero
    pub skipped: usize,
}

impl MapeReport {
    /// Whether any term was skipped or the metric is undefined
    pub fn is_degenerate(&self) -> bool {
        self.skipped > 0 || self.value.is_none()
    }
}

fn check_pairs(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() {
        return Err(MathError::InvalidInput(
            "Actual and predicted values must be non-empty".to_string(),
        ));
    }
    if actual.len() != predicted.len() {
        return Err(MathError::InvalidInput(format!(
            "Actual length ({}) doesn't match predicted length ({})",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Mean absolute percentage error, `mean(|a - p| / |a|) * 100`
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<MapeReport> {
    check_pairs(actual, predicted)?;

    let mut sum = 0.0;
    let mut evaluated = 0;
    let mut skipped = 0;

    for (&a, &p) in actual.iter().zip(predicted.iter()) {
        if a == 0.0 {
            skipped += 1;
            continue;
        }
        sum += (a - p).abs() / a.abs();
        evaluated += 1;
    }

    let value = if evaluated > 0 {
        Some(sum / evaluated as f64 * 100.0)
    } else {
        None
    };

    Ok(MapeReport {
        value,
        evaluated,
        skipped,
    })
}

/// Mean absolute error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pairs(actual, predicted)?;

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    Ok(sum / actual.len() as f64)
}

/// Root mean squared error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pairs(actual, predicted)?;

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    Ok((sum / actual.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mape_identical() {
        let actual = [10.0, 20.0, 30.0];
        let report = mape(&actual, &actual).unwrap();

        assert_eq!(report.value, Some(0.0));
        assert_eq!(report.evaluated, 3);
        assert_eq!(report.skipped, 0);
        assert!(!report.is_degenerate());
    }

    #[test]
    fn test_mape_value() {
        // 10% and 5% -> 7.5%
        let report = mape(&[100.0, 200.0], &[110.0, 190.0]).unwrap();
        assert_relative_eq!(report.value.unwrap(), 7.5, epsilon = 1e-9);
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        let report = mape(&[0.0, 100.0, 50.0], &[5.0, 90.0, 50.0]).unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.evaluated, 2);
        assert_relative_eq!(report.value.unwrap(), 5.0, epsilon = 1e-9);
        assert!(report.is_degenerate());
    }

    #[test]
    fn test_mape_all_zero_actuals() {
        let report = mape(&[0.0, 0.0], &[1.0, 2.0]).unwrap();

        assert_eq!(report.value, None);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_mape_negative_actuals_use_magnitude() {
        let report = mape(&[-50.0], &[-55.0]).unwrap();
        assert_relative_eq!(report.value.unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(mape(&[1.0, 2.0], &[1.0]).is_err());
        assert!(mape(&[], &[]).is_err());
        assert!(mean_absolute_error(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_error_helpers() {
        let actual = [10.0, 20.0, 30.0, 40.0, 50.0];
        let predicted = [12.0, 18.0, 33.0, 37.0, 52.0];

        assert_relative_eq!(
            mean_absolute_error(&actual, &predicted).unwrap(),
            2.4,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            root_mean_squared_error(&actual, &predicted).unwrap(),
            (30.0f64 / 5.0).sqrt(),
            epsilon = 1e-9
        );
    }
}
