//! Fourier features for periodic seasonality

use crate::{MathError, Result};
use std::f64::consts::PI;

/// Build Fourier feature columns for a seasonal period
///
/// Returns `2 * order` columns, interleaved as `sin(2πkt/P), cos(2πkt/P)` for
/// `k = 1..=order`. Each column has one entry per element of `t`, where `t`
/// is measured in the same unit as `period` (days for daily data).
pub fn fourier_terms(t: &[f64], period: f64, order: usize) -> Result<Vec<Vec<f64>>> {
    if period <= 0.0 || !period.is_finite() {
        return Err(MathError::InvalidInput(format!(
            "Seasonal period must be positive, got {}",
            period
        )));
    }
    if order == 0 {
        return Err(MathError::InvalidInput(
            "Fourier order must be at least 1".to_string(),
        ));
    }

    let mut columns = Vec::with_capacity(2 * order);
    for k in 1..=order {
        let omega = 2.0 * PI * k as f64 / period;
        columns.push(t.iter().map(|&x| (omega * x).sin()).collect());
        columns.push(t.iter().map(|&x| (omega * x).cos()).collect());
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_and_periodicity() {
        let t: Vec<f64> = (0..21).map(|d| d as f64).collect();
        let cols = fourier_terms(&t, 7.0, 3).unwrap();

        assert_eq!(cols.len(), 6);
        assert!(cols.iter().all(|c| c.len() == 21));

        // Same phase one period later
        for col in &cols {
            assert_relative_eq!(col[2], col[9], epsilon = 1e-9);
            assert_relative_eq!(col[2], col[16], epsilon = 1e-9);
        }

        // cos at t = 0 is 1, sin at t = 0 is 0
        assert_relative_eq!(cols[0][0], 0.0);
        assert_relative_eq!(cols[1][0], 1.0);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(fourier_terms(&[0.0], 0.0, 3).is_err());
        assert!(fourier_terms(&[0.0], 7.0, 0).is_err());
    }
}
