//! Min-max scaling into the unit interval
//!
//! The scaler is fitted once on a series and then reused for every inverse
//! transform of values derived from that series.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Fitted min-max transform `x -> (x - min) / (max - min)`
///
/// When `min == max` the forward transform maps every value to `0.0` and the
/// inverse maps any value back to the constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    /// Fit the scaler on a series of values
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a scaler on an empty series".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Cannot fit a scaler on non-finite values".to_string(),
            ));
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self { min, max })
    }

    /// Fit the scaler and transform the same values in one step
    pub fn fit_transform(values: &[f64]) -> Result<(Vec<f64>, Self)> {
        let scaler = Self::fit(values)?;
        Ok((scaler.transform(values), scaler))
    }

    /// Lower bound seen during fitting
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound seen during fitting
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Whether the fitted series was constant
    pub fn is_degenerate(&self) -> bool {
        self.range() == 0.0
    }

    fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Scale a single value
    pub fn scale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            (value - self.min) / self.range()
        }
    }

    /// Map a single scaled value back to the original units
    pub fn unscale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            self.min
        } else {
            value * self.range() + self.min
        }
    }

    /// Scale values with the fitted parameters
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.scale(v)).collect()
    }

    /// Map scaled values back to the original units
    pub fn inverse(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.unscale(v)).collect()
    }
}
