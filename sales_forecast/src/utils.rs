//! Utility functions for the sales_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};

/// Consecutive days following `last`
pub fn future_dates(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    let first = last.checked_add_days(Days::new(1)).ok_or_else(|| {
        ForecastError::InvalidParameter(format!("No calendar day follows {}", last))
    })?;

    let dates: Vec<NaiveDate> = first.iter_days().take(horizon).collect();
    if dates.len() != horizon {
        return Err(ForecastError::InvalidParameter(format!(
            "Horizon of {} days runs past the supported calendar",
            horizon
        )));
    }

    Ok(dates)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Whether every value is a finite number
pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}
