//! # Forecast Math
//!
//! Numeric kernels shared by the sales forecasting pipeline.
//! This crate provides min-max scaling with inverse transforms, accuracy
//! metrics, Fourier seasonality features and penalized least squares.

use thiserror::Error;

pub mod accuracy;
pub mod fourier;
pub mod regression;
pub mod scaling;

pub use accuracy::{mape, MapeReport};
pub use scaling::MinMaxScaler;

/// Errors that can occur in forecasting math
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;
