//! # Sales Forecast
//!
//! A Rust library for per-product daily sales forecasting from transaction records.
//!
//! ## Features
//!
//! - Transaction ingestion from CSV or Polars data frames
//! - Gap-free daily series per product, with optional date range filtering
//! - Additive decomposition forecaster (piecewise linear trend + Fourier seasonality)
//! - LSTM sequence forecaster with autoregressive multi-step rollout
//! - In-sample MAPE with explicit quality flags instead of silent clamping
//! - `Date`/`Forecast` table export and a renderer-independent chart description
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sales_forecast::data::{ColumnMapping, DataLoader};
//! use sales_forecast::SalesForecaster;
//!
//! # fn main() -> sales_forecast::Result<()> {
//! let dataset = DataLoader::from_csv("superstore.csv", ColumnMapping::default())?;
//! let records = dataset.records()?;
//!
//! let forecaster = SalesForecaster::default();
//! let series = forecaster.build_series(&records, "Staples", None)?;
//!
//! let decomposition = forecaster.forecast_decomposition(&series, 30)?;
//! println!("MAPE: {:?}", decomposition.mape());
//!
//! let lstm = forecaster.forecast_sequence(&series, 30, 20, 10)?;
//! println!("{}", lstm.to_table().to_csv_string()?);
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod series;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{DecompositionConfig, ForecastPolicy, SequenceConfig};
pub use crate::data::{DataLoader, RawRecord};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastPoint, ForecastResult, QualityFlag, Strategy};
pub use crate::pipeline::SalesForecaster;
pub use crate::series::{DailySeries, DateRange};

/// Build a daily series for one product
pub fn build_series(
    records: &[RawRecord],
    product: &str,
    range: Option<DateRange>,
) -> Result<DailySeries> {
    SalesForecaster::default().build_series(records, product, range)
}

/// Decomposition forecast with the default policy
pub fn forecast_decomposition(series: &DailySeries, horizon_days: usize) -> Result<ForecastResult> {
    SalesForecaster::default().forecast_decomposition(series, horizon_days)
}

/// Sequence forecast with the default policy
pub fn forecast_sequence(
    series: &DailySeries,
    window_size: usize,
    iterations: usize,
    future_steps: usize,
) -> Result<ForecastResult> {
    SalesForecaster::default().forecast_sequence(series, window_size, iterations, future_steps)
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
