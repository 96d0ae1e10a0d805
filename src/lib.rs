//! # Sales Forecast Workspace
//!
//! Umbrella crate re-exporting the workspace members:
//!
//! - [`forecast_math`]: scaling, accuracy metrics, Fourier features and
//!   penalized least squares
//! - [`sales_forecast`]: series building, the decomposition and LSTM
//!   forecasters, export and chart data
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use sales_forecast_workspace::sales_forecast::{DailySeries, SalesForecaster};
//!
//! let start = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
//! let series = DailySeries::new("Staples", start, vec![100.0; 90]);
//!
//! let result = SalesForecaster::default()
//!     .forecast_decomposition(&series, 30)
//!     .unwrap();
//! assert_eq!(result.horizons(), 30);
//! ```

pub use forecast_math;
pub use sales_forecast;

pub use sales_forecast::{
    build_series, forecast_decomposition, forecast_sequence, DailySeries, ForecastError,
    ForecastResult, SalesForecaster,
};
