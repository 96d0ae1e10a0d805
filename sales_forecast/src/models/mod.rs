//! Forecasting strategies and their shared output contract

use crate::chart::ForecastChart;
use crate::error::Result;
use crate::export::ForecastTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod decomposition;
pub mod sequence;

/// Which strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Additive trend + seasonality model
    Decomposition,
    /// LSTM sequence model with autoregressive rollout
    Sequence,
}

impl Strategy {
    /// Human readable label used in chart titles
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Decomposition => "Decomposition",
            Strategy::Sequence => "LSTM",
        }
    }

    /// Default file name for the exported forecast table
    pub fn export_file_name(&self) -> &'static str {
        match self {
            Strategy::Decomposition => "decomposition_forecast.csv",
            Strategy::Sequence => "lstm_forecast.csv",
        }
    }
}

/// A single predicted value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Calendar date
    pub date: NaiveDate,
    /// Point prediction
    pub forecast: f64,
    /// Lower edge of the uncertainty band, if the strategy provides one
    pub lower: Option<f64>,
    /// Upper edge of the uncertainty band, if the strategy provides one
    pub upper: Option<f64>,
}

impl ForecastPoint {
    /// Create a point without an uncertainty band
    pub fn new(date: NaiveDate, forecast: f64) -> Self {
        Self {
            date,
            forecast,
            lower: None,
            upper: None,
        }
    }

    /// Create a point with an uncertainty band
    pub fn with_band(date: NaiveDate, forecast: f64, lower: f64, upper: f64) -> Self {
        Self {
            date,
            forecast,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Whether the prediction and both band edges are finite numbers
    pub fn is_finite(&self) -> bool {
        self.forecast.is_finite()
            && self.lower.map_or(true, f64::is_finite)
            && self.upper.map_or(true, f64::is_finite)
    }
}

/// Data the accuracy metric was computed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyScope {
    /// Predictions on the same observations the model was fitted to.
    /// This overstates out-of-sample accuracy.
    InSample,
}

/// Accuracy estimate attached to a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetric {
    /// Mean absolute percentage error in percent, `None` when undefined
    pub mape: Option<f64>,
    /// Terms that entered the mean
    pub evaluated: usize,
    /// Terms skipped because the actual value was zero
    pub skipped: usize,
    /// Data the metric was computed on
    pub scope: AccuracyScope,
}

/// Reasons a result should not be taken at face value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityFlag {
    /// History is shorter than the recommended length for the strategy
    BelowRecommendedHistory { observed: usize, recommended: usize },
    /// Zero actuals were left out of the MAPE mean
    ZeroActualsSkipped { skipped: usize, evaluated: usize },
    /// Every actual was zero, so MAPE is undefined
    MetricUndefined,
    /// MAPE is too large to be meaningful
    MapeUnreliable { mape: f64, threshold: f64 },
}

impl fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityFlag::BelowRecommendedHistory {
                observed,
                recommended,
            } => write!(
                f,
                "only {} days of history, {} recommended; results may be unreliable",
                observed, recommended
            ),
            QualityFlag::ZeroActualsSkipped { skipped, evaluated } => write!(
                f,
                "{} days with zero sales were excluded from MAPE ({} days evaluated)",
                skipped, evaluated
            ),
            QualityFlag::MetricUndefined => {
                write!(f, "MAPE is undefined because every actual value is zero")
            }
            QualityFlag::MapeUnreliable { mape, threshold } => write!(
                f,
                "MAPE of {:.2}% exceeds {:.0}% and is not reliable",
                mape, threshold
            ),
        }
    }
}

/// Output of either forecasting strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    strategy: Strategy,
    product: String,
    /// Reconstruction of the observed days, empty when the strategy has none
    fitted: Vec<ForecastPoint>,
    /// Predictions for the days after the last observation
    forecast: Vec<ForecastPoint>,
    accuracy: AccuracyMetric,
    flags: Vec<QualityFlag>,
    chart: Option<ForecastChart>,
}

impl ForecastResult {
    pub(crate) fn new(
        strategy: Strategy,
        product: impl Into<String>,
        fitted: Vec<ForecastPoint>,
        forecast: Vec<ForecastPoint>,
        accuracy: AccuracyMetric,
        flags: Vec<QualityFlag>,
    ) -> Self {
        Self {
            strategy,
            product: product.into(),
            fitted,
            forecast,
            accuracy,
            flags,
            chart: None,
        }
    }

    pub(crate) fn with_chart(mut self, chart: ForecastChart) -> Self {
        self.chart = Some(chart);
        self
    }

    /// Strategy that produced the result
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Product the forecast is for
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Predictions for future dates
    pub fn forecast(&self) -> &[ForecastPoint] {
        &self.forecast
    }

    /// Reconstruction of the observed dates
    pub fn fitted(&self) -> &[ForecastPoint] {
        &self.fitted
    }

    /// Fitted and future points in date order
    pub fn timeline(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.fitted.iter().chain(self.forecast.iter())
    }

    /// Number of future days forecasted
    pub fn horizons(&self) -> usize {
        self.forecast.len()
    }

    /// Future point predictions
    pub fn values(&self) -> Vec<f64> {
        self.forecast.iter().map(|p| p.forecast).collect()
    }

    /// Accuracy estimate
    pub fn accuracy(&self) -> &AccuracyMetric {
        &self.accuracy
    }

    /// MAPE in percent, `None` when undefined
    pub fn mape(&self) -> Option<f64> {
        self.accuracy.mape
    }

    /// Quality flags raised while producing the result
    pub fn flags(&self) -> &[QualityFlag] {
        &self.flags
    }

    /// Whether the result carries no quality flags
    pub fn is_reliable(&self) -> bool {
        self.flags.is_empty()
    }

    /// Chart description, if one was produced
    pub fn chart(&self) -> Option<&ForecastChart> {
        self.chart.as_ref()
    }

    /// `Date`/`Forecast` table with one row per future date
    pub fn to_table(&self) -> ForecastTable {
        ForecastTable::from_points(self.forecast.iter())
    }

    /// `Date`/`Forecast` table covering the fitted and future dates
    pub fn to_full_table(&self) -> ForecastTable {
        ForecastTable::from_points(self.timeline())
    }

    /// Serialize the whole result to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
