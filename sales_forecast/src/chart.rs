//! Renderer-independent chart description
//!
//! The pipeline does not draw anything. It hands the presentation layer the
//! observed series, the forecast line and, when available, the uncertainty
//! band as plain data that serializes to JSON.

use crate::error::Result;
use crate::models::{ForecastPoint, Strategy};
use crate::series::DailySeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (date, value) pair of a line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One (date, lower, upper) triple of a shaded band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub date: NaiveDate,
    pub lower: f64,
    pub upper: f64,
}

/// Observed series overlaid with a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub observed: Vec<ChartPoint>,
    pub forecast: Vec<ChartPoint>,
    /// Empty when the strategy has no uncertainty estimate
    pub band: Vec<BandPoint>,
}

impl ForecastChart {
    /// Build a chart from the observed series and the points to overlay
    pub fn new<'a>(
        strategy: Strategy,
        series: &DailySeries,
        points: impl IntoIterator<Item = &'a ForecastPoint>,
    ) -> Self {
        let observed = series
            .points()
            .into_iter()
            .map(|(date, value)| ChartPoint { date, value })
            .collect();

        let mut forecast = Vec::new();
        let mut band = Vec::new();
        for point in points {
            forecast.push(ChartPoint {
                date: point.date,
                value: point.forecast,
            });
            if let (Some(lower), Some(upper)) = (point.lower, point.upper) {
                band.push(BandPoint {
                    date: point.date,
                    lower,
                    upper,
                });
            }
        }

        Self {
            title: format!("{} - Sales Forecast ({})", series.product(), strategy.label()),
            x_label: "Date".to_string(),
            y_label: "Sales".to_string(),
            observed,
            forecast,
            band,
        }
    }

    /// Serialize the chart to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
