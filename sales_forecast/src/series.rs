//! Daily sales series for one product
//!
//! A [`DailySeries`] stores its first date and one value per consecutive
//! calendar day, so it cannot contain gaps or duplicate dates.

use crate::data::RawRecord;
use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Distinct dates a product needs before any strategy can run
pub const MIN_DISTINCT_DATES: usize = 2;

/// Inclusive calendar range used to filter transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting a start after the end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ForecastError::InvalidParameter(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// First day of the range
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Calendar-complete daily sales for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    product: String,
    start: NaiveDate,
    values: Vec<f64>,
}

impl DailySeries {
    /// Create a series whose first value falls on `start`
    pub fn new(product: impl Into<String>, start: NaiveDate, values: Vec<f64>) -> Self {
        Self {
            product: product.into(),
            start,
            values,
        }
    }

    /// Product identifier
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Sales values, one per day
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of days
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series has no days
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First day
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Last day, `None` for an empty series
    pub fn end_date(&self) -> Option<NaiveDate> {
        match self.values.len() {
            0 => None,
            n => self.date_at(n - 1),
        }
    }

    /// Date of the value at `index`
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.start.checked_add_days(Days::new(index as u64))
    }

    /// All dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take(self.values.len())
            .collect()
    }

    /// (date, sales) pairs in order
    pub fn points(&self) -> Vec<(NaiveDate, f64)> {
        self.dates()
            .into_iter()
            .zip(self.values.iter().copied())
            .collect()
    }

    /// Total sales over the series
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Aggregate transactions into a daily series for one product
///
/// Records are filtered by product and, if given, by the inclusive date
/// range. Sales are summed per calendar day and every day between the first
/// and last remaining order gets an entry, zero when nothing was sold.
pub fn build_series(
    records: &[RawRecord],
    product: &str,
    range: Option<DateRange>,
) -> Result<DailySeries> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for record in records
        .iter()
        .filter(|r| r.product == product)
        .filter(|r| range.map_or(true, |range| range.contains(r.order_date)))
    {
        *by_day.entry(record.order_date).or_insert(0.0) += record.sales;
    }

    if by_day.len() < MIN_DISTINCT_DATES {
        return Err(ForecastError::InsufficientData {
            needed: MIN_DISTINCT_DATES,
            got: by_day.len(),
        });
    }

    // Non-empty: checked above
    let (first, last) = match (by_day.keys().next(), by_day.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(ForecastError::InsufficientData {
                needed: MIN_DISTINCT_DATES,
                got: 0,
            })
        }
    };

    let values: Vec<f64> = first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|day| by_day.get(&day).copied().unwrap_or(0.0))
        .collect();

    debug!(
        "Built daily series for '{}': {} order days over {} calendar days",
        product,
        by_day.len(),
        values.len()
    );

    Ok(DailySeries::new(product, first, values))
}
