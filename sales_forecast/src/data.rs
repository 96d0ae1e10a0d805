//! Transaction data handling for forecasting
//!
//! The source table arrives as a polars `DataFrame` (or a CSV file decoded
//! into one). Column names are normalized before lookup and every row is
//! turned into an immutable [`RawRecord`].

use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Date layouts accepted for the order date column
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Date-time layouts accepted for the order date column
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the origin of polars dates
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One sales transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Product identifier
    pub product: String,
    /// Calendar date of the order
    pub order_date: NaiveDate,
    /// Sales amount
    pub sales: f64,
}

impl RawRecord {
    /// Create a new record
    pub fn new(product: impl Into<String>, order_date: NaiveDate, sales: f64) -> Self {
        Self {
            product: product.into(),
            order_date,
            sales,
        }
    }
}

/// Normalize a column header: trim it and replace spaces with underscores
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Parse an order date in any of the accepted layouts
pub fn parse_order_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(datetime.date());
        }
    }

    Err(ForecastError::DataError(format!(
        "Unrecognized order date '{}'",
        raw
    )))
}

/// Names of the columns the pipeline reads, after normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Product identifier column
    pub product: String,
    /// Order date column
    pub order_date: String,
    /// Sales amount column
    pub sales: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            product: "Product_Name".to_string(),
            order_date: "Order_Date".to_string(),
            sales: "Sales".to_string(),
        }
    }
}

impl ColumnMapping {
    /// Create a mapping, normalizing the given names the same way headers are
    pub fn new(product: &str, order_date: &str, sales: &str) -> Self {
        Self {
            product: normalize_column_name(product),
            order_date: normalize_column_name(order_date),
            sales: normalize_column_name(sales),
        }
    }
}

/// Sales transactions held as a data frame with normalized headers
#[derive(Debug, Clone)]
pub struct SalesDataset {
    df: DataFrame,
    columns: ColumnMapping,
}

/// Data loader for transaction tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load transactions from a CSV file
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the usual source export
    /// is Latin-1 encoded.
    pub fn from_csv<P: AsRef<Path>>(path: P, columns: ColumnMapping) -> Result<SalesDataset> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .with_encoding(CsvEncoding::LossyUtf8)
            .finish()?;

        Self::from_dataframe(df, columns)
    }

    /// Wrap an existing data frame
    pub fn from_dataframe(mut df: DataFrame, columns: ColumnMapping) -> Result<SalesDataset> {
        let normalized: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| normalize_column_name(name))
            .collect();
        df.set_column_names(&normalized)?;

        for required in [&columns.product, &columns.order_date, &columns.sales] {
            if !normalized.iter().any(|name| name == required) {
                return Err(ForecastError::DataError(format!(
                    "Required column '{}' not found (have: {})",
                    required,
                    normalized.join(", ")
                )));
            }
        }

        info!(
            "Loaded sales table with {} rows and {} columns",
            df.height(),
            df.width()
        );

        Ok(SalesDataset { df, columns })
    }
}

impl SalesDataset {
    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the column mapping
    pub fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Convert every complete row into a record
    ///
    /// Rows with a missing product, date or sales value are dropped; an order
    /// date that cannot be parsed is an error.
    pub fn records(&self) -> Result<Vec<RawRecord>> {
        let products = self.df.column(&self.columns.product)?.cast(&DataType::Utf8)?;
        let dates = self.order_dates()?;
        let sales = self.df.column(&self.columns.sales)?.cast(&DataType::Float64)?;

        let products = products.utf8()?;
        let sales = sales.f64()?;

        let mut records = Vec::with_capacity(self.df.height());
        let mut dropped = 0usize;

        for ((product, date), amount) in products
            .into_iter()
            .zip(dates)
            .zip(sales.into_iter())
        {
            match (product, date, amount) {
                (Some(product), Some(date), Some(amount)) => {
                    records.push(RawRecord::new(product.trim(), date, amount));
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!("Dropped {} rows with missing values", dropped);
        }

        Ok(records)
    }

    /// Order dates of every row; temporal columns are read as calendar days
    fn order_dates(&self) -> Result<Vec<Option<NaiveDate>>> {
        let column = self.df.column(&self.columns.order_date)?;

        match column.dtype() {
            DataType::Date | DataType::Datetime(_, _) => {
                let days = column.cast(&DataType::Date)?.cast(&DataType::Int32)?;
                let days = days.i32()?;
                days.into_iter()
                    .map(|d| d.map(date_from_epoch_days).transpose())
                    .collect()
            }
            _ => {
                let text = column.cast(&DataType::Utf8)?;
                let text = text.utf8()?;
                text.into_iter()
                    .map(|d| d.map(parse_order_date).transpose())
                    .collect()
            }
        }
    }
}

fn date_from_epoch_days(days: i32) -> Result<NaiveDate> {
    days.checked_add(EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| {
            ForecastError::DataError(format!(
                "Order date {} days from 1970-01-01 is out of range",
                days
            ))
        })
}

/// Distinct product identifiers in first-seen order
pub fn products(records: &[RawRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.product.as_str()))
        .map(|r| r.product.clone())
        .collect()
}
