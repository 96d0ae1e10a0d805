//! `Date`/`Forecast` table export

use crate::error::{ForecastError, Result};
use crate::models::ForecastPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One exported row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Forecast")]
    pub forecast: f64,
}

/// Two-column forecast table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastTable {
    rows: Vec<TableRow>,
}

impl ForecastTable {
    /// Build a table from forecast points, keeping their order
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a ForecastPoint>) -> Self {
        Self {
            rows: points
                .into_iter()
                .map(|p| TableRow {
                    date: p.date,
                    forecast: p.forecast,
                })
                .collect(),
        }
    }

    /// Table rows
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as CSV with a `Date,Forecast` header
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.rows.is_empty() {
            wtr.write_record(["Date", "Forecast"])?;
        }
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Render the table as a CSV string
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ForecastError::CsvError(e.to_string()))
    }

    /// Serialize the rows to a JSON array
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }
}
