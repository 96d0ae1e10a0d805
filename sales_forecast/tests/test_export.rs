use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sales_forecast::export::{ForecastTable, TableRow};
use sales_forecast::{DailySeries, ForecastPoint, SalesForecaster};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 2, d).unwrap()
}

#[test]
fn test_table_csv_has_date_and_forecast_columns() {
    let points = vec![
        ForecastPoint::new(day(1), 12.5),
        ForecastPoint::with_band(day(2), 13.25, 10.0, 16.0),
    ];
    let table = ForecastTable::from_points(&points);

    let csv = table.to_csv_string().unwrap();

    assert_eq!(csv, "Date,Forecast\n2018-02-01,12.5\n2018-02-02,13.25\n");
}

#[test]
fn test_empty_table_keeps_header() {
    let table = ForecastTable::default();

    assert!(table.is_empty());
    assert_eq!(table.to_csv_string().unwrap(), "Date,Forecast\n");
}

#[test]
fn test_table_json_rows() {
    let table = ForecastTable::from_points(&[ForecastPoint::new(day(3), 1.0)]);
    let rows: Vec<TableRow> = serde_json::from_str(&table.to_json().unwrap()).unwrap();

    assert_eq!(rows, table.rows().to_vec());
    assert!(table.to_json().unwrap().contains("\"Date\":\"2018-02-03\""));
}

#[test]
fn test_result_table_covers_future_dates_only() {
    let series = DailySeries::new("Envelope", day(1), (0..25).map(|i| 40.0 + i as f64).collect());
    let result = SalesForecaster::default()
        .forecast_decomposition(&series, 7)
        .unwrap();

    let table = result.to_table();
    assert_eq!(table.len(), 7);
    assert_eq!(table.rows()[0].date, day(26));

    let mut buffer = Vec::new();
    table.write_csv(&mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text.lines().count(), 8);
    assert!(text.starts_with("Date,Forecast\n"));
}

#[test]
fn test_result_serializes_to_json() {
    let series = DailySeries::new("Envelope", day(1), vec![3.0, 4.0, 5.0, 6.0]);
    let result = SalesForecaster::default()
        .forecast_decomposition(&series, 7)
        .unwrap();

    let json = result.to_json().unwrap();
    assert!(json.contains("\"strategy\":\"decomposition\""));
    assert!(json.contains("below_recommended_history"));

    let chart_json = result.chart().unwrap().to_json().unwrap();
    assert!(chart_json.contains("Envelope - Sales Forecast"));
}
