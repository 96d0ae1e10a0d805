use chrono::{Days, NaiveDate};
use sales_forecast::data::{ColumnMapping, DataLoader, RawRecord};
use sales_forecast::{ForecastError, ForecastResult, SalesForecaster, SequenceConfig};
use std::env;
use std::fs::File;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Sales Forecast: Per-Product Example");
    println!("===================================\n");

    // Usage: forecast_product [CSV_PATH [PRODUCT]]
    let args: Vec<String> = env::args().collect();
    let records = match args.get(1) {
        Some(path) => {
            println!("Loading transactions from {}...", path);
            DataLoader::from_csv(path, ColumnMapping::default())?.records()?
        }
        None => {
            println!("No CSV given, generating sample transactions...");
            create_sample_records()
        }
    };

    let forecaster = SalesForecaster::default();
    let products = forecaster.products(&records);
    println!("{} records, {} products\n", records.len(), products.len());

    let product = match args.get(2) {
        Some(product) => product.clone(),
        None => products.first().cloned().ok_or("no products in the data")?,
    };

    let series = forecaster.build_series(&records, &product, None)?;
    println!(
        "Daily series for '{}': {} days from {}",
        product,
        series.len(),
        series.start_date()
    );

    println!("\nDecomposition forecast (30 days)...");
    report(forecaster.forecast_decomposition(&series, 30))?;

    println!("\nLSTM forecast (window 30, 20 iterations, 10 steps)...");
    let config = SequenceConfig::new(30, 20, 10)?.with_hidden_size(32)?;
    report(forecaster.forecast_sequence_with(&series, &config))?;

    Ok(())
}

fn report(result: sales_forecast::Result<ForecastResult>) -> Result<(), Box<dyn std::error::Error>> {
    let result = match result {
        Ok(result) => result,
        Err(ForecastError::InsufficientData { needed, got }) => {
            println!("  Not enough history: {} days needed, {} available", needed, got);
            return Ok(());
        }
        Err(e) => {
            println!("  Forecast failed: {}", e);
            return Ok(());
        }
    };

    match result.mape() {
        Some(mape) => println!("  In-sample MAPE: {:.2}%", mape),
        None => println!("  In-sample MAPE: undefined"),
    }
    for flag in result.flags() {
        println!("  Warning: {}", flag);
    }

    for point in result.forecast().iter().take(5) {
        println!("  {}: {:.2}", point.date, point.forecast);
    }
    if result.horizons() > 5 {
        println!("  ... {} more days", result.horizons() - 5);
    }

    let path = env::temp_dir().join(result.strategy().export_file_name());
    result.to_table().write_csv(File::create(&path)?)?;
    println!("  Table written to {}", path.display());

    Ok(())
}

/// Two products over 120 days with a weekly cycle and a slow trend
fn create_sample_records() -> Vec<RawRecord> {
    let start = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default();
    let mut records = Vec::new();

    for day in 0..120u64 {
        let Some(date) = start.checked_add_days(Days::new(day)) else {
            break;
        };
        let weekly = (2.0 * std::f64::consts::PI * day as f64 / 7.0).sin();

        records.push(RawRecord::new("Staples", date, 40.0 + 0.2 * day as f64 + 8.0 * weekly));
        if day % 3 == 0 {
            records.push(RawRecord::new("Desk Lamp", date, 120.0 + 15.0 * weekly));
        }
    }

    records
}
