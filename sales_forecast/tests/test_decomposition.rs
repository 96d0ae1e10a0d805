use approx::assert_abs_diff_eq;
use chrono::{Days, NaiveDate};
use sales_forecast::config::{DecompositionConfig, ForecastPolicy, SeasonalityMode, MAX_DECIMALS};
use sales_forecast::models::decomposition::DecompositionModel;
use sales_forecast::models::{AccuracyScope, QualityFlag, Strategy};
use sales_forecast::{DailySeries, ForecastError, SalesForecaster};
use std::f64::consts::PI;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()
}

fn series_from(values: Vec<f64>) -> DailySeries {
    DailySeries::new("Binder", start(), values)
}

#[test]
fn test_constant_series_forecasts_constant() {
    let series = series_from(vec![100.0; 90]);
    let result = SalesForecaster::default()
        .forecast_decomposition(&series, 30)
        .unwrap();

    assert_eq!(result.strategy(), Strategy::Decomposition);
    assert_eq!(result.horizons(), 30);
    for value in result.values() {
        assert_abs_diff_eq!(value, 100.0, epsilon = 1.0);
    }

    let mape = result.mape().unwrap();
    assert!(mape < 0.1, "MAPE {} should be close to zero", mape);
    assert_eq!(result.accuracy().scope, AccuracyScope::InSample);
    assert!(result.is_reliable());
}

#[test]
fn test_future_dates_follow_last_observation() {
    let series = series_from(vec![100.0; 90]);
    let result = SalesForecaster::default()
        .forecast_decomposition(&series, 30)
        .unwrap();

    let last = series.end_date().unwrap();
    for (k, point) in result.forecast().iter().enumerate() {
        assert_eq!(point.date, last + Days::new(k as u64 + 1));
    }
}

#[test]
fn test_single_point_is_insufficient() {
    let series = series_from(vec![42.0]);
    let result = SalesForecaster::default().forecast_decomposition(&series, 30);

    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData { needed: 2, got: 1 })
    ));
}

#[test]
fn test_two_points_proceed_with_flag() {
    let series = series_from(vec![10.0, 20.0]);
    let result = SalesForecaster::default()
        .forecast_decomposition(&series, 7)
        .unwrap();

    assert_eq!(result.horizons(), 7);
    assert!(result.flags().contains(&QualityFlag::BelowRecommendedHistory {
        observed: 2,
        recommended: 20,
    }));
    assert!(!result.is_reliable());
}

#[test]
fn test_recommended_history_is_adjustable() {
    let policy = ForecastPolicy {
        decomposition_recommended_history: 5,
        ..ForecastPolicy::default()
    };
    let forecaster = SalesForecaster::new(policy).unwrap();
    let series = series_from((0..10).map(|i| 50.0 + i as f64).collect());

    let result = forecaster.forecast_decomposition(&series, 7).unwrap();

    assert!(!result
        .flags()
        .iter()
        .any(|f| matches!(f, QualityFlag::BelowRecommendedHistory { .. })));
}

#[test]
fn test_all_zero_series_fails() {
    let series = series_from(vec![0.0; 40]);
    let result = SalesForecaster::default().forecast_decomposition(&series, 30);

    assert!(matches!(result, Err(ForecastError::ForecastFailure(_))));
}

#[test]
fn test_linear_trend_is_extrapolated() {
    let series = series_from((0..60).map(|i| 10.0 + 2.0 * i as f64).collect());
    let result = SalesForecaster::default()
        .forecast_decomposition(&series, 10)
        .unwrap();

    for (k, value) in result.values().into_iter().enumerate() {
        let expected = 10.0 + 2.0 * (60 + k) as f64;
        assert!(
            (value - expected).abs() / expected < 0.02,
            "day {}: {} vs {}",
            k,
            value,
            expected
        );
    }
}

#[test]
fn test_weekly_pattern_is_captured() {
    let weekly = |i: usize| 100.0 + 10.0 * (2.0 * PI * i as f64 / 7.0).sin();
    let series = series_from((0..56).map(weekly).collect());

    let config = DecompositionConfig::new(14).unwrap();
    let model = DecompositionModel::new(config).unwrap();
    let fitted = model.fit(&series).unwrap();
    assert!(fitted.has_weekly());
    assert!(!fitted.has_yearly());

    let result = model.forecast(&series, &ForecastPolicy::default()).unwrap();
    for (k, value) in result.values().into_iter().enumerate() {
        assert_abs_diff_eq!(value, weekly(56 + k), epsilon = 2.0);
    }

    let t: Vec<f64> = (0..7).map(|i| i as f64).collect();
    let components = fitted.components(&t).unwrap();
    let amplitude = components
        .weekly
        .iter()
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    assert!(amplitude > 8.0 && amplitude < 12.0);
}

#[test]
fn test_seasonality_can_be_disabled() {
    let series = series_from((0..60).map(|i| 20.0 + (i % 7) as f64).collect());
    let config = DecompositionConfig::new(7)
        .unwrap()
        .with_weekly(SeasonalityMode::Disabled)
        .with_yearly(SeasonalityMode::Enabled);

    let fitted = DecompositionModel::new(config).unwrap().fit(&series).unwrap();

    assert!(!fitted.has_weekly());
    assert!(fitted.has_yearly());
}

#[test]
fn test_changepoints_stay_in_history_range() {
    let series = series_from((0..100).map(|i| (i as f64).sqrt() + 5.0).collect());
    let config = DecompositionConfig::new(30).unwrap();
    let fitted = DecompositionModel::new(config).unwrap().fit(&series).unwrap();

    let changepoints = fitted.changepoint_days();
    assert_eq!(changepoints.len(), 25);
    assert!(changepoints.iter().all(|&d| d > 0.0 && d < 79.0 + 1e-9));
    assert!(changepoints.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_full_timeline_and_band() {
    let series = series_from((0..45).map(|i| 30.0 + (i % 5) as f64).collect());
    let result = SalesForecaster::default()
        .forecast_decomposition(&series, 15)
        .unwrap();

    assert_eq!(result.fitted().len(), 45);
    assert_eq!(result.forecast().len(), 15);
    assert_eq!(result.timeline().count(), 60);
    assert_eq!(result.fitted()[0].date, start());

    for point in result.timeline() {
        let (lower, upper) = (point.lower.unwrap(), point.upper.unwrap());
        assert!(lower <= point.forecast && point.forecast <= upper);
    }

    assert_eq!(result.to_table().len(), 15);
    assert_eq!(result.to_full_table().len(), 60);
}

#[test]
fn test_values_are_rounded() {
    let series = series_from((0..30).map(|i| 10.0 + (i as f64) / 3.0).collect());
    let result = SalesForecaster::default()
        .forecast_decomposition(&series, 7)
        .unwrap();

    for value in result.values() {
        assert_abs_diff_eq!(value, (value * 100.0).round() / 100.0, epsilon = 1e-9);
    }
}

#[test]
fn test_chart_overlays_observed_and_forecast() {
    let series = series_from(vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    let result = SalesForecaster::default()
        .forecast_decomposition(&series, 7)
        .unwrap();

    let chart = result.chart().unwrap();
    assert_eq!(chart.title, "Binder - Sales Forecast (Decomposition)");
    assert_eq!(chart.observed.len(), 6);
    assert_eq!(chart.forecast.len(), 13);
    assert_eq!(chart.band.len(), 13);
}

#[test]
fn test_invalid_horizon_rejected() {
    let series = series_from(vec![1.0; 30]);
    let result = SalesForecaster::default().forecast_decomposition(&series, 0);

    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_decimals_beyond_limit_rejected() {
    let config = DecompositionConfig {
        decimals: 400,
        ..DecompositionConfig::new(7).unwrap()
    };
    assert!(matches!(
        config.validate(),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(DecompositionModel::new(config.clone()).is_err());

    let series = series_from(vec![100.0; 40]);
    let result = SalesForecaster::default().forecast_decomposition_with(&series, &config);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));

    let config = DecompositionConfig {
        decimals: MAX_DECIMALS,
        ..DecompositionConfig::new(7).unwrap()
    };
    let result = SalesForecaster::default()
        .forecast_decomposition_with(&series, &config)
        .unwrap();
    assert!(result.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_values_too_large_to_round_fail() {
    let config = DecompositionConfig {
        decimals: MAX_DECIMALS,
        ..DecompositionConfig::new(7).unwrap()
    };
    let series = series_from(vec![1e300; 40]);

    let result = SalesForecaster::default().forecast_decomposition_with(&series, &config);

    assert!(matches!(result, Err(ForecastError::ForecastFailure(_))));
}
