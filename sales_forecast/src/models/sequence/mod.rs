//! Windowed sequence forecaster
//!
//! The series is min-max scaled, cut into sliding windows of `window_size`
//! values each paired with the value that follows, and an LSTM is trained to
//! predict that next value. Future values are produced by an autoregressive
//! rollout: each prediction is appended to the window and the oldest value is
//! dropped, so every step after the first reads earlier predictions.
//!
//! Accuracy is measured in-sample on the training windows.

pub mod lstm;
pub mod optimizer;

use crate::chart::ForecastChart;
use crate::config::{ForecastPolicy, SequenceConfig};
use crate::error::{ForecastError, Result};
use crate::metrics::evaluate_in_sample;
use crate::models::{AccuracyMetric, ForecastPoint, ForecastResult, QualityFlag, Strategy};
use crate::series::DailySeries;
use crate::utils::{all_finite, future_dates};
use forecast_math::MinMaxScaler;
use log::{debug, info};
use std::collections::VecDeque;

pub use lstm::LstmRegressor;

/// Series values mapped into `[0, 1]` together with their scaler
#[derive(Debug, Clone)]
pub struct NormalizedSeries {
    values: Vec<f64>,
    scaler: MinMaxScaler,
}

impl NormalizedSeries {
    /// Fit a scaler on `values` and transform them
    pub fn fit(values: &[f64]) -> Result<Self> {
        let (values, scaler) = MinMaxScaler::fit_transform(values)?;
        Ok(Self { values, scaler })
    }

    /// Normalized values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Fitted scaler
    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    /// Map normalized values back to sales units
    pub fn inverse(&self, values: &[f64]) -> Vec<f64> {
        self.scaler.inverse(values)
    }
}

/// Input slice and the value that follows it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a> {
    pub input: &'a [f64],
    pub target: f64,
}

/// One window per offset; `values.len() - window_size` windows in total
pub fn build_windows(values: &[f64], window_size: usize) -> Vec<Window<'_>> {
    if window_size == 0 || values.len() <= window_size {
        return Vec::new();
    }

    (0..values.len() - window_size)
        .map(|start| Window {
            input: &values[start..start + window_size],
            target: values[start + window_size],
        })
        .collect()
}

/// Maps a window of normalized values to the next normalized value
pub trait SequenceRegressor {
    fn predict_next(&self, window: &[f64]) -> f64;
}

/// Predict `steps` values, feeding each prediction back into the window
///
/// The window starts as `seed` and keeps its length: every step pushes the
/// new prediction and drops the oldest value.
pub fn autoregressive_rollout<R: SequenceRegressor + ?Sized>(
    model: &R,
    seed: &[f64],
    steps: usize,
) -> Vec<f64> {
    let mut window: VecDeque<f64> = seed.iter().copied().collect();
    let mut predictions = Vec::with_capacity(steps);

    for _ in 0..steps {
        let next = model.predict_next(window.make_contiguous());
        predictions.push(next);
        window.pop_front();
        window.push_back(next);
    }

    predictions
}

/// Score one-step predictions on the training windows, in sales units
pub fn in_sample_accuracy<R: SequenceRegressor + ?Sized>(
    model: &R,
    windows: &[Window<'_>],
    normalized: &NormalizedSeries,
    policy: &ForecastPolicy,
) -> Result<(AccuracyMetric, Vec<QualityFlag>)> {
    let fitted: Vec<f64> = windows.iter().map(|w| model.predict_next(w.input)).collect();
    // A constant series inverts every value to the constant, NaN included
    if !all_finite(&fitted) {
        return Err(ForecastError::ForecastFailure(
            "Sequence model produced non-finite in-sample predictions".to_string(),
        ));
    }
    let targets: Vec<f64> = windows.iter().map(|w| w.target).collect();

    evaluate_in_sample(
        &normalized.inverse(&targets),
        &normalized.inverse(&fitted),
        policy,
    )
}

/// LSTM forecaster
#[derive(Debug, Clone)]
pub struct SequenceForecaster {
    config: SequenceConfig,
}

impl SequenceForecaster {
    /// Create a new sequence forecaster
    pub fn new(config: SequenceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration
    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Days of history needed under `policy`
    pub fn min_history(&self, policy: &ForecastPolicy) -> usize {
        policy.sequence_min_history.max(self.config.window_size + 1)
    }

    /// Train on the series and forecast `future_steps` days past its end
    ///
    /// The result has no fitted points; its accuracy comes from the training
    /// windows. Predictions are not rounded.
    pub fn forecast(&self, series: &DailySeries, policy: &ForecastPolicy) -> Result<ForecastResult> {
        let n = series.len();
        let needed = self.min_history(policy);
        if n < needed {
            return Err(ForecastError::InsufficientData { needed, got: n });
        }
        if !all_finite(series.values()) {
            return Err(ForecastError::DataError(
                "Series contains non-finite sales values".to_string(),
            ));
        }

        let config = &self.config;
        info!(
            "Sequence forecast for '{}': {} days, window {}, {} iterations, {} steps",
            series.product(),
            n,
            config.window_size,
            config.iterations,
            config.future_steps
        );

        let normalized = NormalizedSeries::fit(series.values())?;
        if normalized.scaler().is_degenerate() {
            debug!("Series for '{}' is constant", series.product());
        }

        let windows = build_windows(normalized.values(), config.window_size);
        let mut model = LstmRegressor::new(config);
        model.train(&windows, config)?;

        let (accuracy, flags) = in_sample_accuracy(&model, &windows, &normalized, policy)?;

        let seed = &normalized.values()[n - config.window_size..];
        let rollout = autoregressive_rollout(&model, seed, config.future_steps);
        let predicted = normalized.inverse(&rollout);
        if !all_finite(&rollout) || !all_finite(&predicted) {
            return Err(ForecastError::ForecastFailure(
                "Sequence model produced non-finite predictions".to_string(),
            ));
        }

        let last = series.end_date().ok_or_else(|| {
            ForecastError::DataError("Series has no last date".to_string())
        })?;
        let forecast: Vec<ForecastPoint> = future_dates(last, config.future_steps)?
            .into_iter()
            .zip(predicted)
            .map(|(date, value)| ForecastPoint::new(date, value))
            .collect();

        info!(
            "Sequence forecast for '{}' done: in-sample MAPE {:?}",
            series.product(),
            accuracy.mape
        );

        let result = ForecastResult::new(
            Strategy::Sequence,
            series.product(),
            Vec::new(),
            forecast,
            accuracy,
            flags,
        );
        let chart = ForecastChart::new(Strategy::Sequence, series, result.forecast());
        Ok(result.with_chart(chart))
    }
}
