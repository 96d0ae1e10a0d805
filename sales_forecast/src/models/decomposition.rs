//! Additive decomposition forecaster
//!
//! Fits `y(t) = trend(t) + weekly(t) + yearly(t)` to a daily series:
//!
//! - the trend is piecewise linear, with rate changes allowed at evenly spaced
//!   changepoints over the first part of the history;
//! - each seasonal component is a truncated Fourier series.
//!
//! The model is linear in its coefficients, so the MAP estimate under Gaussian
//! priors is a penalized least squares problem. The noise level that sets the
//! penalty strength is re-estimated from the residuals of a first fit.
//!
//! Accuracy is measured in-sample: the fitted model is evaluated on the very
//! days it was fitted to, which overstates how well it forecasts unseen days.

use crate::chart::ForecastChart;
use crate::config::{DecompositionConfig, ForecastPolicy, SeasonalityMode};
use crate::error::{ForecastError, Result};
use crate::metrics::{evaluate_in_sample, history_flag};
use crate::models::{ForecastPoint, ForecastResult, QualityFlag, Strategy};
use crate::series::DailySeries;
use crate::utils::{all_finite, future_dates, round_to};
use forecast_math::fourier::fourier_terms;
use forecast_math::regression::{predict, ridge_fit};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

const WEEKLY_PERIOD: f64 = 7.0;
const YEARLY_PERIOD: f64 = 365.25;

/// Spans (in days) from which `Auto` seasonality is switched on
const WEEKLY_MIN_SPAN_DAYS: f64 = 14.0;
const YEARLY_MIN_SPAN_DAYS: f64 = 730.0;

/// Noise variance (scaled units) assumed for the first fit
const INITIAL_NOISE_VARIANCE: f64 = 0.25;
const MIN_NOISE_VARIANCE: f64 = 1e-4;

/// Trend and seasonal parts of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub trend: Vec<f64>,
    pub weekly: Vec<f64>,
    pub yearly: Vec<f64>,
}

/// Additive decomposition model
#[derive(Debug, Clone)]
pub struct DecompositionModel {
    config: DecompositionConfig,
}

/// Decomposition model fitted to one series
#[derive(Debug, Clone)]
pub struct FittedDecomposition {
    /// Intercept, base rate, rate changes, weekly terms, yearly terms
    coefficients: Vec<f64>,
    /// Changepoint locations in scaled time
    changepoints: Vec<f64>,
    weekly_order: Option<usize>,
    yearly_order: Option<usize>,
    /// Max absolute observed value, used to scale y
    y_scale: f64,
    /// Days between the first and last observation
    span_days: f64,
    /// In-sample residual standard deviation, original units
    residual_std: f64,
}

fn seasonality_order(
    mode: SeasonalityMode,
    span_days: f64,
    min_span_days: f64,
    order: usize,
) -> Option<usize> {
    match mode {
        SeasonalityMode::Enabled => Some(order),
        SeasonalityMode::Disabled => None,
        SeasonalityMode::Auto => (span_days >= min_span_days).then_some(order),
    }
}

impl DecompositionModel {
    /// Create a new decomposition model
    pub fn new(config: DecompositionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration
    pub fn config(&self) -> &DecompositionConfig {
        &self.config
    }

    /// Changepoint locations in scaled time for a history of `n` days
    fn changepoints(&self, n: usize, span_days: f64) -> Vec<f64> {
        let hist_size = (n as f64 * self.config.changepoint_range).floor() as usize;
        let count = self.config.n_changepoints.min(hist_size.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }

        let last = (hist_size - 1) as f64;
        (1..=count)
            .map(|j| (j as f64 * last / count as f64).round() / span_days)
            .collect()
    }

    /// Fit the model to a daily series
    pub fn fit(&self, series: &DailySeries) -> Result<FittedDecomposition> {
        let y = series.values();
        let n = y.len();
        if n < 2 {
            return Err(ForecastError::InsufficientData { needed: 2, got: n });
        }
        if !all_finite(y) {
            return Err(ForecastError::DataError(
                "Series contains non-finite sales values".to_string(),
            ));
        }

        let y_scale = y.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if y_scale == 0.0 {
            return Err(ForecastError::ForecastFailure(format!(
                "Sales for '{}' are zero on every day; there is nothing to fit",
                series.product()
            )));
        }

        let span_days = (n - 1) as f64;
        let mut model = FittedDecomposition {
            coefficients: Vec::new(),
            changepoints: self.changepoints(n, span_days),
            weekly_order: seasonality_order(
                self.config.weekly,
                span_days,
                WEEKLY_MIN_SPAN_DAYS,
                self.config.weekly_order,
            ),
            yearly_order: seasonality_order(
                self.config.yearly,
                span_days,
                YEARLY_MIN_SPAN_DAYS,
                self.config.yearly_order,
            ),
            y_scale,
            span_days,
            residual_std: 0.0,
        };

        let t_days: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let columns = model.design_matrix(&t_days)?;
        let prior_scales = model.prior_scales(&self.config);
        let y_scaled: Vec<f64> = y.iter().map(|v| v / y_scale).collect();

        let mut noise_variance = INITIAL_NOISE_VARIANCE;
        for pass in 1..=2 {
            let penalties: Vec<f64> = prior_scales
                .iter()
                .map(|s| noise_variance / (s * s))
                .collect();
            model.coefficients =
                ridge_fit(&columns, &y_scaled, &penalties).map_err(ForecastError::internal)?;

            let fitted =
                predict(&columns, &model.coefficients).map_err(ForecastError::internal)?;
            let rss: f64 = y_scaled
                .iter()
                .zip(fitted.iter())
                .map(|(a, f)| (a - f).powi(2))
                .sum();
            noise_variance = (rss / n as f64).max(MIN_NOISE_VARIANCE);
            debug!(
                "Decomposition pass {} for '{}': residual variance {:.6}",
                pass,
                series.product(),
                rss / n as f64
            );
        }

        let fitted = model.predict_days(&t_days)?;
        let rss: f64 = y
            .iter()
            .zip(fitted.iter())
            .map(|(a, f)| (a - f).powi(2))
            .sum();
        model.residual_std = (rss / n as f64).sqrt();

        debug!(
            "Fitted decomposition for '{}': {} changepoints, weekly {:?}, yearly {:?}",
            series.product(),
            model.changepoints.len(),
            model.weekly_order,
            model.yearly_order
        );

        Ok(model)
    }

    /// Fit the model and forecast `horizon_days` past the last observation
    ///
    /// The result holds a point for every observed day (the in-sample
    /// reconstruction) and for every future day, each with an uncertainty
    /// band. Values are rounded to the configured number of decimals.
    pub fn forecast(&self, series: &DailySeries, policy: &ForecastPolicy) -> Result<ForecastResult> {
        let n = series.len();
        if n < policy.decomposition_min_history {
            return Err(ForecastError::InsufficientData {
                needed: policy.decomposition_min_history,
                got: n,
            });
        }

        info!(
            "Decomposition forecast for '{}': {} days of history, horizon {} days",
            series.product(),
            n,
            self.config.horizon_days
        );

        let mut flags: Vec<QualityFlag> =
            history_flag(n, policy.decomposition_recommended_history)
                .into_iter()
                .collect();

        let model = self.fit(series)?;
        let horizon = self.config.horizon_days;

        let t_all: Vec<f64> = (0..n + horizon).map(|i| i as f64).collect();
        let yhat = model.predict_days(&t_all)?;
        if !all_finite(&yhat) {
            return Err(ForecastError::ForecastFailure(
                "Decomposition produced non-finite predictions".to_string(),
            ));
        }

        let half_width = interval_z(self.config.interval_width)? * model.residual_std;
        let last = series.end_date().ok_or_else(|| {
            ForecastError::DataError("Series has no last date".to_string())
        })?;
        let mut dates = series.dates();
        dates.extend(future_dates(last, horizon)?);

        let decimals = self.config.decimals;
        let mut fitted: Vec<ForecastPoint> = dates
            .iter()
            .zip(yhat.iter())
            .map(|(&date, &value)| {
                ForecastPoint::with_band(
                    date,
                    round_to(value, decimals),
                    round_to(value - half_width, decimals),
                    round_to(value + half_width, decimals),
                )
            })
            .collect();
        if !fitted.iter().all(ForecastPoint::is_finite) {
            return Err(ForecastError::ForecastFailure(format!(
                "Rounding to {} decimals produced non-finite values",
                decimals
            )));
        }
        let forecast = fitted.split_off(n);

        let (accuracy, metric_flags) = evaluate_in_sample(series.values(), &yhat[..n], policy)?;
        flags.extend(metric_flags);

        info!(
            "Decomposition forecast for '{}' done: in-sample MAPE {:?}",
            series.product(),
            accuracy.mape
        );

        let result = ForecastResult::new(
            Strategy::Decomposition,
            series.product(),
            fitted,
            forecast,
            accuracy,
            flags,
        );
        let chart = ForecastChart::new(Strategy::Decomposition, series, result.timeline());
        Ok(result.with_chart(chart))
    }
}

/// Two-sided standard normal quantile for a central interval
fn interval_z(width: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::ForecastFailure(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}

impl FittedDecomposition {
    /// Design matrix columns for days counted from the first observation
    fn design_matrix(&self, t_days: &[f64]) -> Result<Vec<Vec<f64>>> {
        let t: Vec<f64> = t_days.iter().map(|d| d / self.span_days).collect();

        let mut columns = Vec::with_capacity(self.prior_count());
        columns.push(vec![1.0; t.len()]);
        columns.push(t.clone());
        for &s in &self.changepoints {
            columns.push(t.iter().map(|&x| (x - s).max(0.0)).collect());
        }
        if let Some(order) = self.weekly_order {
            columns.extend(
                fourier_terms(t_days, WEEKLY_PERIOD, order).map_err(ForecastError::internal)?,
            );
        }
        if let Some(order) = self.yearly_order {
            columns.extend(
                fourier_terms(t_days, YEARLY_PERIOD, order).map_err(ForecastError::internal)?,
            );
        }

        Ok(columns)
    }

    fn trend_terms(&self) -> usize {
        2 + self.changepoints.len()
    }

    fn weekly_terms(&self) -> usize {
        self.weekly_order.map_or(0, |o| 2 * o)
    }

    fn prior_count(&self) -> usize {
        self.trend_terms() + self.weekly_terms() + self.yearly_order.map_or(0, |o| 2 * o)
    }

    fn prior_scales(&self, config: &DecompositionConfig) -> Vec<f64> {
        let mut scales = vec![config.trend_prior_scale; 2];
        scales.extend(std::iter::repeat(config.changepoint_prior_scale).take(self.changepoints.len()));
        scales.extend(
            std::iter::repeat(config.seasonality_prior_scale)
                .take(self.prior_count() - self.trend_terms()),
        );
        scales
    }

    /// Predict sales for days counted from the first observation
    ///
    /// Day `0` is the first observed date; values past the last observed day
    /// extrapolate the final trend rate and the seasonal pattern.
    pub fn predict_days(&self, t_days: &[f64]) -> Result<Vec<f64>> {
        let columns = self.design_matrix(t_days)?;
        let scaled = predict(&columns, &self.coefficients).map_err(ForecastError::internal)?;
        Ok(scaled.into_iter().map(|v| v * self.y_scale).collect())
    }

    /// Split a prediction into trend, weekly and yearly parts
    pub fn components(&self, t_days: &[f64]) -> Result<Components> {
        let columns = self.design_matrix(t_days)?;
        let trend_end = self.trend_terms();
        let weekly_end = trend_end + self.weekly_terms();

        let part = |range: std::ops::Range<usize>| -> Result<Vec<f64>> {
            if range.is_empty() {
                return Ok(vec![0.0; t_days.len()]);
            }
            let values = predict(&columns[range.clone()], &self.coefficients[range])
                .map_err(ForecastError::internal)?;
            Ok(values.into_iter().map(|v| v * self.y_scale).collect())
        };

        Ok(Components {
            trend: part(0..trend_end)?,
            weekly: part(trend_end..weekly_end)?,
            yearly: part(weekly_end..columns.len())?,
        })
    }

    /// Changepoint locations as days from the first observation
    pub fn changepoint_days(&self) -> Vec<f64> {
        self.changepoints.iter().map(|s| s * self.span_days).collect()
    }

    /// Whether a weekly component was fitted
    pub fn has_weekly(&self) -> bool {
        self.weekly_order.is_some()
    }

    /// Whether a yearly component was fitted
    pub fn has_yearly(&self) -> bool {
        self.yearly_order.is_some()
    }

    /// In-sample residual standard deviation
    pub fn residual_std(&self) -> f64 {
        self.residual_std
    }
}
