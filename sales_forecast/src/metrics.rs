//! Accuracy evaluation for forecasts
//!
//! Wraps [`forecast_math::mape`] and turns its degenerate cases into quality
//! flags instead of hiding them.

use crate::config::ForecastPolicy;
use crate::error::{ForecastError, Result};
use crate::models::{AccuracyMetric, AccuracyScope, QualityFlag};
use forecast_math::accuracy::{mean_absolute_error, root_mean_squared_error};
use log::{debug, warn};

/// Evaluate predictions on the observations the model was fitted to
///
/// Zero actuals are skipped (see [`forecast_math::accuracy`]) and reported
/// through [`QualityFlag::ZeroActualsSkipped`]. A MAPE above the policy
/// cutoff is kept as computed and flagged with [`QualityFlag::MapeUnreliable`].
/// Mismatched or empty inputs are a [`ForecastError::ForecastFailure`].
pub fn evaluate_in_sample(
    actual: &[f64],
    predicted: &[f64],
    policy: &ForecastPolicy,
) -> Result<(AccuracyMetric, Vec<QualityFlag>)> {
    let report = forecast_math::mape(actual, predicted).map_err(ForecastError::internal)?;
    debug!(
        "In-sample fit: MAPE {:?} over {} days, MAE {:.4}, RMSE {:.4}",
        report.value,
        report.evaluated,
        mean_absolute_error(actual, predicted).map_err(ForecastError::internal)?,
        root_mean_squared_error(actual, predicted).map_err(ForecastError::internal)?
    );
    let mut flags = Vec::new();

    match report.value {
        None => flags.push(QualityFlag::MetricUndefined),
        Some(mape) if !mape.is_finite() || mape > policy.mape_unreliable_above => {
            flags.push(QualityFlag::MapeUnreliable {
                mape,
                threshold: policy.mape_unreliable_above,
            });
        }
        Some(_) => {}
    }

    if report.skipped > 0 && report.value.is_some() {
        flags.push(QualityFlag::ZeroActualsSkipped {
            skipped: report.skipped,
            evaluated: report.evaluated,
        });
    }

    for flag in &flags {
        warn!("Accuracy metric flagged: {}", flag);
    }

    Ok((
        AccuracyMetric {
            mape: report.value,
            evaluated: report.evaluated,
            skipped: report.skipped,
            scope: AccuracyScope::InSample,
        },
        flags,
    ))
}

/// Flag a history shorter than the recommended length
pub fn history_flag(observed: usize, recommended: usize) -> Option<QualityFlag> {
    if observed < recommended {
        warn!(
            "History of {} days is below the recommended {} days",
            observed, recommended
        );
        Some(QualityFlag::BelowRecommendedHistory {
            observed,
            recommended,
        })
    } else {
        None
    }
}
