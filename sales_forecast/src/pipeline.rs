//! Public entry points of the forecasting core
//!
//! [`SalesForecaster`] owns the policy thresholds and runs each strategy
//! behind a panic boundary: an unexpected panic inside a model comes back as
//! [`ForecastError::ForecastFailure`] instead of unwinding into the host.

use crate::config::{DecompositionConfig, ForecastPolicy, SequenceConfig};
use crate::data::{self, RawRecord};
use crate::error::{ForecastError, Result};
use crate::models::decomposition::DecompositionModel;
use crate::models::sequence::SequenceForecaster;
use crate::models::ForecastResult;
use crate::series::{self, DailySeries, DateRange};
use log::{error, info};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f`, turning a panic into a [`ForecastError::ForecastFailure`]
pub fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let msg = panic_message(payload);
            error!("Forecast panicked: {}", msg);
            Err(ForecastError::ForecastFailure(format!(
                "internal error: {}",
                msg
            )))
        }
    }
}

/// Forecasting core configured with a [`ForecastPolicy`]
#[derive(Debug, Clone, Default)]
pub struct SalesForecaster {
    policy: ForecastPolicy,
}

impl SalesForecaster {
    /// Create a forecaster with custom thresholds
    pub fn new(policy: ForecastPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Get the policy
    pub fn policy(&self) -> &ForecastPolicy {
        &self.policy
    }

    /// Distinct products in first-seen order
    pub fn products(&self, records: &[RawRecord]) -> Vec<String> {
        data::products(records)
    }

    /// Aggregate one product's records into a gap-free daily series
    pub fn build_series(
        &self,
        records: &[RawRecord],
        product: &str,
        range: Option<DateRange>,
    ) -> Result<DailySeries> {
        guarded(|| series::build_series(records, product, range))
    }

    /// Forecast with the decomposition model and default knobs
    pub fn forecast_decomposition(
        &self,
        series: &DailySeries,
        horizon_days: usize,
    ) -> Result<ForecastResult> {
        let config = DecompositionConfig::new(horizon_days)?;
        self.forecast_decomposition_with(series, &config)
    }

    /// Forecast with the decomposition model and explicit knobs
    pub fn forecast_decomposition_with(
        &self,
        series: &DailySeries,
        config: &DecompositionConfig,
    ) -> Result<ForecastResult> {
        info!("Decomposition requested for '{}'", series.product());
        guarded(|| DecompositionModel::new(config.clone())?.forecast(series, &self.policy))
    }

    /// Forecast with the sequence model and default knobs
    pub fn forecast_sequence(
        &self,
        series: &DailySeries,
        window_size: usize,
        iterations: usize,
        future_steps: usize,
    ) -> Result<ForecastResult> {
        let config = SequenceConfig::new(window_size, iterations, future_steps)?;
        self.forecast_sequence_with(series, &config)
    }

    /// Forecast with the sequence model and explicit knobs
    pub fn forecast_sequence_with(
        &self,
        series: &DailySeries,
        config: &SequenceConfig,
    ) -> Result<ForecastResult> {
        info!("Sequence forecast requested for '{}'", series.product());
        guarded(|| SequenceForecaster::new(config.clone())?.forecast(series, &self.policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_converts_panic() {
        let result: Result<()> = guarded(|| panic!("boom"));
        match result {
            Err(ForecastError::ForecastFailure(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected ForecastFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_guarded_passes_errors_through() {
        let result: Result<()> = guarded(|| Err(ForecastError::InsufficientData { needed: 2, got: 1 }));
        assert!(result.unwrap_err().is_insufficient_data());
    }

    #[test]
    fn test_rejects_invalid_policy() {
        let policy = ForecastPolicy {
            decomposition_min_history: 1,
            ..ForecastPolicy::default()
        };
        assert!(matches!(
            SalesForecaster::new(policy),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
