//! Policy constants and per-strategy knobs
//!
//! Every threshold the pipeline checks lives here so callers can adjust it.
//! All structs deserialize with defaults, so a host may load a partial JSON
//! document and keep the remaining defaults.

use crate::error::{ForecastError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Training iteration counts the user interface offers
pub const RECOMMENDED_ITERATIONS: RangeInclusive<usize> = 5..=100;

/// Forecast horizons (days) the user interface offers
pub const RECOMMENDED_HORIZON_DAYS: RangeInclusive<usize> = 7..=180;

/// Most decimal places a rounded forecast can carry
pub const MAX_DECIMALS: u32 = 15;

/// Minimum-data thresholds and metric reliability cutoffs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastPolicy {
    /// Hard minimum number of days for the decomposition model
    pub decomposition_min_history: usize,
    /// Below this many days decomposition results are flagged
    pub decomposition_recommended_history: usize,
    /// Hard minimum number of days for the sequence model
    pub sequence_min_history: usize,
    /// MAPE (percent) above which the metric is flagged as unreliable
    pub mape_unreliable_above: f64,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            decomposition_min_history: 2,
            decomposition_recommended_history: 20,
            sequence_min_history: 60,
            mape_unreliable_above: 1e5,
        }
    }
}

impl ForecastPolicy {
    /// Check the thresholds are consistent with each other
    pub fn validate(&self) -> Result<()> {
        if self.decomposition_min_history < 2 {
            return Err(ForecastError::InvalidParameter(
                "Decomposition needs a minimum history of at least 2 days".to_string(),
            ));
        }
        if self.decomposition_recommended_history < self.decomposition_min_history {
            return Err(ForecastError::InvalidParameter(format!(
                "Recommended history ({}) is below the hard minimum ({})",
                self.decomposition_recommended_history, self.decomposition_min_history
            )));
        }
        if self.sequence_min_history < 2 {
            return Err(ForecastError::InvalidParameter(
                "Sequence model needs a minimum history of at least 2 days".to_string(),
            ));
        }
        if !(self.mape_unreliable_above > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "MAPE reliability cutoff must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a policy from JSON, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }
}

/// Whether a seasonal component is fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalityMode {
    /// Fit the component when the history spans enough days
    Auto,
    /// Always fit the component
    Enabled,
    /// Never fit the component
    Disabled,
}

/// Knobs for the additive decomposition forecaster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Days to forecast past the last observation
    pub horizon_days: usize,
    /// Maximum number of potential trend changepoints
    pub n_changepoints: usize,
    /// Share of the history in which changepoints may be placed
    pub changepoint_range: f64,
    /// Prior scale of the trend rate changes
    pub changepoint_prior_scale: f64,
    /// Prior scale of the Fourier coefficients
    pub seasonality_prior_scale: f64,
    /// Prior scale of the base growth rate and offset
    pub trend_prior_scale: f64,
    /// Weekly seasonality
    pub weekly: SeasonalityMode,
    /// Yearly seasonality
    pub yearly: SeasonalityMode,
    /// Fourier order of the weekly component
    pub weekly_order: usize,
    /// Fourier order of the yearly component
    pub yearly_order: usize,
    /// Coverage of the uncertainty band, in (0, 1)
    pub interval_width: f64,
    /// Decimal places of the reported forecast
    pub decimals: u32,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            trend_prior_scale: 5.0,
            weekly: SeasonalityMode::Auto,
            yearly: SeasonalityMode::Auto,
            weekly_order: 3,
            yearly_order: 10,
            interval_width: 0.8,
            decimals: 2,
        }
    }
}

impl DecompositionConfig {
    /// Create a configuration for the given horizon
    pub fn new(horizon_days: usize) -> Result<Self> {
        let config = Self {
            horizon_days,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the changepoint prior scale
    pub fn with_changepoint_prior_scale(mut self, scale: f64) -> Result<Self> {
        self.changepoint_prior_scale = scale;
        self.validate()?;
        Ok(self)
    }

    /// Set the maximum number of changepoints
    pub fn with_changepoints(mut self, n_changepoints: usize) -> Self {
        self.n_changepoints = n_changepoints;
        self
    }

    /// Set the weekly seasonality mode
    pub fn with_weekly(mut self, mode: SeasonalityMode) -> Self {
        self.weekly = mode;
        self
    }

    /// Set the yearly seasonality mode
    pub fn with_yearly(mut self, mode: SeasonalityMode) -> Self {
        self.yearly = mode;
        self
    }

    /// Set the coverage of the uncertainty band
    pub fn with_interval_width(mut self, width: f64) -> Result<Self> {
        self.interval_width = width;
        self.validate()?;
        Ok(self)
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1 day".to_string(),
            ));
        }
        if !RECOMMENDED_HORIZON_DAYS.contains(&self.horizon_days) {
            warn!(
                "Forecast horizon of {} days is outside the recommended range {:?}",
                self.horizon_days, RECOMMENDED_HORIZON_DAYS
            );
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Changepoint range must be in (0, 1]".to_string(),
            ));
        }
        for (name, scale) in [
            ("changepoint", self.changepoint_prior_scale),
            ("seasonality", self.seasonality_prior_scale),
            ("trend", self.trend_prior_scale),
        ] {
            if !(scale > 0.0 && scale.is_finite()) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} prior scale must be positive and finite",
                    name
                )));
            }
        }
        if self.weekly_order == 0 || self.yearly_order == 0 {
            return Err(ForecastError::InvalidParameter(
                "Fourier orders must be at least 1".to_string(),
            ));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Interval width must be between 0 and 1".to_string(),
            ));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ForecastError::InvalidParameter(format!(
                "Decimals must be at most {}, got {}",
                MAX_DECIMALS, self.decimals
            )));
        }
        Ok(())
    }
}

/// Activation applied to the LSTM cell candidate and cell output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellActivation {
    Relu,
    Tanh,
}

/// Knobs for the LSTM sequence forecaster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Number of past days fed to the network
    pub window_size: usize,
    /// Training epochs over all windows
    pub iterations: usize,
    /// Days predicted past the last observation
    pub future_steps: usize,
    /// LSTM hidden units
    pub hidden_size: usize,
    /// Adam step size
    pub learning_rate: f64,
    /// Windows per optimizer step
    pub batch_size: usize,
    /// Seed for weight initialization and shuffling
    pub seed: u64,
    /// Clip the global gradient norm to this value
    pub gradient_clip: Option<f64>,
    /// Cell activation
    pub activation: CellActivation,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            window_size: 30,
            iterations: 20,
            future_steps: 10,
            hidden_size: 64,
            learning_rate: 0.001,
            batch_size: 32,
            seed: 42,
            gradient_clip: None,
            activation: CellActivation::Relu,
        }
    }
}

impl SequenceConfig {
    /// Create a configuration from the three user-facing knobs
    pub fn new(window_size: usize, iterations: usize, future_steps: usize) -> Result<Self> {
        let config = Self {
            window_size,
            iterations,
            future_steps,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of hidden units
    pub fn with_hidden_size(mut self, hidden_size: usize) -> Result<Self> {
        self.hidden_size = hidden_size;
        self.validate()?;
        Ok(self)
    }

    /// Set the learning rate
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Result<Self> {
        self.learning_rate = learning_rate;
        self.validate()?;
        Ok(self)
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        self.batch_size = batch_size;
        self.validate()?;
        Ok(self)
    }

    /// Enable gradient norm clipping
    pub fn with_gradient_clip(mut self, clip: f64) -> Result<Self> {
        self.gradient_clip = Some(clip);
        self.validate()?;
        Ok(self)
    }

    /// Set the cell activation
    pub fn with_activation(mut self, activation: CellActivation) -> Self {
        self.activation = activation;
        self
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(ForecastError::InvalidParameter(
                "Training needs at least one iteration".to_string(),
            ));
        }
        if !RECOMMENDED_ITERATIONS.contains(&self.iterations) {
            warn!(
                "{} training iterations is outside the recommended range {:?}",
                self.iterations, RECOMMENDED_ITERATIONS
            );
        }
        if self.future_steps == 0 {
            return Err(ForecastError::InvalidParameter(
                "Future steps must be positive".to_string(),
            ));
        }
        if self.hidden_size == 0 || self.batch_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "Hidden size and batch size must be positive".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Learning rate must be positive and finite".to_string(),
            ));
        }
        if let Some(clip) = self.gradient_clip {
            if !(clip > 0.0) {
                return Err(ForecastError::InvalidParameter(
                    "Gradient clip must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}
