//! Single-layer LSTM regressor for univariate windows
//!
//! The network reads a window one value at a time and maps the final hidden
//! state to the next value through a linear head. Gates are stacked in the
//! order input, forget, candidate, output along the first axis of the weights.

use super::optimizer::{Adam, Moments};
use super::{SequenceRegressor, Window};
use crate::config::{CellActivation, SequenceConfig};
use crate::error::{ForecastError, Result};
use log::debug;
use ndarray::linalg::general_mat_mul;
use ndarray::{s, Array1, Array2, Axis, Ix1, Ix2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::Uniform;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl CellActivation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            CellActivation::Relu => x.max(0.0),
            CellActivation::Tanh => x.tanh(),
        }
    }

    fn derivative(&self, x: f64) -> f64 {
        match self {
            CellActivation::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            CellActivation::Tanh => 1.0 - x.tanh().powi(2),
        }
    }
}

/// Trainable weights, also used as the gradient accumulator
#[derive(Debug, Clone)]
struct Params {
    /// Input weights [4H]
    w_x: Array1<f64>,
    /// Recurrent weights [4H, H]
    w_h: Array2<f64>,
    /// Gate biases [4H]
    b: Array1<f64>,
    /// Output head [H]
    v: Array1<f64>,
    /// Output bias
    d: Array1<f64>,
}

impl Params {
    fn zeros(hidden: usize) -> Self {
        Self {
            w_x: Array1::zeros(4 * hidden),
            w_h: Array2::zeros((4 * hidden, hidden)),
            b: Array1::zeros(4 * hidden),
            v: Array1::zeros(hidden),
            d: Array1::zeros(1),
        }
    }

    /// Glorot-uniform weights, zero biases except a forget bias of one
    fn glorot(hidden: usize, rng: &mut StdRng) -> Self {
        let uniform = |fan_in: usize, fan_out: usize| {
            let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
            let dist = Uniform::new(-limit, limit);
            move |rng: &mut StdRng| rng.sample(dist)
        };

        let input = uniform(1, 4 * hidden);
        let recurrent = uniform(hidden, 4 * hidden);
        let head = uniform(hidden, 1);

        let mut b = Array1::<f64>::zeros(4 * hidden);
        b.slice_mut(s![hidden..2 * hidden]).fill(1.0);

        Self {
            w_x: Array1::from_shape_fn(4 * hidden, |_| input(&mut *rng)),
            w_h: Array2::from_shape_fn((4 * hidden, hidden), |_| recurrent(&mut *rng)),
            b,
            v: Array1::from_shape_fn(hidden, |_| head(&mut *rng)),
            d: Array1::zeros(1),
        }
    }

    fn sum_of_squares(&self) -> f64 {
        [&self.w_x, &self.b, &self.v, &self.d]
            .iter()
            .map(|a| a.iter().map(|g| g * g).sum::<f64>())
            .sum::<f64>()
            + self.w_h.iter().map(|g| g * g).sum::<f64>()
    }

    fn scale(&mut self, factor: f64) {
        self.w_x *= factor;
        self.w_h *= factor;
        self.b *= factor;
        self.v *= factor;
        self.d *= factor;
    }
}

/// Adam state for every tensor in [`Params`]
#[derive(Debug, Clone)]
struct ParamMoments {
    w_x: Moments<Ix1>,
    w_h: Moments<Ix2>,
    b: Moments<Ix1>,
    v: Moments<Ix1>,
    d: Moments<Ix1>,
}

impl ParamMoments {
    fn zeros_like(params: &Params) -> Self {
        Self {
            w_x: Moments::zeros_like(&params.w_x),
            w_h: Moments::zeros_like(&params.w_h),
            b: Moments::zeros_like(&params.b),
            v: Moments::zeros_like(&params.v),
            d: Moments::zeros_like(&params.d),
        }
    }
}

/// Values kept from one forward step for backpropagation
struct StepCache {
    x: f64,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    /// Activated gates i, f, g, o stacked [4H]
    gates: Array1<f64>,
    /// Candidate pre-activation [H]
    g_pre: Array1<f64>,
    c: Array1<f64>,
}

/// LSTM with a linear output head
#[derive(Debug, Clone)]
pub struct LstmRegressor {
    hidden_size: usize,
    activation: CellActivation,
    params: Params,
    rng: StdRng,
    /// Mean squared error after each training epoch
    pub loss_history: Vec<f64>,
}

impl LstmRegressor {
    /// Create an untrained network with seeded weights
    pub fn new(config: &SequenceConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let params = Params::glorot(config.hidden_size, &mut rng);
        Self {
            hidden_size: config.hidden_size,
            activation: config.activation,
            params,
            rng,
            loss_history: Vec::new(),
        }
    }

    /// Hidden units
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn step(&self, x: f64, h_prev: &Array1<f64>, c_prev: &Array1<f64>) -> StepCache {
        let hidden = self.hidden_size;
        let z = &self.params.w_x * x + self.params.w_h.dot(h_prev) + &self.params.b;

        let g_pre = z.slice(s![2 * hidden..3 * hidden]).to_owned();
        let mut gates = z.mapv(sigmoid);
        let act = self.activation;
        gates
            .slice_mut(s![2 * hidden..3 * hidden])
            .assign(&g_pre.mapv(|v| act.apply(v)));

        let i = gates.slice(s![0..hidden]);
        let f = gates.slice(s![hidden..2 * hidden]);
        let g = gates.slice(s![2 * hidden..3 * hidden]);
        let c = &f * c_prev + &i * &g;

        StepCache {
            x,
            h_prev: h_prev.clone(),
            c_prev: c_prev.clone(),
            gates,
            g_pre,
            c,
        }
    }

    fn hidden_of(&self, cache: &StepCache) -> Array1<f64> {
        let hidden = self.hidden_size;
        let act = self.activation;
        &cache.gates.slice(s![3 * hidden..4 * hidden]) * &cache.c.mapv(|v| act.apply(v))
    }

    /// Run a window through the network keeping every step for backprop
    fn forward(&self, window: &[f64]) -> (f64, Vec<StepCache>) {
        let mut h = Array1::<f64>::zeros(self.hidden_size);
        let mut c = Array1::<f64>::zeros(self.hidden_size);
        let mut caches = Vec::with_capacity(window.len());

        for &x in window {
            let cache = self.step(x, &h, &c);
            h = self.hidden_of(&cache);
            c = cache.c.clone();
            caches.push(cache);
        }

        let y = self.params.v.dot(&h) + self.params.d[0];
        (y, caches)
    }

    /// Accumulate gradients of `dy * y` into `grads`
    fn backward(&self, caches: &[StepCache], dy: f64, grads: &mut Params) {
        let hidden = self.hidden_size;
        let act = self.activation;

        let Some(last) = caches.last() else {
            return;
        };
        let h_last = self.hidden_of(last);
        grads.v.scaled_add(dy, &h_last);
        grads.d[0] += dy;

        let mut dh = &self.params.v * dy;
        let mut dc = Array1::<f64>::zeros(hidden);

        for cache in caches.iter().rev() {
            let i = cache.gates.slice(s![0..hidden]);
            let f = cache.gates.slice(s![hidden..2 * hidden]);
            let g = cache.gates.slice(s![2 * hidden..3 * hidden]);
            let o = cache.gates.slice(s![3 * hidden..4 * hidden]);

            let c_act = cache.c.mapv(|v| act.apply(v));
            let c_grad = cache.c.mapv(|v| act.derivative(v));

            let d_o = &dh * &c_act;
            dc = dc + &dh * &o * &c_grad;

            let dz_i = &dc * &g * &i * &i.mapv(|v| 1.0 - v);
            let dz_f = &dc * &cache.c_prev * &f * &f.mapv(|v| 1.0 - v);
            let dz_g = &dc * &i * &cache.g_pre.mapv(|v| act.derivative(v));
            let dz_o = &d_o * &o * &o.mapv(|v| 1.0 - v);

            let mut dz = Array1::<f64>::zeros(4 * hidden);
            dz.slice_mut(s![0..hidden]).assign(&dz_i);
            dz.slice_mut(s![hidden..2 * hidden]).assign(&dz_f);
            dz.slice_mut(s![2 * hidden..3 * hidden]).assign(&dz_g);
            dz.slice_mut(s![3 * hidden..4 * hidden]).assign(&dz_o);

            grads.w_x.scaled_add(cache.x, &dz);
            grads.b += &dz;
            general_mat_mul(
                1.0,
                &dz.view().insert_axis(Axis(1)),
                &cache.h_prev.view().insert_axis(Axis(0)),
                1.0,
                &mut grads.w_h,
            );

            dh = self.params.w_h.t().dot(&dz);
            dc = &dc * &f;
        }
    }

    fn apply(&mut self, grads: &Params, moments: &mut ParamMoments, adam: &mut Adam) {
        let step = adam.next_step();
        moments.w_x.update(&mut self.params.w_x, &grads.w_x, step);
        moments.w_h.update(&mut self.params.w_h, &grads.w_h, step);
        moments.b.update(&mut self.params.b, &grads.b, step);
        moments.v.update(&mut self.params.v, &grads.v, step);
        moments.d.update(&mut self.params.d, &grads.d, step);
    }

    /// Train on windows with shuffled minibatches and a mean squared error loss
    ///
    /// Returns the loss after each epoch. A non-finite loss stops training
    /// with [`ForecastError::ForecastFailure`].
    pub fn train(&mut self, windows: &[Window<'_>], config: &SequenceConfig) -> Result<&[f64]> {
        if windows.is_empty() {
            return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
        }

        let mut adam = Adam::new(config.learning_rate);
        let mut moments = ParamMoments::zeros_like(&self.params);
        let mut order: Vec<usize> = (0..windows.len()).collect();

        for epoch in 1..=config.iterations {
            order.shuffle(&mut self.rng);
            let mut epoch_loss = 0.0;

            for batch in order.chunks(config.batch_size) {
                let mut grads = Params::zeros(self.hidden_size);
                for &idx in batch {
                    let window = &windows[idx];
                    let (y, caches) = self.forward(window.input);
                    let err = y - window.target;
                    epoch_loss += err * err;
                    self.backward(&caches, 2.0 * err / batch.len() as f64, &mut grads);
                }

                if let Some(clip) = config.gradient_clip {
                    let norm = grads.sum_of_squares().sqrt();
                    if norm > clip {
                        grads.scale(clip / norm);
                    }
                }

                self.apply(&grads, &mut moments, &mut adam);
            }

            epoch_loss /= windows.len() as f64;
            if !epoch_loss.is_finite() {
                return Err(ForecastError::ForecastFailure(format!(
                    "Training diverged at epoch {} (loss {})",
                    epoch, epoch_loss
                )));
            }

            debug!("Epoch {}/{}: loss {:.6}", epoch, config.iterations, epoch_loss);
            self.loss_history.push(epoch_loss);
        }

        Ok(&self.loss_history)
    }
}

impl SequenceRegressor for LstmRegressor {
    fn predict_next(&self, window: &[f64]) -> f64 {
        self.forward(window).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sequence::build_windows;

    fn small_config() -> SequenceConfig {
        SequenceConfig::new(5, 10, 1)
            .unwrap()
            .with_hidden_size(4)
            .unwrap()
            .with_learning_rate(0.01)
            .unwrap()
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let config = small_config().with_activation(CellActivation::Tanh);
        let mut model = LstmRegressor::new(&config);
        let window = [0.1, 0.4, 0.3, 0.8, 0.5];

        let (_, caches) = model.forward(&window);
        let mut grads = Params::zeros(model.hidden_size);
        model.backward(&caches, 1.0, &mut grads);

        let eps = 1e-6;
        for (row, col) in [(0, 0), (5, 2), (12, 3)] {
            let original = model.params.w_h[[row, col]];
            model.params.w_h[[row, col]] = original + eps;
            let up = model.predict_next(&window);
            model.params.w_h[[row, col]] = original - eps;
            let down = model.predict_next(&window);
            model.params.w_h[[row, col]] = original;

            let numeric = (up - down) / (2.0 * eps);
            assert!(
                (numeric - grads.w_h[[row, col]]).abs() < 1e-5,
                "w_h[{}, {}]: numeric {} analytic {}",
                row,
                col,
                numeric,
                grads.w_h[[row, col]]
            );
        }

        let original = model.params.w_x[6];
        model.params.w_x[6] = original + eps;
        let up = model.predict_next(&window);
        model.params.w_x[6] = original - eps;
        let down = model.predict_next(&window);
        model.params.w_x[6] = original;
        assert!(((up - down) / (2.0 * eps) - grads.w_x[6]).abs() < 1e-5);
    }

    #[test]
    fn test_training_reduces_loss() {
        let values: Vec<f64> = (0..60).map(|i| (i as f64 / 6.0).sin() * 0.5 + 0.5).collect();
        let windows = build_windows(&values, 5);
        let config = small_config();
        let mut model = LstmRegressor::new(&config);

        let history = model.train(&windows, &config).unwrap().to_vec();

        assert_eq!(history.len(), 10);
        assert!(history.last().unwrap() < history.first().unwrap());
    }

    #[test]
    fn test_same_seed_same_weights() {
        let config = small_config();
        let a = LstmRegressor::new(&config);
        let b = LstmRegressor::new(&config);
        assert_eq!(a.params.w_h, b.params.w_h);
        assert_eq!(a.predict_next(&[0.2; 5]), b.predict_next(&[0.2; 5]));
    }
}
