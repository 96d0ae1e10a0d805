//! Adam optimizer over ndarray parameter tensors

use ndarray::{Array, Dimension, Zip};

/// Shared Adam hyperparameters and step counter
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    step: i32,
}

/// Bias-corrected step size for the current update
#[derive(Debug, Clone, Copy)]
pub struct AdamStep {
    step_size: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            step: 0,
        }
    }

    /// Advance the step counter and return the settings for this update
    pub fn next_step(&mut self) -> AdamStep {
        self.step += 1;
        let correction1 = 1.0 - self.beta1.powi(self.step);
        let correction2 = 1.0 - self.beta2.powi(self.step);
        AdamStep {
            step_size: self.learning_rate * correction2.sqrt() / correction1,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
        }
    }

    /// Number of updates taken so far
    pub fn steps(&self) -> i32 {
        self.step
    }
}

/// First and second moment estimates for one parameter tensor
#[derive(Debug, Clone)]
pub struct Moments<D: Dimension> {
    m: Array<f64, D>,
    v: Array<f64, D>,
}

impl<D: Dimension> Moments<D> {
    pub fn zeros_like(param: &Array<f64, D>) -> Self {
        Self {
            m: Array::zeros(param.raw_dim()),
            v: Array::zeros(param.raw_dim()),
        }
    }

    /// Apply one Adam update to `param`
    pub fn update(&mut self, param: &mut Array<f64, D>, grad: &Array<f64, D>, step: AdamStep) {
        Zip::from(param)
            .and(grad)
            .and(&mut self.m)
            .and(&mut self.v)
            .for_each(|p, &g, m, v| {
                *m = step.beta1 * *m + (1.0 - step.beta1) * g;
                *v = step.beta2 * *v + (1.0 - step.beta2) * g * g;
                *p -= step.step_size * *m / (v.sqrt() + step.epsilon);
            });
    }
}
