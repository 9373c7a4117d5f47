//! L2-regularized logistic regression (full-batch gradient descent).
//!
//! Used as the stacking meta-learner and as the fallback model. Inputs are
//! expected to be scaled.

use ndarray::{Array1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::boosting::sigmoid;

#[derive(Debug, Clone, Copy)]
pub struct LogisticParams {
    pub l2: f64,
    pub learning_rate: f64,
    pub epochs: usize,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            l2: 1e-2,
            learning_rate: 0.5,
            epochs: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticRegression {
    pub fn fit(x: ArrayView2<'_, f64>, y: &[f64], params: &LogisticParams) -> Self {
        let n = x.nrows().max(1) as f64;
        let targets = Array1::from_vec(y.to_vec());
        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;

        for _ in 0..params.epochs {
            let z = x.dot(&w) + b;
            let residual = z.mapv(sigmoid) - &targets;
            let grad_w = x.t().dot(&residual) / n + &w * params.l2;
            let grad_b = residual.sum() / n;
            w.scaled_add(-params.learning_rate, &grad_w);
            b -= params.learning_rate * grad_b;
        }

        Self {
            weights: w.to_vec(),
            bias: b,
        }
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }

    pub fn predict_proba_batch(&self, x: ArrayView2<'_, f64>) -> Vec<f64> {
        x.axis_iter(Axis(0))
            .map(|row| {
                let z: f64 = row.iter().zip(&self.weights).map(|(x, w)| x * w).sum();
                sigmoid(z + self.bias)
            })
            .collect()
    }
}
