//! Multilayer perceptron: one hidden ReLU layer, sigmoid output.
//!
//! Trained with Adam on shuffled mini-batches of log-loss. Weight init and
//! batch order come from a seeded ChaCha8 stream.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use super::boosting::sigmoid;

#[derive(Debug, Clone, Copy)]
pub struct MlpParams {
    pub hidden: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub l2: f64,
}

impl Default for MlpParams {
    fn default() -> Self {
        Self {
            hidden: 32,
            epochs: 40,
            batch_size: 64,
            learning_rate: 0.005,
            l2: 1e-4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mlp {
    w1: Array2<f64>,
    b1: Array1<f64>,
    w2: Array1<f64>,
    b2: f64,
}

/// Adam moment estimates for one parameter tensor
struct Moments<D: ndarray::Dimension> {
    m: ndarray::Array<f64, D>,
    v: ndarray::Array<f64, D>,
}

impl<D: ndarray::Dimension> Moments<D> {
    fn zeros_like(shape: &ndarray::Array<f64, D>) -> Self {
        Self {
            m: ndarray::Array::zeros(shape.raw_dim()),
            v: ndarray::Array::zeros(shape.raw_dim()),
        }
    }

    fn step(&mut self, param: &mut ndarray::Array<f64, D>, grad: &ndarray::Array<f64, D>, lr: f64, t: i32) {
        const BETA1: f64 = 0.9;
        const BETA2: f64 = 0.999;
        const EPS: f64 = 1e-8;

        self.m.zip_mut_with(grad, |m, g| *m = BETA1 * *m + (1.0 - BETA1) * g);
        self.v.zip_mut_with(grad, |v, g| *v = BETA2 * *v + (1.0 - BETA2) * g * g);

        let m_corr = 1.0 - BETA1.powi(t);
        let v_corr = 1.0 - BETA2.powi(t);
        ndarray::Zip::from(param)
            .and(&self.m)
            .and(&self.v)
            .for_each(|p, m, v| *p -= lr * (m / m_corr) / ((v / v_corr).sqrt() + EPS));
    }
}

fn normal_sample(rng: &mut ChaCha8Rng, std_dev: f64) -> f64 {
    use rand::distributions::Distribution;
    Normal::new(0.0, std_dev)
        .map(|d| d.sample(rng))
        .unwrap_or(0.0)
}

impl Mlp {
    pub fn fit(x: ArrayView2<'_, f64>, y: &[f64], params: &MlpParams, seed: u64) -> Self {
        let n_in = x.ncols();
        let n_rows = x.nrows();
        let hidden = params.hidden.max(1);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        // He init for the ReLU layer, Xavier-ish for the output
        let std1 = (2.0 / n_in.max(1) as f64).sqrt();
        let std2 = (1.0 / hidden as f64).sqrt();
        let mut model = Self {
            w1: Array2::from_shape_simple_fn((n_in, hidden), || normal_sample(&mut rng, std1)),
            b1: Array1::zeros(hidden),
            w2: Array1::from_shape_simple_fn(hidden, || normal_sample(&mut rng, std2)),
            b2: 0.0,
        };

        let mut w1_m = Moments::zeros_like(&model.w1);
        let mut b1_m = Moments::zeros_like(&model.b1);
        let mut w2_m = Moments::zeros_like(&model.w2);
        let mut b2_m = Moments::zeros_like(&Array1::from_elem(1, model.b2));

        let mut order: Vec<usize> = (0..n_rows).collect();
        let mut t = 0;

        for _ in 0..params.epochs {
            order.shuffle(&mut rng);
            for batch in order.chunks(params.batch_size.max(1)) {
                t += 1;
                let xb = x.select(Axis(0), batch);
                let yb = Array1::from_iter(batch.iter().map(|&i| y[i]));
                let bs = batch.len() as f64;

                // Forward
                let z1 = xb.dot(&model.w1) + &model.b1;
                let a1 = z1.mapv(|v| v.max(0.0));
                let p = (a1.dot(&model.w2) + model.b2).mapv(sigmoid);

                // Backward (log-loss through sigmoid)
                let dz2 = (&p - &yb) / bs;
                let grad_w2 = a1.t().dot(&dz2) + &model.w2 * params.l2;
                let grad_b2 = Array1::from_elem(1, dz2.sum());

                let mut dz1 = dz2
                    .view()
                    .insert_axis(Axis(1))
                    .dot(&model.w2.view().insert_axis(Axis(0)));
                dz1.zip_mut_with(&z1, |d, z| {
                    if *z <= 0.0 {
                        *d = 0.0;
                    }
                });
                let grad_w1 = xb.t().dot(&dz1) + &model.w1 * params.l2;
                let grad_b1 = dz1.sum_axis(Axis(0));

                w1_m.step(&mut model.w1, &grad_w1, params.learning_rate, t);
                b1_m.step(&mut model.b1, &grad_b1, params.learning_rate, t);
                w2_m.step(&mut model.w2, &grad_w2, params.learning_rate, t);
                let mut b2 = Array1::from_elem(1, model.b2);
                b2_m.step(&mut b2, &grad_b2, params.learning_rate, t);
                model.b2 = b2[0];
            }
        }

        model
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut out = self.b2;
        for (j, (&bias, &w_out)) in self.b1.iter().zip(self.w2.iter()).enumerate() {
            let z: f64 = self
                .w1
                .column(j)
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>()
                + bias;
            out += z.max(0.0) * w_out;
        }
        sigmoid(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mlp_learns_boundary() {
        // 20 x 20 grid on [-1, 1)^2, success above the anti-diagonal
        let x = Array2::from_shape_fn((400, 2), |(i, j)| {
            let k = if j == 0 { i / 20 } else { i % 20 };
            k as f64 / 10.0 - 0.95
        });
        let y: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|r| if r[0] + r[1] > 0.0 { 1.0 } else { 0.0 })
            .collect();

        let params = MlpParams {
            epochs: 100,
            learning_rate: 0.01,
            ..Default::default()
        };
        let model = Mlp::fit(x.view(), &y, &params, 3);
        assert!(model.predict_proba(&[0.8, 0.8]) > 0.5);
        assert!(model.predict_proba(&[-0.8, -0.8]) < 0.5);
    }

    #[test]
    fn test_mlp_seeded() {
        let x = Array2::from_shape_fn((50, 3), |(i, j)| (i * (j + 1)) as f64 / 50.0);
        let y: Vec<f64> = (0..50).map(|i| (i % 2) as f64).collect();
        let params = MlpParams { epochs: 3, ..Default::default() };
        assert_eq!(Mlp::fit(x.view(), &y, &params, 9), Mlp::fit(x.view(), &y, &params, 9));
    }
}
