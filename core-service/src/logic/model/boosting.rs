//! Gradient boosted trees on log-loss.
//!
//! Three learners share this implementation and differ only in parameters:
//! classic gradient boosting, a regularized variant (L2 leaf penalty with
//! row and column subsampling) and a stochastic variant (shallow trees,
//! heavy row subsampling, small shrinkage).

use ndarray::ArrayView2;
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::tree::{BinnedMatrix, RegressionTree, TreeParams};

#[derive(Debug, Clone, Copy)]
pub struct BoostingParams {
    pub n_trees: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub lambda: f64,
    /// Row fraction per round (sampled without replacement)
    pub subsample: f64,
    /// Feature fraction per node
    pub colsample: f64,
}

impl BoostingParams {
    pub fn gradient_boosting() -> Self {
        Self {
            n_trees: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 5,
            lambda: 0.1,
            subsample: 1.0,
            colsample: 1.0,
        }
    }

    pub fn regularized() -> Self {
        Self {
            n_trees: 100,
            learning_rate: 0.1,
            max_depth: 4,
            min_samples_leaf: 5,
            lambda: 1.0,
            subsample: 0.8,
            colsample: 0.8,
        }
    }

    pub fn stochastic() -> Self {
        Self {
            n_trees: 150,
            learning_rate: 0.05,
            max_depth: 2,
            min_samples_leaf: 5,
            lambda: 0.1,
            subsample: 0.5,
            colsample: 1.0,
        }
    }
}

#[inline]
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    base_score: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedTrees {
    pub fn fit(x: ArrayView2<'_, f64>, y: &[f64], params: &BoostingParams, seed: u64) -> Self {
        let data = BinnedMatrix::new(x);
        let n_rows = data.n_rows();
        let n_features = data.n_features();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let prior = (y.iter().sum::<f64>() / n_rows.max(1) as f64).clamp(1e-6, 1.0 - 1e-6);
        let base_score = (prior / (1.0 - prior)).ln();

        let max_features = if params.colsample < 1.0 {
            Some(((params.colsample * n_features as f64).ceil() as usize).max(1))
        } else {
            None
        };
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_leaf: params.min_samples_leaf,
            lambda: params.lambda,
            max_features,
            random_splits: false,
        };
        let rows_per_round = ((params.subsample * n_rows as f64).round() as usize).clamp(1, n_rows.max(1));

        let mut margin = vec![base_score; n_rows];
        let mut g = vec![0.0; n_rows];
        let mut h = vec![0.0; n_rows];
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            for i in 0..n_rows {
                let p = sigmoid(margin[i]);
                g[i] = y[i] - p;
                h[i] = (p * (1.0 - p)).max(1e-6);
            }

            let rows: Vec<usize> = if rows_per_round < n_rows {
                let mut rows = sample(&mut rng, n_rows, rows_per_round).into_vec();
                rows.sort_unstable();
                rows
            } else {
                (0..n_rows).collect()
            };

            let tree = RegressionTree::fit(&data, rows, &g, &h, &tree_params, &mut rng);
            for (i, row) in x.rows().into_iter().enumerate() {
                let step = match row.as_slice() {
                    Some(slice) => tree.predict(slice),
                    None => tree.predict(&row.to_vec()),
                };
                margin[i] += params.learning_rate * step;
            }
            trees.push(tree);
        }

        Self {
            base_score,
            learning_rate: params.learning_rate,
            trees,
        }
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let margin = self.base_score
            + self.learning_rate * self.trees.iter().map(|t| t.predict(row)).sum::<f64>();
        sigmoid(margin)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn data() -> (Array2<f64>, Vec<f64>) {
        let n = 300;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { (i % 100) as f64 } else { ((i * 31) % 11) as f64 });
        let y = (0..n).map(|i| if i % 100 >= 50 { 1.0 } else { 0.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_boosting_fits_threshold() {
        let (x, y) = data();
        let model = GradientBoostedTrees::fit(x.view(), &y, &BoostingParams::gradient_boosting(), 1);
        assert_eq!(model.n_trees(), 100);
        assert!(model.predict_proba(&[10.0, 3.0]) < 0.2);
        assert!(model.predict_proba(&[90.0, 3.0]) > 0.8);
    }

    #[test]
    fn test_stochastic_variant_is_seeded() {
        let (x, y) = data();
        let params = BoostingParams { n_trees: 20, ..BoostingParams::stochastic() };
        let a = GradientBoostedTrees::fit(x.view(), &y, &params, 5);
        let b = GradientBoostedTrees::fit(x.view(), &y, &params, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_prior_only_model() {
        let (x, y) = data();
        let params = BoostingParams { n_trees: 0, ..BoostingParams::regularized() };
        let model = GradientBoostedTrees::fit(x.view(), &y, &params, 1);
        assert!((model.predict_proba(&[0.0, 0.0]) - 0.5).abs() < 1e-9);
    }
}
