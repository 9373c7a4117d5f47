//! Tree ensembles: random forest and extremely randomized trees.
//!
//! Trees are independent, so they are grown in parallel with rayon. Each
//! tree gets its own RNG seeded from `(seed, tree index)`, which keeps the
//! result identical regardless of thread scheduling.

use ndarray::ArrayView2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{BinnedMatrix, RegressionTree, TreeParams};

#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Bootstrap rows per tree (random forest) or use all rows (extra trees)
    pub bootstrap: bool,
    pub random_splits: bool,
}

impl ForestParams {
    pub fn random_forest() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_leaf: 2,
            bootstrap: true,
            random_splits: false,
        }
    }

    pub fn extra_trees() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_leaf: 2,
            bootstrap: false,
            random_splits: true,
        }
    }
}

/// Averaged regression trees on 0/1 labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    trees: Vec<RegressionTree>,
}

/// Per-tree seed derived from the ensemble seed
pub(crate) fn tree_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl TreeEnsemble {
    pub fn fit(x: ArrayView2<'_, f64>, y: &[f64], params: &ForestParams, seed: u64) -> Self {
        let data = BinnedMatrix::new(x);
        let n_rows = data.n_rows();
        let n_features = data.n_features();
        let ones = vec![1.0; n_rows];

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_leaf: params.min_samples_leaf,
            lambda: 0.0,
            max_features: Some(((n_features as f64).sqrt().ceil() as usize).max(1)),
            random_splits: params.random_splits,
        };

        let trees = (0..params.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed(seed, t));
                let rows: Vec<usize> = if params.bootstrap {
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
                } else {
                    (0..n_rows).collect()
                };
                RegressionTree::fit(&data, rows, y, &ones, &tree_params, &mut rng)
            })
            .collect();

        Self { trees }
    }

    /// Mean leaf value across trees, i.e. the success probability
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        (sum / self.trees.len() as f64).clamp(0.0, 1.0)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn separable(n: usize) -> (Array2<f64>, Vec<f64>) {
        let x = Array2::from_shape_fn((n, 3), |(i, j)| ((i * 7 + j * 13) % 17) as f64 + if j == 0 { i as f64 } else { 0.0 });
        let y = (0..n).map(|i| if i >= n / 2 { 1.0 } else { 0.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_random_forest_learns_signal() {
        let (x, y) = separable(200);
        let params = ForestParams { n_trees: 20, ..ForestParams::random_forest() };
        let forest = TreeEnsemble::fit(x.view(), &y, &params, 42);
        assert_eq!(forest.n_trees(), 20);
        assert!(forest.predict_proba(x.row(10).as_slice().unwrap()) < 0.5);
        assert!(forest.predict_proba(x.row(190).as_slice().unwrap()) > 0.5);
    }

    #[test]
    fn test_extra_trees_deterministic_for_seed() {
        let (x, y) = separable(100);
        let params = ForestParams { n_trees: 10, ..ForestParams::extra_trees() };
        let a = TreeEnsemble::fit(x.view(), &y, &params, 7);
        let b = TreeEnsemble::fit(x.view(), &y, &params, 7);
        assert_eq!(a, b);
    }
}
