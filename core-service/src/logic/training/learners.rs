//! Base learner roster.
//!
//! Six independent learners; each fit gets its own seed derived from the run
//! seed, so they share no mutable state and can run in parallel.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::logic::model::boosting::{BoostingParams, GradientBoostedTrees};
use crate::logic::model::forest::{ForestParams, TreeEnsemble};
use crate::logic::model::neural::{Mlp, MlpParams};
use crate::logic::model::RiskModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnerKind {
    GradientBoosting,
    RandomForest,
    ExtraTrees,
    RegularizedBoosting,
    StochasticBoosting,
    NeuralNet,
}

impl LearnerKind {
    pub const ALL: [LearnerKind; 6] = [
        LearnerKind::GradientBoosting,
        LearnerKind::RandomForest,
        LearnerKind::ExtraTrees,
        LearnerKind::RegularizedBoosting,
        LearnerKind::StochasticBoosting,
        LearnerKind::NeuralNet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::GradientBoosting => "gradient_boosting",
            Self::RandomForest => "random_forest",
            Self::ExtraTrees => "extra_trees",
            Self::RegularizedBoosting => "regularized_boosting",
            Self::StochasticBoosting => "stochastic_boosting",
            Self::NeuralNet => "neural_net",
        }
    }

    /// Seed for this learner within a run
    pub fn seed(&self, run_seed: u64) -> u64 {
        let position = Self::ALL.iter().position(|k| k == self).unwrap_or(0) as u64;
        run_seed.wrapping_add(1000 * (position + 1))
    }

    /// Fit on scaled rows. `fast` shrinks tree counts and epochs for tests.
    pub fn fit(&self, x: ArrayView2<'_, f64>, y: &[f64], seed: u64, fast: bool) -> RiskModel {
        let shrink = |n: usize| if fast { (n / 5).max(10) } else { n };
        let boosting = |mut p: BoostingParams| {
            p.n_trees = shrink(p.n_trees);
            p
        };
        let forest = |mut p: ForestParams| {
            p.n_trees = shrink(p.n_trees);
            p
        };

        match self {
            Self::GradientBoosting => RiskModel::GradientBoosting(GradientBoostedTrees::fit(
                x,
                y,
                &boosting(BoostingParams::gradient_boosting()),
                seed,
            )),
            Self::RandomForest => {
                RiskModel::RandomForest(TreeEnsemble::fit(x, y, &forest(ForestParams::random_forest()), seed))
            }
            Self::ExtraTrees => {
                RiskModel::ExtraTrees(TreeEnsemble::fit(x, y, &forest(ForestParams::extra_trees()), seed))
            }
            Self::RegularizedBoosting => RiskModel::RegularizedBoosting(GradientBoostedTrees::fit(
                x,
                y,
                &boosting(BoostingParams::regularized()),
                seed,
            )),
            Self::StochasticBoosting => RiskModel::StochasticBoosting(GradientBoostedTrees::fit(
                x,
                y,
                &boosting(BoostingParams::stochastic()),
                seed,
            )),
            Self::NeuralNet => {
                let mut params = MlpParams::default();
                if fast {
                    params.epochs = 15;
                }
                RiskModel::NeuralNet(Mlp::fit(x, y, &params, seed))
            }
        }
    }
}

impl std::fmt::Display for LearnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::logic::model::Classifier;

    #[test]
    fn test_learner_names_match_model_types() {
        let x = ndarray::Array2::from_shape_fn((40, 2), |(i, j)| (i * (j + 1)) as f64 / 40.0);
        let y: Vec<f64> = (0..40).map(|i| if i >= 20 { 1.0 } else { 0.0 }).collect();
        for kind in LearnerKind::ALL {
            let model = kind.fit(x.view(), &y, kind.seed(1), true);
            assert_eq!(model.model_type(), kind.name());
        }
    }

    #[test]
    fn test_seeds_are_distinct() {
        let seeds: HashSet<u64> = LearnerKind::ALL.iter().map(|k| k.seed(42)).collect();
        assert_eq!(seeds.len(), LearnerKind::ALL.len());
    }
}
