//! Classifier seam and the serializable model enum.
//!
//! Every learner predicts the probability of class 1 ("success"). The
//! predictor turns that into a risk probability; nothing in this module
//! knows about risk.

use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::boosting::GradientBoostedTrees;
use super::forest::TreeEnsemble;
use super::linear::LogisticRegression;
use super::neural::Mlp;
use super::stacking::StackingEnsemble;

/// Anything that scores a scaled feature row
pub trait Classifier: Send + Sync {
    /// Success probability for one row
    fn predict_proba(&self, row: &[f64]) -> f64;

    /// Success probabilities for every row of `x`
    fn predict_proba_batch(&self, x: ArrayView2<'_, f64>) -> Vec<f64> {
        (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                match row.as_slice() {
                    Some(slice) => self.predict_proba(slice),
                    None => self.predict_proba(&row.to_vec()),
                }
            })
            .collect()
    }

    /// Stable model type name (persisted in metadata)
    fn model_type(&self) -> &'static str;
}

/// Every trained model the pipeline can persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model_type", content = "model", rename_all = "snake_case")]
pub enum RiskModel {
    GradientBoosting(GradientBoostedTrees),
    RandomForest(TreeEnsemble),
    ExtraTrees(TreeEnsemble),
    RegularizedBoosting(GradientBoostedTrees),
    StochasticBoosting(GradientBoostedTrees),
    NeuralNet(Mlp),
    LogisticRegression(LogisticRegression),
    Stacking(StackingEnsemble),
}

impl Classifier for RiskModel {
    fn predict_proba(&self, row: &[f64]) -> f64 {
        match self {
            Self::GradientBoosting(m) | Self::RegularizedBoosting(m) | Self::StochasticBoosting(m) => {
                m.predict_proba(row)
            }
            Self::RandomForest(m) | Self::ExtraTrees(m) => m.predict_proba(row),
            Self::NeuralNet(m) => m.predict_proba(row),
            Self::LogisticRegression(m) => m.predict_proba(row),
            Self::Stacking(m) => m.predict_proba(row),
        }
    }

    fn model_type(&self) -> &'static str {
        match self {
            Self::GradientBoosting(_) => "gradient_boosting",
            Self::RandomForest(_) => "random_forest",
            Self::ExtraTrees(_) => "extra_trees",
            Self::RegularizedBoosting(_) => "regularized_boosting",
            Self::StochasticBoosting(_) => "stochastic_boosting",
            Self::NeuralNet(_) => "neural_net",
            Self::LogisticRegression(_) => "logistic_regression",
            Self::Stacking(_) => "stacking_ensemble",
        }
    }
}

impl RiskModel {
    pub fn is_stacking(&self) -> bool {
        matches!(self, Self::Stacking(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn logistic() -> RiskModel {
        RiskModel::LogisticRegression(LogisticRegression {
            weights: vec![1.0, -1.0],
            bias: 0.0,
        })
    }

    #[test]
    fn test_json_carries_model_type_tag() {
        let json = serde_json::to_value(logistic()).unwrap();
        assert_eq!(json["model_type"], "logistic_regression");
        let back: RiskModel = serde_json::from_value(json).unwrap();
        assert_eq!(back, logistic());
    }

    #[test]
    fn test_batch_matches_rows() {
        let model = logistic();
        let x = array![[1.0, 0.0], [0.0, 1.0], [2.0, 2.0]];
        let batch = model.predict_proba_batch(x.view());
        for (i, p) in batch.iter().enumerate() {
            let row = x.row(i).to_vec();
            assert!((p - model.predict_proba(&row)).abs() < 1e-12);
        }
        assert!((batch[2] - 0.5).abs() < 1e-12);
    }
}
