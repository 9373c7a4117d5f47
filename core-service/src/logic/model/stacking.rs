//! Stacking ensemble: base learners feed a logistic meta-learner.
//!
//! The meta-learner's inputs are the base learners' success probabilities,
//! in `learners` order. Fitting (out-of-fold predictions) lives in
//! `training::stacking`; this type only holds the result and scores rows.

use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, RiskModel};
use super::linear::LogisticRegression;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedModel {
    pub name: String,
    pub model: RiskModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackingEnsemble {
    pub learners: Vec<NamedModel>,
    pub meta: LogisticRegression,
}

impl StackingEnsemble {
    /// Meta-learner input for one row
    pub fn meta_features(&self, row: &[f64]) -> Vec<f64> {
        self.learners
            .iter()
            .map(|learner| learner.model.predict_proba(row))
            .collect()
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        self.meta.predict_proba(&self.meta_features(row))
    }

    pub fn learner_names(&self) -> Vec<&str> {
        self.learners.iter().map(|l| l.name.as_str()).collect()
    }
}
