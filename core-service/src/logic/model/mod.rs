//! Model Module - learners, scaler and evaluation
//!
//! Pure model math: every learner fits on a scaled `Array2<f64>` with 0/1
//! success labels and predicts a success probability. Training orchestration
//! lives in `training`, persistence in `artifacts`.

pub mod boosting;
pub mod classifier;
pub mod forest;
pub mod linear;
pub mod metrics;
pub mod neural;
pub mod scaler;
pub mod stacking;
pub mod tree;

// Re-export common types
pub use classifier::{Classifier, RiskModel};
pub use metrics::{compute_validation_metrics, roc_auc, ValidationMetrics};
pub use scaler::RobustScaler;
pub use stacking::{NamedModel, StackingEnsemble};
