use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logic::model::ValidationMetrics;

/// Held-out evaluation of one base learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerScore {
    pub name: String,
    pub metrics: ValidationMetrics,
    /// AUC above the stacking threshold
    pub qualified: bool,
}

/// Whether a stacking ensemble was built this run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StackingOutcome {
    Used {
        learners: Vec<String>,
        metrics: ValidationMetrics,
    },
    Skipped {
        qualifying: usize,
        required: usize,
    },
}

impl StackingOutcome {
    pub fn is_used(&self) -> bool {
        matches!(self, Self::Used { .. })
    }
}

/// How the final model was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    Stacking,
    SingleLearner,
    Fallback,
}

impl Approach {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stacking => "stacking",
            Self::SingleLearner => "single_learner",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub learner_scores: Vec<LearnerScore>,
    pub stacking: StackingOutcome,
    pub approach: Approach,
    pub chosen_model: String,
    pub chosen_metrics: ValidationMetrics,
    pub selected_features: Vec<String>,
    pub total_features: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    /// Rows dropped before training (non-finite features)
    pub skipped_rows: usize,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Training: {} train / {} test rows, {} of {} features selected",
            self.train_samples,
            self.test_samples,
            self.selected_features.len(),
            self.total_features
        )?;
        for score in &self.learner_scores {
            writeln!(
                f,
                "  {:<22} {}{}",
                score.name,
                score.metrics,
                if score.qualified { "" } else { " [below threshold]" }
            )?;
        }
        match &self.stacking {
            StackingOutcome::Used { learners, metrics } => {
                writeln!(f, "  stacking ({} learners)  {}", learners.len(), metrics)?
            }
            StackingOutcome::Skipped { qualifying, required } => writeln!(
                f,
                "  stacking skipped: {} qualifying learners, {} required",
                qualifying, required
            )?,
        }
        write!(
            f,
            "Chosen: {} ({}) auc={:.4} f1={:.4}",
            self.chosen_model,
            self.approach.as_str(),
            self.chosen_metrics.auc,
            self.chosen_metrics.f1
        )
    }
}
