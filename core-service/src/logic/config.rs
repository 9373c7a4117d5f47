//! Pipeline configuration
//!
//! Defaults come from `constants.rs`; `from_env()` applies the `RISK_*`
//! overrides. The binary loads `.env` first.

use std::path::PathBuf;

use crate::constants::{
    get_artifacts_dir, get_auc_threshold, get_load_strategy, get_min_stacking_learners, get_seed,
    get_selection_k, get_training_samples, DEFAULT_AUC_THRESHOLD, DEFAULT_MIN_STACKING_LEARNERS,
    DEFAULT_SEED, DEFAULT_SELECTION_K, DEFAULT_STACKING_FOLDS, DEFAULT_TEST_RATIO, DEFAULT_TRAINING_SAMPLES,
};
use crate::logic::artifacts::LoadStrategy;
use crate::logic::training::LearnerKind;

/// Training run settings
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Synthetic students per run (ignored for dataset sources)
    pub samples: usize,
    pub seed: u64,
    pub test_ratio: f64,
    /// Held-out AUC a learner must exceed to join stacking
    pub auc_threshold: f64,
    pub min_stacking_learners: usize,
    pub selection_k: usize,
    pub stacking_folds: usize,
    pub learners: Vec<LearnerKind>,
    /// Smaller ensembles and fewer epochs
    pub fast: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_TRAINING_SAMPLES,
            seed: DEFAULT_SEED,
            test_ratio: DEFAULT_TEST_RATIO,
            auc_threshold: DEFAULT_AUC_THRESHOLD,
            min_stacking_learners: DEFAULT_MIN_STACKING_LEARNERS,
            selection_k: DEFAULT_SELECTION_K,
            stacking_folds: DEFAULT_STACKING_FOLDS,
            learners: LearnerKind::ALL.to_vec(),
            fast: false,
        }
    }
}

impl TrainingConfig {
    pub fn from_env() -> Self {
        Self {
            samples: get_training_samples(),
            seed: get_seed(),
            auc_threshold: get_auc_threshold(),
            min_stacking_learners: get_min_stacking_learners(),
            selection_k: get_selection_k(),
            ..Self::default()
        }
    }

    /// Reduced run for tests and quick checks
    pub fn fast() -> Self {
        Self {
            samples: 800,
            stacking_folds: 3,
            fast: true,
            ..Self::default()
        }
    }
}

/// Predictor settings
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    pub artifacts_dir: PathBuf,
    pub load_strategy: LoadStrategy,
}

impl PredictorConfig {
    pub fn new(artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            load_strategy: LoadStrategy::default(),
        }
    }

    pub fn from_env() -> Self {
        let load_strategy = match get_load_strategy() {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Unknown RISK_LOAD_STRATEGY '{}', using shared-run", raw);
                LoadStrategy::default()
            }),
            None => LoadStrategy::default(),
        };

        Self {
            artifacts_dir: get_artifacts_dir(),
            load_strategy,
        }
    }
}

/// Whole-pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub training: TrainingConfig,
    pub predictor: PredictorConfig,
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            training: TrainingConfig::from_env(),
            predictor: PredictorConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_constants() {
        let config = TrainingConfig::default();
        assert_eq!(config.auc_threshold, 0.75);
        assert_eq!(config.min_stacking_learners, 3);
        assert_eq!(config.selection_k, 40);
        assert_eq!(config.learners.len(), 6);
        assert!(!config.fast);
    }

    #[test]
    fn test_fast_keeps_thresholds() {
        let fast = TrainingConfig::fast();
        assert!(fast.fast);
        assert_eq!(fast.auc_threshold, TrainingConfig::default().auc_threshold);
        assert!(fast.samples < TrainingConfig::default().samples);
    }
}
