//! Central Configuration Constants
//!
//! Single source of truth for all pipeline defaults.
//! Thresholds that shape training or risk bucketing live here, never inline.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name (also the data directory name)
pub const APP_NAME: &str = "student-risk";

// ============================================
// Training
// ============================================

/// Held-out AUC a base learner must exceed to join the stacking ensemble
pub const DEFAULT_AUC_THRESHOLD: f64 = 0.75;

/// Minimum qualifying base learners before stacking is attempted
pub const DEFAULT_MIN_STACKING_LEARNERS: usize = 3;

/// Top-K per univariate ranking during feature selection
pub const DEFAULT_SELECTION_K: usize = 40;

/// Out-of-fold splits for the stacking meta-learner
pub const DEFAULT_STACKING_FOLDS: usize = 5;

/// Fraction of rows held out for evaluation
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Synthetic students generated per training run
pub const DEFAULT_TRAINING_SAMPLES: usize = 5000;

/// Seed for every reproducible random stream
pub const DEFAULT_SEED: u64 = 42;

// ============================================
// Risk bucketing
// ============================================

/// risk < LOW_RISK_UPPER -> "Low Risk" / success
pub const LOW_RISK_UPPER: f64 = 0.3;

/// risk < MODERATE_RISK_UPPER -> "Moderate Risk" / warning, else "High Risk" / danger
pub const MODERATE_RISK_UPPER: f64 = 0.7;

/// Probability reported when a row cannot be scored
pub const FALLBACK_RISK_PROBABILITY: f64 = 0.5;

// ============================================
// Fallback model
// ============================================

/// Synthetic rows used to fit the fallback model
pub const FALLBACK_SAMPLES: usize = 400;

/// Seed for the fallback model sample
pub const FALLBACK_SEED: u64 = 7;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Default artifacts directory under the local data dir
pub fn default_artifacts_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("artifacts")
}

/// Get artifacts directory from environment or use default
pub fn get_artifacts_dir() -> PathBuf {
    std::env::var("RISK_ARTIFACTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_artifacts_dir())
}

/// Get stacking AUC threshold from environment or use default
pub fn get_auc_threshold() -> f64 {
    std::env::var("RISK_AUC_THRESHOLD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_AUC_THRESHOLD)
}

/// Get minimum stacking learners from environment or use default
pub fn get_min_stacking_learners() -> usize {
    std::env::var("RISK_MIN_STACKING_LEARNERS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MIN_STACKING_LEARNERS)
}

/// Get feature selection K from environment or use default
pub fn get_selection_k() -> usize {
    std::env::var("RISK_SELECTION_K")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|k: &usize| *k > 0)
        .unwrap_or(DEFAULT_SELECTION_K)
}

/// Get synthetic training sample count from environment or use default
pub fn get_training_samples() -> usize {
    std::env::var("RISK_TRAINING_SAMPLES")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or(DEFAULT_TRAINING_SAMPLES)
}

/// Get seed from environment or use default
pub fn get_seed() -> u64 {
    std::env::var("RISK_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

/// Get artifact load strategy name from environment (parsed by the config layer)
pub fn get_load_strategy() -> Option<String> {
    std::env::var("RISK_LOAD_STRATEGY").ok()
}
