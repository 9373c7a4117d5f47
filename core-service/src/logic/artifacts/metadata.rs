use serde::{Deserialize, Serialize};

use crate::logic::features::layout::{layout_hash, FEATURE_VERSION};
use crate::logic::features::FeatureList;
use crate::logic::model::{Classifier, RiskModel, RobustScaler};
use crate::logic::training::{Approach, LearnerScore, StackingOutcome, TrainingOutcome};

// ============================================================================
// RUN METADATA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub run_id: String,
    /// Shared file-name suffix of this run
    pub run_timestamp: String,
    pub model_type: String,
    pub approach: Approach,

    // Held-out evaluation of the chosen model
    pub auc: f64,
    pub f1: f64,
    pub accuracy: f64,

    pub feature_count: usize,
    pub sample_count: usize,
    pub train_samples: usize,
    pub test_samples: usize,

    // Layout the feature list was drawn from
    pub feature_version: u8,
    pub layout_hash: u32,

    pub has_scaler: bool,
    /// SHA-256 (hex) of the model file bytes
    pub model_sha256: String,

    pub stacking: StackingOutcome,
    #[serde(default)]
    pub learner_scores: Vec<LearnerScore>,
    pub created_at: i64, // Unix timestamp
}

/// Where a loaded artifact came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactOrigin {
    /// Run timestamp of the model file
    pub run_timestamp: String,
    /// Files were drawn from more than one run
    pub mixed_runs: bool,
}

/// Model, scaler, feature list and metadata of one training run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub model: RiskModel,
    pub scaler: Option<RobustScaler>,
    pub features: FeatureList,
    pub metadata: ArtifactMetadata,
    /// Set by the loader
    pub origin: Option<ArtifactOrigin>,
}

impl ModelArtifact {
    /// Bundle a training outcome; checksum and timestamp are filled on save
    pub fn from_training(outcome: TrainingOutcome) -> Self {
        let metadata = ArtifactMetadata {
            run_id: uuid::Uuid::new_v4().to_string(),
            run_timestamp: String::new(),
            model_type: outcome.model.model_type().to_string(),
            approach: outcome.report.approach,
            auc: outcome.metrics.auc,
            f1: outcome.metrics.f1,
            accuracy: outcome.metrics.accuracy,
            feature_count: outcome.features.len(),
            sample_count: outcome.sample_count,
            train_samples: outcome.report.train_samples,
            test_samples: outcome.report.test_samples,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            has_scaler: true,
            model_sha256: String::new(),
            stacking: outcome.report.stacking.clone(),
            learner_scores: outcome.report.learner_scores.clone(),
            created_at: chrono::Utc::now().timestamp(),
        };

        Self {
            model: outcome.model,
            scaler: Some(outcome.scaler),
            features: outcome.features,
            metadata,
            origin: None,
        }
    }
}
