//! Predictor Service
//!
//! Long-lived scorer built once from the artifact directory. The loaded
//! model is immutable and shared behind an `Arc`; a `predict()` call takes a
//! snapshot of that `Arc` and never touches the directory again. `reload()`
//! swaps in a new snapshot while in-flight calls finish on the old one.
//!
//! # Contract
//! - `predict()` never fails: a row that cannot be scored becomes an
//!   "Unable to Predict" result, and the rest of the batch is unaffected.
//! - Without a valid artifact the service runs a deterministic fallback
//!   model and reports `model_type == "fallback"`.

pub mod fallback;
pub mod result;
pub mod risk;


use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use result::{summarize, BatchSummary, PredictionResult, FALLBACK_MODEL_TYPE};
pub use risk::{categorize, confidence, RiskCategory, RiskLevel};

use crate::logic::artifacts::{load_artifact, FallbackReason, LoadResult, LoadStrategy, ModelArtifact};
use crate::logic::config::PredictorConfig;
use crate::logic::features::engineer::active_risk_factors;
use crate::logic::features::{reconstruct_resolved, resolve_base, FeatureList, ReconstructError, StudentRecord};
use crate::logic::interventions::recommend;
use crate::logic::model::{Classifier, RiskModel, RobustScaler};
use crate::logic::training::Approach;

/// Per-row scoring failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("{0}")]
    Reconstruct(#[from] ReconstructError),

    #[error("Model returned invalid probability {0}")]
    InvalidProbability(f64),

    #[error("Row processing panicked: {0}")]
    Panic(String),
}

/// Summary of the active model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    /// Held-out AUC from training (absent for the fallback model)
    pub auc_score: Option<f64>,
    pub feature_count: usize,
    pub approach: String,
    pub run_timestamp: Option<String>,
    pub mixed_runs: bool,
    pub load_strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

// ============================================================================
// ACTIVE MODEL
// ============================================================================

/// Immutable snapshot every prediction reads from
struct ActiveModel {
    model: RiskModel,
    scaler: Option<RobustScaler>,
    features: FeatureList,
    info: ModelInfo,
}

impl ActiveModel {
    fn from_artifact(artifact: ModelArtifact, strategy: LoadStrategy) -> Self {
        let origin = artifact.origin.clone();
        let info = ModelInfo {
            model_type: artifact.metadata.model_type.clone(),
            auc_score: Some(artifact.metadata.auc),
            feature_count: artifact.features.len(),
            approach: artifact.metadata.approach.as_str().to_string(),
            run_timestamp: origin
                .as_ref()
                .map(|o| o.run_timestamp.clone())
                .or_else(|| Some(artifact.metadata.run_timestamp.clone()).filter(|ts| !ts.is_empty())),
            mixed_runs: origin.map(|o| o.mixed_runs).unwrap_or(false),
            load_strategy: strategy.to_string(),
            fallback_reason: None,
        };

        Self {
            model: artifact.model,
            scaler: artifact.scaler,
            features: artifact.features,
            info,
        }
    }

    fn fallback(reason: &FallbackReason, strategy: LoadStrategy) -> Self {
        let fallback = fallback::fit_fallback();
        let info = ModelInfo {
            model_type: FALLBACK_MODEL_TYPE.to_string(),
            auc_score: None,
            feature_count: fallback.features.len(),
            approach: Approach::Fallback.as_str().to_string(),
            run_timestamp: None,
            mixed_runs: false,
            load_strategy: strategy.to_string(),
            fallback_reason: Some(reason.to_string()),
        };

        Self {
            model: fallback.model,
            scaler: Some(fallback.scaler),
            features: fallback.features,
            info,
        }
    }

    fn load(config: &PredictorConfig) -> Self {
        match load_artifact(&config.artifacts_dir, config.load_strategy) {
            LoadResult::Loaded(artifact) => Self::from_artifact(artifact, config.load_strategy),
            LoadResult::Fallback(reason) => {
                log::warn!(
                    "[Predictor] Using fallback model ({}) for {}",
                    reason,
                    config.artifacts_dir.display()
                );
                Self::fallback(&reason, config.load_strategy)
            }
        }
    }

    /// Score one row; failures become an "Unable to Predict" result
    fn score(&self, index: usize, record: &StudentRecord) -> PredictionResult {
        let resolved = resolve_base(record);
        let identity = resolved.identity.clone();
        let base = resolved.base;
        let known = (base.grade_level, base.current_gpa, base.attendance_rate);

        let scored = reconstruct_resolved(resolved, &self.features, self.scaler.as_ref())
            .map_err(RowError::from)
            .and_then(|rec| {
                let success = self.model.predict_proba(rec.vector.as_slice());
                if success.is_finite() && (0.0..=1.0).contains(&success) {
                    Ok(success)
                } else {
                    Err(RowError::InvalidProbability(success))
                }
            });

        let success = match scored {
            Ok(p) => p,
            Err(e) => {
                log::warn!("[Predictor] Row {} failed: {}", index, e);
                return PredictionResult::unable(index, Some(&identity), Some(known), e.to_string());
            }
        };

        let risk = (1.0 - success).clamp(0.0, 1.0);
        let (risk_category, risk_level) = categorize(risk);
        let risk_factors = active_risk_factors(&base);
        let interventions = recommend(&risk_factors, risk_level);
        let (student_id, name) = result::display_identity(index, Some(&identity));

        PredictionResult {
            student_id,
            name,
            grade_level: known.0,
            current_gpa: known.1,
            attendance_rate: known.2,
            risk_probability: risk,
            risk_category,
            risk_level,
            confidence: confidence(risk),
            model_type: self.info.model_type.clone(),
            risk_factors,
            interventions,
            error: None,
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Row boundary: a panic inside one row never escapes the batch
fn score_guarded(active: &ActiveModel, index: usize, record: &StudentRecord) -> PredictionResult {
    match panic::catch_unwind(AssertUnwindSafe(|| active.score(index, record))) {
        Ok(result) => result,
        Err(payload) => {
            let error = RowError::Panic(panic_message(payload));
            log::warn!("[Predictor] Row {} failed: {}", index, error);
            PredictionResult::unable(index, None, None, error.to_string())
        }
    }
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct PredictorService {
    config: PredictorConfig,
    active: RwLock<Arc<ActiveModel>>,
}

impl PredictorService {
    /// Scan the artifact directory once and load (or fall back)
    pub fn new(config: PredictorConfig) -> Self {
        let active = ActiveModel::load(&config);
        log::info!(
            "[Predictor] Ready: {} ({} features, strategy={})",
            active.info.model_type,
            active.info.feature_count,
            active.info.load_strategy
        );

        Self {
            config,
            active: RwLock::new(Arc::new(active)),
        }
    }

    /// Serve an in-memory artifact (no directory scan)
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        let config = PredictorConfig::new(std::path::PathBuf::new());
        let active = ActiveModel::from_artifact(artifact, config.load_strategy);
        Self {
            config,
            active: RwLock::new(Arc::new(active)),
        }
    }

    /// Rescan the directory and swap the active model
    pub fn reload(&self) -> ModelInfo {
        let active = Arc::new(ActiveModel::load(&self.config));
        let info = active.info.clone();
        *self.active.write() = active;
        log::info!("[Predictor] Reloaded: {}", info.model_type);
        info
    }

    fn snapshot(&self) -> Arc<ActiveModel> {
        Arc::clone(&self.active.read())
    }

    /// One result per row, in input order
    pub fn predict(&self, rows: &[StudentRecord]) -> Vec<PredictionResult> {
        if rows.is_empty() {
            return Vec::new();
        }
        let active = self.snapshot();
        rows.par_iter()
            .enumerate()
            .map(|(index, record)| score_guarded(&active, index, record))
            .collect()
    }

    /// Like `predict`, for rows that may have failed to parse upstream.
    /// A parse error becomes an "Unable to Predict" result at its position.
    pub fn predict_parsed(&self, rows: &[Result<StudentRecord, String>]) -> Vec<PredictionResult> {
        if rows.is_empty() {
            return Vec::new();
        }
        let active = self.snapshot();
        rows.par_iter()
            .enumerate()
            .map(|(index, row)| match row {
                Ok(record) => score_guarded(&active, index, record),
                Err(error) => {
                    log::warn!("[Predictor] Row {} unreadable: {}", index, error);
                    PredictionResult::unable(index, None, None, error.clone())
                }
            })
            .collect()
    }

    pub fn predict_one(&self, row: &StudentRecord) -> PredictionResult {
        score_guarded(&self.snapshot(), 0, row)
    }

    pub fn get_model_info(&self) -> ModelInfo {
        self.snapshot().info.clone()
    }

    pub fn is_fallback(&self) -> bool {
        self.snapshot().info.model_type == FALLBACK_MODEL_TYPE
    }
}
