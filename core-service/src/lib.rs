//! Student Risk Core
//!
//! Trains a stacking ensemble on archetype-driven synthetic (or recorded)
//! students and serves fail-soft risk predictions for arbitrary tabular rows.

pub mod constants;
pub mod logic;

pub use logic::artifacts::{load_artifact, save_artifact, FallbackReason, LoadResult, LoadStrategy, ModelArtifact};
pub use logic::config::{PipelineConfig, PredictorConfig, TrainingConfig};
pub use logic::features::{engineer, reconstruct, FeatureList, StudentRecord};
pub use logic::predictor::{summarize, ModelInfo, PredictionResult, PredictorService, RiskCategory, RiskLevel};
pub use logic::training::{train, TrainingError, TrainingOutcome, TrainingSource};
