//! Features Module - Feature Engineering & Reconstruction
//!
//! Base features, the pure `engineer()` function, the versioned engineered
//! layout, and the inference-time reconstructor that maps raw rows onto a
//! trained model's feature list.

pub mod aliases;
pub mod base;
pub mod engineer;
pub mod layout;
pub mod reconstruct;
pub mod record;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use base::{BaseFeatures, FeatureKind, BASE_FEATURES, BASE_FEATURE_COUNT};
pub use engineer::{engineer, EngineeredFeatures, DERIVED_FEATURES};
pub use layout::{engineered_layout, layout_hash, FEATURE_COUNT, FEATURE_VERSION};
pub use reconstruct::{
    reconstruct, reconstruct_resolved, resolve_base, Reconstruction, ResolvedBase, StudentIdentity, TraitEstimate,
};
pub use record::StudentRecord;
pub use vector::{FeatureList, FeatureVector};

/// Per-row reconstruction failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconstructError {
    #[error("Non-finite value for feature '{feature}': {value}")]
    NonFinite { feature: String, value: f64 },

    #[error("Scaler expects {expected} features, vector has {actual}")]
    ScalerMismatch { expected: usize, actual: usize },
}
