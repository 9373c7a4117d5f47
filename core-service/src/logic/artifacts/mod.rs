//! Artifact Store
//!
//! Write-once, read-many persistence of training runs: model, robust
//! scaler, ordered feature list and metadata, all keyed by one run
//! timestamp. Loading returns a tagged `LoadResult` instead of an error so
//! the predictor can always fall back.

pub mod loader;
pub mod metadata;
pub mod store;

#[cfg(test)]
mod tests;

pub use loader::{load_artifact, FallbackReason, LoadResult, LoadStrategy};
pub use metadata::{ArtifactMetadata, ArtifactOrigin, ModelArtifact};
pub use store::{save_artifact, scan_runs, ArtifactKind, RunFiles};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
