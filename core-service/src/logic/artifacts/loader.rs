//! Artifact loading.
//!
//! Two strategies:
//! - `SharedRun` (default): newest run whose required files are all present;
//!   every file comes from that one run.
//! - `LatestPerType`: most recently modified file of each kind, chosen
//!   independently. Kept for directories written by older tooling; when the
//!   picks span runs the result is flagged `mixed_runs`.
//!
//! Every failure becomes a `FallbackReason`; nothing here panics or returns
//! an error to the predictor.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use super::metadata::{ArtifactMetadata, ArtifactOrigin, ModelArtifact};
use super::store::{scan_runs, sha256_hex, ArtifactFile, ArtifactKind, RunFiles};
use crate::logic::features::layout::{unknown_features, validate_layout};
use crate::logic::features::FeatureList;
use crate::logic::model::{RiskModel, RobustScaler};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadStrategy {
    #[default]
    SharedRun,
    LatestPerType,
}

impl FromStr for LoadStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "shared-run" => Ok(Self::SharedRun),
            "latest-per-type" => Ok(Self::LatestPerType),
            other => Err(format!("unknown load strategy '{}'", other)),
        }
    }
}

impl fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedRun => f.write_str("shared-run"),
            Self::LatestPerType => f.write_str("latest-per-type"),
        }
    }
}

/// Why the predictor is running on the fallback model
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// No artifact files at all
    NoArtifacts,
    /// Files exist but no run has model + features + metadata
    Incomplete,
    /// A file could not be read, parsed or verified
    Corrupt(String),
    /// Feature list names a feature the current layout does not produce
    LayoutMismatch { unknown: Vec<String> },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoArtifacts => f.write_str("no artifacts found"),
            Self::Incomplete => f.write_str("no complete artifact run"),
            Self::Corrupt(detail) => write!(f, "corrupt artifact: {}", detail),
            Self::LayoutMismatch { unknown } => {
                write!(f, "feature list has {} unknown features: {:?}", unknown.len(), unknown)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    Loaded(ModelArtifact),
    Fallback(FallbackReason),
}

impl LoadResult {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

// ============================================================================
// FILE READING
// ============================================================================

fn read_json<T: DeserializeOwned>(file: &ArtifactFile) -> Result<(T, Vec<u8>), FallbackReason> {
    let bytes = fs::read(&file.path)
        .map_err(|e| FallbackReason::Corrupt(format!("{}: {}", file.path.display(), e)))?;
    let value = serde_json::from_slice(&bytes)
        .map_err(|e| FallbackReason::Corrupt(format!("{}: {}", file.path.display(), e)))?;
    Ok((value, bytes))
}

/// The files one load will read, by kind
struct Selection {
    model: ArtifactFile,
    scaler: Option<ArtifactFile>,
    features: ArtifactFile,
    metadata: ArtifactFile,
    mixed_runs: bool,
}

fn select_shared_run(runs: &BTreeMap<String, RunFiles>) -> Option<Selection> {
    for (ts, files) in runs.iter().rev() {
        match (&files.model, &files.features, &files.metadata) {
            (Some(model), Some(features), Some(metadata)) => {
                return Some(Selection {
                    model: model.clone(),
                    scaler: files.scaler.clone(),
                    features: features.clone(),
                    metadata: metadata.clone(),
                    mixed_runs: false,
                });
            }
            _ => log::warn!("[Artifacts] Skipping incomplete run {}", ts),
        }
    }
    None
}

fn select_latest_per_type(runs: &BTreeMap<String, RunFiles>) -> Option<Selection> {
    let latest = |kind: ArtifactKind| -> Option<ArtifactFile> {
        runs.values()
            .filter_map(|files| files.get(kind))
            .max_by(|a, b| {
                a.modified
                    .cmp(&b.modified)
                    .then_with(|| a.run_timestamp.cmp(&b.run_timestamp))
            })
            .cloned()
    };

    let model = latest(ArtifactKind::Model)?;
    let features = latest(ArtifactKind::Features)?;
    let metadata = latest(ArtifactKind::Metadata)?;
    let scaler = latest(ArtifactKind::Scaler);

    let mut stamps = vec![&model.run_timestamp, &features.run_timestamp, &metadata.run_timestamp];
    if let Some(s) = &scaler {
        stamps.push(&s.run_timestamp);
    }
    let mixed_runs = stamps.iter().any(|ts| *ts != &model.run_timestamp);

    Some(Selection {
        model,
        scaler,
        features,
        metadata,
        mixed_runs,
    })
}

// ============================================================================
// LOAD
// ============================================================================

pub fn load_artifact(dir: &Path, strategy: LoadStrategy) -> LoadResult {
    let runs = match scan_runs(dir) {
        Ok(runs) => runs,
        Err(e) => return LoadResult::Fallback(FallbackReason::Corrupt(e.to_string())),
    };
    if runs.values().all(RunFiles::is_empty) {
        return LoadResult::Fallback(FallbackReason::NoArtifacts);
    }

    let selection = match strategy {
        LoadStrategy::SharedRun => select_shared_run(&runs),
        LoadStrategy::LatestPerType => select_latest_per_type(&runs),
    };
    let Some(selection) = selection else {
        return LoadResult::Fallback(FallbackReason::Incomplete);
    };

    match read_selection(selection, strategy) {
        Ok(artifact) => LoadResult::Loaded(artifact),
        Err(reason) => LoadResult::Fallback(reason),
    }
}

fn read_selection(selection: Selection, strategy: LoadStrategy) -> Result<ModelArtifact, FallbackReason> {
    if selection.mixed_runs {
        log::warn!(
            "[Artifacts] Latest files span runs (model {}, features {}, metadata {}, scaler {})",
            selection.model.run_timestamp,
            selection.features.run_timestamp,
            selection.metadata.run_timestamp,
            selection
                .scaler
                .as_ref()
                .map(|s| s.run_timestamp.as_str())
                .unwrap_or("none")
        );
    }

    let (metadata, _) = read_json::<ArtifactMetadata>(&selection.metadata)?;
    let (model, model_bytes) = read_json::<RiskModel>(&selection.model)?;
    let (features, _) = read_json::<FeatureList>(&selection.features)?;

    // Checksum only binds files of the same run
    if selection.model.run_timestamp == selection.metadata.run_timestamp {
        let actual = sha256_hex(&model_bytes);
        if actual != metadata.model_sha256 {
            return Err(FallbackReason::Corrupt(format!(
                "model checksum mismatch for run {}",
                selection.model.run_timestamp
            )));
        }
    }

    let scaler = match (&selection.scaler, strategy) {
        (Some(file), _) => Some(read_json::<RobustScaler>(file)?.0),
        (None, LoadStrategy::SharedRun) if metadata.has_scaler => {
            return Err(FallbackReason::Corrupt(format!(
                "run {} declares a scaler but none was found",
                metadata.run_timestamp
            )));
        }
        (None, _) => None,
    };

    if features.is_empty() {
        return Err(FallbackReason::Corrupt("empty feature list".to_string()));
    }
    let unknown = unknown_features(features.names().iter().map(String::as_str));
    if !unknown.is_empty() {
        return Err(FallbackReason::LayoutMismatch { unknown });
    }
    if let Err(e) = validate_layout(metadata.feature_version, metadata.layout_hash) {
        log::warn!("[Artifacts] {} (feature names still resolve, continuing)", e);
    }

    if let Some(scaler) = &scaler {
        if scaler.len() != features.len() {
            return Err(FallbackReason::Corrupt(format!(
                "scaler has {} columns, feature list has {}",
                scaler.len(),
                features.len()
            )));
        }
    }

    log::info!(
        "[Artifacts] Loaded run {} ({}, auc={:.4}, {} features, strategy={})",
        selection.model.run_timestamp,
        metadata.model_type,
        metadata.auc,
        features.len(),
        strategy
    );

    Ok(ModelArtifact {
        model,
        scaler,
        features,
        metadata,
        origin: Some(ArtifactOrigin {
            run_timestamp: selection.model.run_timestamp,
            mixed_runs: selection.mixed_runs,
        }),
    })
}
