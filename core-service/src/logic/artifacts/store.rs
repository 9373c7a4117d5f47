//! Artifact files on disk.
//!
//! One training run writes four files sharing a run timestamp suffix:
//! `risk_model_{ts}.json`, `risk_scaler_{ts}.json`, `risk_features_{ts}.json`
//! and `risk_metadata_{ts}.json`. Files are created with `create_new` and
//! never rewritten; metadata is written last, so a run without metadata is
//! an interrupted run.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};

use super::metadata::ModelArtifact;
use super::ArtifactError;

/// Run timestamp format (sortable)
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    Model,
    Scaler,
    Features,
    Metadata,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [Self::Model, Self::Scaler, Self::Features, Self::Metadata];

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Model => "risk_model_",
            Self::Scaler => "risk_scaler_",
            Self::Features => "risk_features_",
            Self::Metadata => "risk_metadata_",
        }
    }

    pub fn file_name(&self, run_timestamp: &str) -> String {
        format!("{}{}.json", self.prefix(), run_timestamp)
    }

    /// Split an artifact file name into kind and run timestamp
    pub fn parse(file_name: &str) -> Option<(ArtifactKind, String)> {
        let stem = file_name.strip_suffix(".json")?;
        Self::ALL.iter().find_map(|kind| {
            stem.strip_prefix(kind.prefix())
                .filter(|ts| !ts.is_empty())
                .map(|ts| (*kind, ts.to_string()))
        })
    }
}

/// One artifact file found by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub path: PathBuf,
    pub run_timestamp: String,
    pub modified: SystemTime,
}

/// Files of one run, by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFiles {
    pub model: Option<ArtifactFile>,
    pub scaler: Option<ArtifactFile>,
    pub features: Option<ArtifactFile>,
    pub metadata: Option<ArtifactFile>,
}

impl RunFiles {
    pub fn get(&self, kind: ArtifactKind) -> Option<&ArtifactFile> {
        match kind {
            ArtifactKind::Model => self.model.as_ref(),
            ArtifactKind::Scaler => self.scaler.as_ref(),
            ArtifactKind::Features => self.features.as_ref(),
            ArtifactKind::Metadata => self.metadata.as_ref(),
        }
    }

    fn slot(&mut self, kind: ArtifactKind) -> &mut Option<ArtifactFile> {
        match kind {
            ArtifactKind::Model => &mut self.model,
            ArtifactKind::Scaler => &mut self.scaler,
            ArtifactKind::Features => &mut self.features,
            ArtifactKind::Metadata => &mut self.metadata,
        }
    }

    /// Model, feature list and metadata present (scaler is optional)
    pub fn has_required(&self) -> bool {
        self.model.is_some() && self.features.is_some() && self.metadata.is_some()
    }

    pub fn is_empty(&self) -> bool {
        ArtifactKind::ALL.iter().all(|k| self.get(*k).is_none())
    }
}

// ============================================================================
// SCAN
// ============================================================================

/// Every artifact file in `dir`, grouped by run timestamp (ascending).
/// A missing directory scans as empty.
pub fn scan_runs(dir: &Path) -> Result<BTreeMap<String, RunFiles>, ArtifactError> {
    let mut runs: BTreeMap<String, RunFiles> = BTreeMap::new();
    if !dir.exists() {
        return Ok(runs);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some((kind, run_timestamp)) = name.to_str().and_then(ArtifactKind::parse) else {
            continue;
        };
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let file = ArtifactFile {
            path: entry.path(),
            run_timestamp: run_timestamp.clone(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        };
        *runs.entry(run_timestamp).or_default().slot(kind) = Some(file);
    }

    Ok(runs)
}

// ============================================================================
// SAVE
// ============================================================================

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn write_new(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

/// Pick a run timestamp no existing file uses
fn fresh_run_timestamp(dir: &Path) -> String {
    let now = Utc::now();
    let mut offset = 0;
    loop {
        let ts = (now + Duration::milliseconds(offset))
            .format(RUN_TIMESTAMP_FORMAT)
            .to_string();
        let taken = ArtifactKind::ALL
            .iter()
            .any(|kind| dir.join(kind.file_name(&ts)).exists());
        if !taken {
            return ts;
        }
        offset += 1;
    }
}

/// Persist one run. Returns the artifact with timestamp and checksum filled.
pub fn save_artifact(dir: &Path, artifact: ModelArtifact) -> Result<ModelArtifact, ArtifactError> {
    fs::create_dir_all(dir)?;

    let mut artifact = artifact;
    let ts = fresh_run_timestamp(dir);

    let model_bytes = serde_json::to_vec(&artifact.model)?;
    artifact.metadata.run_timestamp = ts.clone();
    artifact.metadata.model_sha256 = sha256_hex(&model_bytes);
    artifact.metadata.has_scaler = artifact.scaler.is_some();
    artifact.metadata.feature_count = artifact.features.len();

    write_new(&dir.join(ArtifactKind::Model.file_name(&ts)), &model_bytes)?;
    if let Some(scaler) = &artifact.scaler {
        write_new(
            &dir.join(ArtifactKind::Scaler.file_name(&ts)),
            &serde_json::to_vec(scaler)?,
        )?;
    }
    write_new(
        &dir.join(ArtifactKind::Features.file_name(&ts)),
        &serde_json::to_vec_pretty(&artifact.features)?,
    )?;
    write_new(
        &dir.join(ArtifactKind::Metadata.file_name(&ts)),
        &serde_json::to_vec_pretty(&artifact.metadata)?,
    )?;

    log::info!(
        "[Artifacts] Saved run {} ({}, auc={:.4}, {} features) to {}",
        ts,
        artifact.metadata.model_type,
        artifact.metadata.auc,
        artifact.features.len(),
        dir.display()
    );
    Ok(artifact)
}
