use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use tempfile::tempdir;

use super::*;
use crate::logic::features::layout::{layout_hash, FEATURE_VERSION};
use crate::logic::features::FeatureList;
use crate::logic::model::linear::LogisticRegression;
use crate::logic::model::{RiskModel, RobustScaler};
use crate::logic::training::{Approach, StackingOutcome};

fn artifact(features: &[&str], bias: f64) -> ModelArtifact {
    let names: Vec<String> = features.iter().map(|s| s.to_string()).collect();
    let n = names.len();
    ModelArtifact {
        model: RiskModel::LogisticRegression(LogisticRegression {
            weights: vec![1.0; n],
            bias,
        }),
        scaler: Some(RobustScaler::identity(n)),
        features: FeatureList::new(names),
        metadata: ArtifactMetadata {
            run_id: "test-run".to_string(),
            run_timestamp: String::new(),
            model_type: "logistic_regression".to_string(),
            approach: Approach::SingleLearner,
            auc: 0.81,
            f1: 0.7,
            accuracy: 0.75,
            feature_count: n,
            sample_count: 100,
            train_samples: 80,
            test_samples: 20,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            has_scaler: true,
            model_sha256: String::new(),
            stacking: StackingOutcome::Skipped {
                qualifying: 1,
                required: 3,
            },
            learner_scores: Vec::new(),
            created_at: 0,
        },
        origin: None,
    }
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn file_of(dir: &Path, kind: ArtifactKind, ts: &str) -> std::path::PathBuf {
    dir.join(kind.file_name(ts))
}

#[test]
fn test_file_names_round_trip_through_parse() {
    let ts = "20260101_120000_123";
    for kind in ArtifactKind::ALL {
        assert_eq!(ArtifactKind::parse(&kind.file_name(ts)), Some((kind, ts.to_string())));
    }
    assert_eq!(ArtifactKind::parse("risk_model_.json"), None);
    assert_eq!(ArtifactKind::parse("notes.txt"), None);
}

#[test]
fn test_load_strategy_parsing() {
    assert_eq!("shared-run".parse::<LoadStrategy>(), Ok(LoadStrategy::SharedRun));
    assert_eq!("LATEST_PER_TYPE".parse::<LoadStrategy>(), Ok(LoadStrategy::LatestPerType));
    assert!("newest".parse::<LoadStrategy>().is_err());
    assert_eq!(LoadStrategy::default(), LoadStrategy::SharedRun);
}

#[test]
fn test_save_then_load_shared_run() {
    let dir = tempdir().unwrap();
    let saved = save_artifact(dir.path(), artifact(&["current_gpa", "attendance_rate"], 0.5)).unwrap();

    let ts = saved.metadata.run_timestamp.clone();
    assert!(!ts.is_empty());
    assert_eq!(saved.metadata.model_sha256.len(), 64);
    for kind in ArtifactKind::ALL {
        assert!(file_of(dir.path(), kind, &ts).exists());
    }
    let runs = scan_runs(dir.path()).unwrap();
    assert!(runs[&ts].has_required());
    assert!(load_artifact(dir.path(), LoadStrategy::SharedRun).is_loaded());

    match load_artifact(dir.path(), LoadStrategy::SharedRun) {
        LoadResult::Loaded(loaded) => {
            assert_eq!(loaded.model, saved.model);
            assert_eq!(loaded.scaler, saved.scaler);
            assert_eq!(loaded.features, saved.features);
            assert_eq!(loaded.metadata, saved.metadata);
            let origin = loaded.origin.unwrap();
            assert_eq!(origin.run_timestamp, ts);
            assert!(!origin.mixed_runs);
        }
        other => panic!("expected loaded, got {:?}", other),
    }
}

#[test]
fn test_runs_never_overwrite_each_other() {
    let dir = tempdir().unwrap();
    let a = save_artifact(dir.path(), artifact(&["current_gpa"], 0.0)).unwrap();
    let b = save_artifact(dir.path(), artifact(&["current_gpa"], 1.0)).unwrap();
    assert_ne!(a.metadata.run_timestamp, b.metadata.run_timestamp);
    assert_eq!(scan_runs(dir.path()).unwrap().len(), 2);
}

#[test]
fn test_empty_or_missing_dir_is_no_artifacts() {
    let dir = tempdir().unwrap();
    assert_eq!(
        load_artifact(dir.path(), LoadStrategy::SharedRun),
        LoadResult::Fallback(FallbackReason::NoArtifacts)
    );
    assert_eq!(
        load_artifact(&dir.path().join("missing"), LoadStrategy::LatestPerType),
        LoadResult::Fallback(FallbackReason::NoArtifacts)
    );
}

#[test]
fn test_run_without_metadata_is_incomplete() {
    let dir = tempdir().unwrap();
    let saved = save_artifact(dir.path(), artifact(&["current_gpa"], 0.0)).unwrap();
    fs::remove_file(file_of(dir.path(), ArtifactKind::Metadata, &saved.metadata.run_timestamp)).unwrap();

    for strategy in [LoadStrategy::SharedRun, LoadStrategy::LatestPerType] {
        assert_eq!(
            load_artifact(dir.path(), strategy),
            LoadResult::Fallback(FallbackReason::Incomplete)
        );
    }
}

#[test]
fn test_newer_interrupted_run_is_skipped() {
    let dir = tempdir().unwrap();
    let complete = save_artifact(dir.path(), artifact(&["current_gpa"], 0.0)).unwrap();

    // Interrupted later run: model written, metadata never reached
    let later = save_artifact(dir.path(), artifact(&["attendance_rate"], 2.0)).unwrap();
    fs::remove_file(file_of(dir.path(), ArtifactKind::Metadata, &later.metadata.run_timestamp)).unwrap();

    match load_artifact(dir.path(), LoadStrategy::SharedRun) {
        LoadResult::Loaded(loaded) => {
            assert_eq!(loaded.metadata.run_timestamp, complete.metadata.run_timestamp);
            assert_eq!(loaded.model, complete.model);
        }
        other => panic!("expected loaded, got {:?}", other),
    }
}

#[test]
fn test_tampered_model_is_corrupt() {
    let dir = tempdir().unwrap();
    let saved = save_artifact(dir.path(), artifact(&["current_gpa"], 0.0)).unwrap();
    let model_path = file_of(dir.path(), ArtifactKind::Model, &saved.metadata.run_timestamp);

    let tampered = RiskModel::LogisticRegression(LogisticRegression {
        weights: vec![-5.0],
        bias: 0.0,
    });
    fs::write(&model_path, serde_json::to_vec(&tampered).unwrap()).unwrap();

    match load_artifact(dir.path(), LoadStrategy::SharedRun) {
        LoadResult::Fallback(FallbackReason::Corrupt(detail)) => assert!(detail.contains("checksum")),
        other => panic!("expected corrupt, got {:?}", other),
    }
}

#[test]
fn test_unparseable_file_is_corrupt() {
    let dir = tempdir().unwrap();
    let saved = save_artifact(dir.path(), artifact(&["current_gpa"], 0.0)).unwrap();
    fs::write(
        file_of(dir.path(), ArtifactKind::Features, &saved.metadata.run_timestamp),
        b"{ not json",
    )
    .unwrap();

    assert!(matches!(
        load_artifact(dir.path(), LoadStrategy::SharedRun),
        LoadResult::Fallback(FallbackReason::Corrupt(_))
    ));
}

#[test]
fn test_unknown_feature_is_layout_mismatch() {
    let dir = tempdir().unwrap();
    save_artifact(dir.path(), artifact(&["current_gpa", "shoe_size"], 0.0)).unwrap();

    assert_eq!(
        load_artifact(dir.path(), LoadStrategy::SharedRun),
        LoadResult::Fallback(FallbackReason::LayoutMismatch {
            unknown: vec!["shoe_size".to_string()]
        })
    );
}

#[test]
fn test_missing_declared_scaler_is_corrupt() {
    let dir = tempdir().unwrap();
    let saved = save_artifact(dir.path(), artifact(&["current_gpa"], 0.0)).unwrap();
    fs::remove_file(file_of(dir.path(), ArtifactKind::Scaler, &saved.metadata.run_timestamp)).unwrap();

    assert!(matches!(
        load_artifact(dir.path(), LoadStrategy::SharedRun),
        LoadResult::Fallback(FallbackReason::Corrupt(_))
    ));
}

#[test]
fn test_latest_per_type_matched_run() {
    let dir = tempdir().unwrap();
    save_artifact(dir.path(), artifact(&["current_gpa"], 0.0)).unwrap();
    let newest = save_artifact(dir.path(), artifact(&["current_gpa", "attendance_rate"], 1.0)).unwrap();

    let now = SystemTime::now();
    for kind in ArtifactKind::ALL {
        set_mtime(&file_of(dir.path(), kind, &newest.metadata.run_timestamp), now);
    }

    match load_artifact(dir.path(), LoadStrategy::LatestPerType) {
        LoadResult::Loaded(loaded) => {
            let origin = loaded.origin.unwrap();
            assert!(!origin.mixed_runs);
            assert_eq!(origin.run_timestamp, newest.metadata.run_timestamp);
            assert_eq!(loaded.features, newest.features);
        }
        other => panic!("expected loaded, got {:?}", other),
    }
}

#[test]
fn test_latest_per_type_mixes_runs_where_shared_run_does_not() {
    let dir = tempdir().unwrap();
    let old = save_artifact(dir.path(), artifact(&["current_gpa", "attendance_rate"], 0.0)).unwrap();
    let new = save_artifact(
        dir.path(),
        artifact(&["current_gpa", "attendance_rate", "discipline_incidents"], 1.0),
    )
    .unwrap();
    let old_ts = &old.metadata.run_timestamp;
    let new_ts = &new.metadata.run_timestamp;

    // The old feature list and scaler were touched after the new run
    let base = SystemTime::now();
    for kind in ArtifactKind::ALL {
        set_mtime(&file_of(dir.path(), kind, new_ts), base);
    }
    let later = base + Duration::from_secs(60);
    set_mtime(&file_of(dir.path(), ArtifactKind::Features, old_ts), later);
    set_mtime(&file_of(dir.path(), ArtifactKind::Scaler, old_ts), later);

    match load_artifact(dir.path(), LoadStrategy::LatestPerType) {
        LoadResult::Loaded(loaded) => {
            let origin = loaded.origin.unwrap();
            assert!(origin.mixed_runs);
            assert_eq!(origin.run_timestamp, *new_ts);
            // Three-weight model paired with a two-name feature list
            assert_eq!(loaded.features, old.features);
            assert_eq!(loaded.model, new.model);
        }
        other => panic!("expected loaded, got {:?}", other),
    }

    match load_artifact(dir.path(), LoadStrategy::SharedRun) {
        LoadResult::Loaded(loaded) => {
            assert!(!loaded.origin.unwrap().mixed_runs);
            assert_eq!(loaded.features, new.features);
            assert_eq!(loaded.model, new.model);
            assert_eq!(loaded.scaler, new.scaler);
        }
        other => panic!("expected loaded, got {:?}", other),
    }
}
