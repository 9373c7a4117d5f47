//! Ensemble Trainer
//!
//! Offline batch training run:
//! rows -> reconstruction -> engineering -> stratified split -> selection ->
//! robust scaling -> parallel base learners -> optional stacking -> best model.
//!
//! Training rows go through the same alias / default path as inference rows,
//! so a model never sees a feature the predictor cannot rebuild.

pub mod learners;
pub mod report;
pub mod selection;
pub mod split;
pub mod stacking;


use std::path::PathBuf;

use ndarray::{Array2, Axis};
use rayon::prelude::*;

pub use learners::LearnerKind;
pub use report::{Approach, LearnerScore, StackingOutcome, TrainingReport};

use crate::logic::config::TrainingConfig;
use crate::logic::dataset::{load_records, DatasetError, DatasetRecord};
use crate::logic::features::{engineer, engineered_layout, resolve_base, FeatureList, StudentRecord};
use crate::logic::model::{compute_validation_metrics, Classifier, RiskModel, RobustScaler, ValidationMetrics};
use crate::logic::synthetic::generate;

/// Rows needed before a split is attempted
pub const MIN_TRAINING_ROWS: usize = 20;

/// Where labeled rows come from
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingSource {
    /// `config.samples` archetype students seeded by `config.seed`
    Synthetic,
    /// JSONL file or directory of `DatasetRecord`s
    Dataset(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Not enough usable rows: {rows} (need {required})")]
    InsufficientData { rows: usize, required: usize },

    #[error("Training labels contain a single class")]
    SingleClass,

    #[error("No base learners configured")]
    NoLearners,
}

/// Everything a training run produces
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: RiskModel,
    pub scaler: RobustScaler,
    pub features: FeatureList,
    pub metrics: ValidationMetrics,
    pub report: TrainingReport,
    /// Usable labeled rows (train + test)
    pub sample_count: usize,
}

// ============================================================================
// DATA PREPARATION
// ============================================================================

fn collect_rows(config: &TrainingConfig, source: &TrainingSource) -> Result<Vec<DatasetRecord>, TrainingError> {
    match source {
        TrainingSource::Synthetic => {
            log::info!(
                "[Training] Generating {} synthetic students (seed={})",
                config.samples,
                config.seed
            );
            Ok(generate(config.samples, config.seed)
                .iter()
                .map(DatasetRecord::from_synthetic)
                .collect())
        }
        TrainingSource::Dataset(path) => Ok(load_records(path)?),
    }
}

/// Engineered row in layout order (None when any value is non-finite)
pub fn engineered_row(record: &StudentRecord) -> Option<Vec<f64>> {
    let resolved = resolve_base(record);
    let values = engineer(&resolved.base).values();
    values.iter().all(|v| v.is_finite()).then_some(values)
}

/// Engineered matrix and labels; rows with non-finite features are dropped
pub fn build_matrix(records: &[DatasetRecord]) -> (Array2<f64>, Vec<f64>, usize) {
    let rows: Vec<Option<Vec<f64>>> = records.par_iter().map(|r| engineered_row(&r.features)).collect();

    let width = engineered_layout().len();
    let mut data = Vec::with_capacity(records.len() * width);
    let mut labels = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for (record, row) in records.iter().zip(rows) {
        match row {
            Some(values) => {
                data.extend(values);
                labels.push(if record.is_success() { 1.0 } else { 0.0 });
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!("[Training] Skipped {} rows with non-finite features", skipped);
    }

    let n = labels.len();
    let matrix = Array2::from_shape_vec((n, width), data).unwrap_or_else(|_| Array2::zeros((0, width)));
    (matrix, labels, skipped)
}

// ============================================================================
// TRAINING RUN
// ============================================================================

pub fn train(config: &TrainingConfig, source: &TrainingSource) -> Result<TrainingOutcome, TrainingError> {
    if config.learners.is_empty() {
        return Err(TrainingError::NoLearners);
    }

    let records = collect_rows(config, source)?;
    let (x_all, y_all, skipped_rows) = build_matrix(&records);

    if y_all.len() < MIN_TRAINING_ROWS {
        return Err(TrainingError::InsufficientData {
            rows: y_all.len(),
            required: MIN_TRAINING_ROWS,
        });
    }
    let positives = y_all.iter().filter(|&&y| y == 1.0).count();
    if positives == 0 || positives == y_all.len() {
        return Err(TrainingError::SingleClass);
    }
    log::info!(
        "[Training] {} rows, success rate {:.3}",
        y_all.len(),
        positives as f64 / y_all.len() as f64
    );

    // Split
    let (train_idx, test_idx) = split::stratified_split(&y_all, config.test_ratio, config.seed);
    let y_train: Vec<f64> = train_idx.iter().map(|&i| y_all[i]).collect();
    let y_test: Vec<f64> = test_idx.iter().map(|&i| y_all[i]).collect();
    let x_train_full = x_all.select(Axis(0), &train_idx);

    // Select (training rows only)
    let layout = engineered_layout();
    let selection = selection::select_features(x_train_full.view(), &y_train, layout, config.selection_k);

    // Scale
    let x_train_raw = x_train_full.select(Axis(1), &selection.indices);
    let x_test_raw = x_all.select(Axis(0), &test_idx).select(Axis(1), &selection.indices);
    let scaler = RobustScaler::fit(x_train_raw.view());
    let x_train = scaler.transform(x_train_raw.view());
    let x_test = scaler.transform(x_test_raw.view());

    // Base learners (independent fits)
    let fitted: Vec<(LearnerKind, RiskModel)> = config
        .learners
        .par_iter()
        .map(|kind| (*kind, kind.fit(x_train.view(), &y_train, kind.seed(config.seed), config.fast)))
        .collect();

    let mut learner_scores = Vec::with_capacity(fitted.len());
    for (kind, model) in &fitted {
        let metrics = compute_validation_metrics(&model.predict_proba_batch(x_test.view()), &y_test);
        let qualified = metrics.auc > config.auc_threshold;
        log::info!("[Training] {:<22} {}", kind.name(), metrics);
        learner_scores.push(LearnerScore {
            name: kind.name().to_string(),
            metrics,
            qualified,
        });
    }

    // Best individual learner
    let mut best = 0;
    for (i, score) in learner_scores.iter().enumerate() {
        if score.metrics.auc > learner_scores[best].metrics.auc {
            best = i;
        }
    }
    let best_metrics = learner_scores[best].metrics;

    let qualifying: Vec<(LearnerKind, RiskModel)> = fitted
        .iter()
        .zip(&learner_scores)
        .filter(|(_, score)| score.qualified)
        .map(|(pair, _)| pair.clone())
        .collect();

    let (stacking, stacked) = if qualifying.len() >= config.min_stacking_learners {
        let ensemble = stacking::fit_stacking(
            x_train.view(),
            &y_train,
            qualifying,
            config.stacking_folds,
            config.seed,
            config.fast,
        );
        let model = RiskModel::Stacking(ensemble);
        let metrics = compute_validation_metrics(&model.predict_proba_batch(x_test.view()), &y_test);
        log::info!("[Training] {:<22} {}", model.model_type(), metrics);

        let learners = match &model {
            RiskModel::Stacking(e) => e.learner_names().into_iter().map(String::from).collect(),
            _ => Vec::new(),
        };
        (StackingOutcome::Used { learners, metrics }, Some((model, metrics)))
    } else {
        log::warn!(
            "[Training] Stacking skipped: {} learners above AUC {:.2}, {} required",
            qualifying.len(),
            config.auc_threshold,
            config.min_stacking_learners
        );
        (
            StackingOutcome::Skipped {
                qualifying: qualifying.len(),
                required: config.min_stacking_learners,
            },
            None,
        )
    };

    let (model, metrics, approach) = choose_final((fitted[best].1.clone(), best_metrics), stacked);

    let report = TrainingReport {
        learner_scores,
        stacking,
        approach,
        chosen_model: model.model_type().to_string(),
        chosen_metrics: metrics,
        selected_features: selection.features.names().to_vec(),
        total_features: layout.len(),
        train_samples: train_idx.len(),
        test_samples: test_idx.len(),
        skipped_rows,
    };
    log::info!(
        "[Training] Chosen {} ({}) auc={:.4}",
        report.chosen_model,
        approach.as_str(),
        metrics.auc
    );

    Ok(TrainingOutcome {
        model,
        scaler,
        features: selection.features,
        metrics,
        report,
        sample_count: y_all.len(),
    })
}

/// Final model: highest held-out AUC among stacking and the best base
/// learner. A tie goes to stacking.
fn choose_final(
    best: (RiskModel, ValidationMetrics),
    stacked: Option<(RiskModel, ValidationMetrics)>,
) -> (RiskModel, ValidationMetrics, Approach) {
    match stacked {
        Some((model, metrics)) if metrics.auc >= best.1.auc => (model, metrics, Approach::Stacking),
        _ => (best.0, best.1, Approach::SingleLearner),
    }
}
