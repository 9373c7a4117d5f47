//! Fallback model used when no valid artifact can be loaded.
//!
//! L2 logistic regression over the full engineered layout, fit on a small
//! seeded synthetic sample. Same seed, same model.

use crate::constants::{FALLBACK_SAMPLES, FALLBACK_SEED};
use crate::logic::dataset::DatasetRecord;
use crate::logic::features::{engineered_layout, FeatureList};
use crate::logic::model::linear::{LogisticParams, LogisticRegression};
use crate::logic::model::{RiskModel, RobustScaler};
use crate::logic::synthetic::generate;
use crate::logic::training::build_matrix;

pub struct FallbackModel {
    pub model: RiskModel,
    pub scaler: RobustScaler,
    pub features: FeatureList,
}

pub fn fit_fallback() -> FallbackModel {
    let records: Vec<DatasetRecord> = generate(FALLBACK_SAMPLES, FALLBACK_SEED)
        .iter()
        .map(DatasetRecord::from_synthetic)
        .collect();
    let (x, y, _) = build_matrix(&records);

    let scaler = RobustScaler::fit(x.view());
    let scaled = scaler.transform(x.view());
    let model = LogisticRegression::fit(scaled.view(), &y, &LogisticParams::default());

    log::debug!("[Fallback] Fit logistic regression on {} synthetic rows", y.len());

    FallbackModel {
        model: RiskModel::LogisticRegression(model),
        scaler,
        features: FeatureList::new(engineered_layout().iter().map(|s| s.to_string()).collect()),
    }
}
