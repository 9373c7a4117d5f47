//! Stacking fit: out-of-fold base predictions feed a logistic meta-learner.
//!
//! Every (fold, learner) pair is an independent fit and runs on the rayon
//! pool. The meta-learner fit waits for the full out-of-fold matrix.

use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;

use super::learners::LearnerKind;
use super::split::{complement, stratified_kfold};
use crate::logic::model::linear::{LogisticParams, LogisticRegression};
use crate::logic::model::{Classifier, NamedModel, RiskModel, StackingEnsemble};

/// Out-of-fold success probabilities, rows x learners
pub fn out_of_fold_predictions(
    x: ArrayView2<'_, f64>,
    y: &[f64],
    learners: &[LearnerKind],
    folds: usize,
    seed: u64,
    fast: bool,
) -> Array2<f64> {
    let n = x.nrows();
    let fold_sets = stratified_kfold(y, folds, seed);

    let jobs: Vec<(usize, usize)> = (0..fold_sets.len())
        .flat_map(|f| (0..learners.len()).map(move |l| (f, l)))
        .collect();

    let results: Vec<(usize, usize, Vec<f64>)> = jobs
        .into_par_iter()
        .map(|(f, l)| {
            let held_out = &fold_sets[f];
            let train = complement(n, held_out);
            let x_train = x.select(Axis(0), &train);
            let y_train: Vec<f64> = train.iter().map(|&i| y[i]).collect();
            let x_held = x.select(Axis(0), held_out);

            let kind = learners[l];
            let model = kind.fit(x_train.view(), &y_train, kind.seed(seed) ^ (f as u64 + 1), fast);
            (f, l, model.predict_proba_batch(x_held.view()))
        })
        .collect();

    let mut oof = Array2::zeros((n, learners.len()));
    for (f, l, predictions) in results {
        for (&row, p) in fold_sets[f].iter().zip(predictions) {
            oof[[row, l]] = p;
        }
    }
    oof
}

/// Build the ensemble from learners already fit on the full training rows
pub fn fit_stacking(
    x: ArrayView2<'_, f64>,
    y: &[f64],
    fitted: Vec<(LearnerKind, RiskModel)>,
    folds: usize,
    seed: u64,
    fast: bool,
) -> StackingEnsemble {
    let kinds: Vec<LearnerKind> = fitted.iter().map(|(kind, _)| *kind).collect();
    log::info!(
        "[Stacking] {}-fold out-of-fold predictions for {} learners",
        folds,
        kinds.len()
    );

    let oof = out_of_fold_predictions(x, y, &kinds, folds, seed, fast);
    let meta = LogisticRegression::fit(oof.view(), y, &LogisticParams::default());

    StackingEnsemble {
        learners: fitted
            .into_iter()
            .map(|(kind, model)| NamedModel {
                name: kind.name().to_string(),
                model,
            })
            .collect(),
        meta,
    }
}
