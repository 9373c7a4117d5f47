//! Feature Selector
//!
//! Ranks every engineered column twice (ANOVA F-test and binned mutual
//! information against the label) and keeps the union of both top-K sets.
//! The kept names are returned in engineering order, never score order,
//! because that order becomes the persisted feature list.

use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;

use crate::logic::features::FeatureList;
use crate::logic::model::scaler::quantile_sorted;

/// Equal-frequency bins used for mutual information
pub const MI_BINS: usize = 10;

#[derive(Debug, Clone)]
pub struct FeatureSelection {
    /// Column indices into the engineered layout, ascending
    pub indices: Vec<usize>,
    pub features: FeatureList,
    pub f_scores: Vec<f64>,
    pub mi_scores: Vec<f64>,
}

/// Two-class one-way ANOVA F statistic
pub fn f_score(column: ArrayView1<'_, f64>, labels: &[f64]) -> f64 {
    let (mut n1, mut s1, mut n0, mut s0) = (0.0, 0.0, 0.0, 0.0);
    for (&v, &y) in column.iter().zip(labels) {
        if y >= 0.5 {
            n1 += 1.0;
            s1 += v;
        } else {
            n0 += 1.0;
            s0 += v;
        }
    }
    let n = n0 + n1;
    if n0 == 0.0 || n1 == 0.0 || n <= 2.0 {
        return 0.0;
    }

    let (m1, m0) = (s1 / n1, s0 / n0);
    let mean = (s1 + s0) / n;
    let between = n1 * (m1 - mean).powi(2) + n0 * (m0 - mean).powi(2);

    let within: f64 = column
        .iter()
        .zip(labels)
        .map(|(&v, &y)| {
            let m = if y >= 0.5 { m1 } else { m0 };
            (v - m).powi(2)
        })
        .sum();

    if between <= 0.0 {
        return 0.0;
    }
    if within <= 1e-12 {
        return f64::MAX;
    }
    between / (within / (n - 2.0))
}

/// Mutual information (nats) between a binned column and the label
pub fn mutual_information(column: ArrayView1<'_, f64>, labels: &[f64]) -> f64 {
    let n = column.len();
    if n == 0 {
        return 0.0;
    }

    let mut sorted: Vec<f64> = column.iter().copied().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mut cuts: Vec<f64> = (1..MI_BINS)
        .map(|i| quantile_sorted(&sorted, i as f64 / MI_BINS as f64))
        .collect();
    cuts.dedup();

    let mut joint = vec![[0.0f64; 2]; cuts.len() + 1];
    for (&v, &y) in column.iter().zip(labels) {
        let bin = cuts.partition_point(|c| *c < v);
        joint[bin][usize::from(y >= 0.5)] += 1.0;
    }

    let total = n as f64;
    let class_totals = joint.iter().fold([0.0, 0.0], |acc, b| [acc[0] + b[0], acc[1] + b[1]]);

    let mut mi = 0.0;
    for bin in &joint {
        let bin_total = bin[0] + bin[1];
        for class in 0..2 {
            let count = bin[class];
            if count > 0.0 {
                let p_joint = count / total;
                let p_bin = bin_total / total;
                let p_class = class_totals[class] / total;
                mi += p_joint * (p_joint / (p_bin * p_class)).ln();
            }
        }
    }
    mi.max(0.0)
}

/// Indices of the `k` highest scores (ties broken by lower index)
fn top_k(scores: &[f64], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order.truncate(k);
    order
}

/// Select features from an engineered matrix whose columns follow `names`
pub fn select_features(x: ArrayView2<'_, f64>, labels: &[f64], names: &[&str], k: usize) -> FeatureSelection {
    let k = k.min(x.ncols());

    let (f_scores, mi_scores): (Vec<f64>, Vec<f64>) = (0..x.ncols())
        .into_par_iter()
        .map(|j| {
            let column = x.column(j);
            (f_score(column, labels), mutual_information(column, labels))
        })
        .unzip();

    let mut indices = top_k(&f_scores, k);
    indices.extend(top_k(&mi_scores, k));
    indices.sort_unstable();
    indices.dedup();

    let features = FeatureList::new(indices.iter().map(|&i| names[i].to_string()).collect());
    log::info!(
        "[Selection] Kept {} of {} features (K={})",
        features.len(),
        x.ncols(),
        k
    );

    FeatureSelection {
        indices,
        features,
        f_scores,
        mi_scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn matrix() -> (Array2<f64>, Vec<f64>) {
        // col 0: informative, col 1: constant, col 2: weak signal in noise
        let n = 200;
        let y: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let x = Array2::from_shape_fn((n, 3), |(i, j)| match j {
            0 => y[i] * 2.0 + (i % 7) as f64 * 0.01,
            1 => 5.0,
            _ => y[i] * 3.0 + ((i * 37) % 11) as f64,
        });
        (x, y)
    }

    #[test]
    fn test_informative_column_scores_highest() {
        let (x, y) = matrix();
        let f0 = f_score(x.column(0), &y);
        let f2 = f_score(x.column(2), &y);
        assert!(f0 > f2);
        assert_eq!(f_score(x.column(1), &y), 0.0);

        let mi0 = mutual_information(x.column(0), &y);
        assert!((mi0 - std::f64::consts::LN_2).abs() < 1e-6);
        assert!(mutual_information(x.column(1), &y).abs() < 1e-12);
    }

    #[test]
    fn test_selection_keeps_engineering_order() {
        let (x, y) = matrix();
        let selection = select_features(x.view(), &y, &["a", "b", "c"], 2);
        assert_eq!(selection.indices, vec![0, 2]);
        assert_eq!(selection.features.names(), &["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_k_larger_than_columns_keeps_all() {
        let (x, y) = matrix();
        let selection = select_features(x.view(), &y, &["a", "b", "c"], 40);
        assert_eq!(selection.indices, vec![0, 1, 2]);
    }
}
