//! Evaluation metrics for binary success classifiers.
//!
//! ROC AUC is rank-based (Mann-Whitney U) with average ranks for ties.
//! Threshold metrics come from a confusion matrix at 0.5.

use serde::{Deserialize, Serialize};

/// Area under the ROC curve. Returns 0.5 when only one class is present.
pub fn roc_auc(scores: &[f64], labels: &[f64]) -> f64 {
    let n_pos = labels.iter().filter(|&&y| y >= 0.5).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 || scores.len() != labels.len() {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Average rank (1-based) per tie group
    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(y, _)| **y >= 0.5)
        .map(|(_, r)| *r)
        .sum();

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    (pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg)
}

/// Validation metrics computed from a confusion matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub auc: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_count: usize,
}

/// Compute AUC and 0.5-threshold metrics from success probabilities.
pub fn compute_validation_metrics(probabilities: &[f64], labels: &[f64]) -> ValidationMetrics {
    let mut tp = 0;
    let mut fp = 0;
    let mut tn = 0;
    let mut fn_count = 0;

    for (&p, &y) in probabilities.iter().zip(labels) {
        match (p >= 0.5, y >= 0.5) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, false) => tn += 1,
            (false, true) => fn_count += 1,
        }
    }

    let total = (tp + fp + tn + fn_count) as f64;
    let accuracy = if total > 0.0 { (tp + tn) as f64 / total } else { 0.0 };
    let precision = if tp + fp > 0 { tp as f64 / (tp + fp) as f64 } else { 0.0 };
    let recall = if tp + fn_count > 0 { tp as f64 / (tp + fn_count) as f64 } else { 0.0 };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ValidationMetrics {
        auc: roc_auc(probabilities, labels),
        accuracy,
        precision,
        recall,
        f1,
        tp,
        fp,
        tn,
        fn_count,
    }
}

impl std::fmt::Display for ValidationMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "auc={:.4} acc={:.4} prec={:.4} rec={:.4} f1={:.4} (tp={} fp={} tn={} fn={})",
            self.auc,
            self.accuracy,
            self.precision,
            self.recall,
            self.f1,
            self.tp,
            self.fp,
            self.tn,
            self.fn_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_ranking() {
        let auc = roc_auc(&[0.1, 0.2, 0.8, 0.9], &[0.0, 0.0, 1.0, 1.0]);
        assert!((auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_ranking() {
        let auc = roc_auc(&[0.9, 0.8, 0.2, 0.1], &[0.0, 0.0, 1.0, 1.0]);
        assert!(auc.abs() < 1e-12);
    }

    #[test]
    fn test_all_ties_is_half() {
        let auc = roc_auc(&[0.5; 4], &[0.0, 1.0, 0.0, 1.0]);
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_is_half() {
        assert_eq!(roc_auc(&[0.1, 0.9], &[1.0, 1.0]), 0.5);
    }

    #[test]
    fn test_partial_ties() {
        // pos {0.5, 0.9}, neg {0.5, 0.1}: pairs (0.5,0.5)=0.5, others win -> 3.5/4
        let auc = roc_auc(&[0.5, 0.9, 0.5, 0.1], &[1.0, 1.0, 0.0, 0.0]);
        assert!((auc - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_confusion_metrics() {
        let m = compute_validation_metrics(&[0.9, 0.6, 0.4, 0.2], &[1.0, 0.0, 1.0, 0.0]);
        assert_eq!((m.tp, m.fp, m.tn, m.fn_count), (1, 1, 1, 1));
        assert!((m.accuracy - 0.5).abs() < 1e-12);
        assert!((m.f1 - 0.5).abs() < 1e-12);
    }
}
