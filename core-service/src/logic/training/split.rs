//! Stratified splitting helpers.
//!
//! Indices are grouped by class, shuffled with a seeded stream and dealt out
//! per class, so every split keeps the label ratio of the full set.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn class_groups(labels: &[f64], rng: &mut ChaCha8Rng) -> Vec<Vec<usize>> {
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        let key = if label >= 0.5 { 1 } else { 0 };
        groups.entry(key).or_default().push(i);
    }

    groups
        .into_values()
        .map(|mut indices| {
            indices.shuffle(rng);
            indices
        })
        .collect()
}

/// (train, test) row indices, both sorted
pub fn stratified_split(labels: &[f64], test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for indices in class_groups(labels, &mut rng) {
        // A class with a single row stays in train
        let test_size = ((indices.len() as f64) * test_ratio).round().max(1.0) as usize;
        let test_size = test_size.min(indices.len().saturating_sub(1));
        test.extend_from_slice(&indices[..test_size]);
        train.extend_from_slice(&indices[test_size..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Held-out index sets for `k` stratified folds (each sorted)
pub fn stratified_kfold(labels: &[f64], k: usize, seed: u64) -> Vec<Vec<usize>> {
    let k = k.max(2);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut folds = vec![Vec::new(); k];

    // Deal rows round-robin; offset per class keeps fold sizes even
    let mut offset = 0;
    for indices in class_groups(labels, &mut rng) {
        for (j, index) in indices.iter().enumerate() {
            folds[(offset + j) % k].push(*index);
        }
        offset += indices.len();
    }

    for fold in folds.iter_mut() {
        fold.sort_unstable();
    }
    folds
}

/// Complement of `held_out` in `0..n` (held_out must be sorted)
pub fn complement(n: usize, held_out: &[usize]) -> Vec<usize> {
    (0..n).filter(|i| held_out.binary_search(i).is_err()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pos: usize, neg: usize) -> Vec<f64> {
        let mut y = vec![1.0; pos];
        y.extend(vec![0.0; neg]);
        y
    }

    #[test]
    fn test_split_keeps_class_ratio() {
        let y = labels(300, 700);
        let (train, test) = stratified_split(&y, 0.2, 42);
        assert_eq!(train.len() + test.len(), 1000);
        assert_eq!(test.len(), 200);
        let test_pos = test.iter().filter(|&&i| y[i] == 1.0).count();
        assert_eq!(test_pos, 60);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_seeded() {
        let y = labels(50, 50);
        assert_eq!(stratified_split(&y, 0.2, 1), stratified_split(&y, 0.2, 1));
        assert_ne!(stratified_split(&y, 0.2, 1).1, stratified_split(&y, 0.2, 2).1);
    }

    #[test]
    fn test_singleton_class_stays_in_train() {
        let y = labels(1, 20);
        let (train, test) = stratified_split(&y, 0.2, 3);
        assert!(train.contains(&0));
        assert!(!test.contains(&0));
    }

    #[test]
    fn test_kfold_partitions_rows() {
        let y = labels(40, 61);
        let folds = stratified_kfold(&y, 5, 9);
        assert_eq!(folds.len(), 5);

        let mut all: Vec<usize> = folds.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..101).collect::<Vec<_>>());

        for fold in &folds {
            let pos = fold.iter().filter(|&&i| y[i] == 1.0).count();
            assert_eq!(pos, 8);
            assert!(fold.len() == 20 || fold.len() == 21);
        }
    }

    #[test]
    fn test_complement() {
        assert_eq!(complement(6, &[1, 4]), vec![0, 2, 3, 5]);
    }
}
