//! Regression Tree - histogram-based, second-order splits
//!
//! One tree implementation serves every tree learner:
//! - forests fit on `(g = y, h = 1)` with `lambda = 0`, so leaves are means
//!   and gain is variance reduction
//! - boosting fits on `(g = y - p, h = p(1 - p))`, so leaves are Newton steps
//!
//! # Split rule
//! Features are pre-binned into at most `MAX_BINS` quantile bins. A split on
//! bin `b` sends `x <= cuts[b]` left, which is exactly `bin(x) <= b` for the
//! training rows, so trees predict on raw values with no binning at
//! inference time.
//!
//! Gain = S_L^2/(W_L+l) + S_R^2/(W_R+l) - S^2/(W+l), leaf = S/(W+l).

use ndarray::{ArrayView1, ArrayView2};
use rand::seq::index::sample;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Maximum bins per feature
pub const MAX_BINS: usize = 64;

// ============================================================================
// BINNING
// ============================================================================

/// Column-major binned copy of a training matrix
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    bins: Vec<u8>,
    cuts: Vec<Vec<f64>>,
    n_rows: usize,
}

impl BinnedMatrix {
    pub fn new(x: ArrayView2<'_, f64>) -> Self {
        let n_rows = x.nrows();
        let mut bins = Vec::with_capacity(n_rows * x.ncols());
        let mut cuts = Vec::with_capacity(x.ncols());

        for column in x.columns() {
            let feature_cuts = quantile_cuts(column);
            bins.extend(
                column
                    .iter()
                    .map(|&v| feature_cuts.partition_point(|&c| c < v) as u8),
            );
            cuts.push(feature_cuts);
        }

        Self { bins, cuts, n_rows }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.cuts.len()
    }

    #[inline]
    fn bin(&self, feature: usize, row: usize) -> usize {
        self.bins[feature * self.n_rows + row] as usize
    }

    fn n_bins(&self, feature: usize) -> usize {
        self.cuts[feature].len() + 1
    }
}

/// Ascending, deduplicated cut points below the column maximum
fn quantile_cuts(column: ArrayView1<'_, f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = column.iter().copied().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let Some(&max) = sorted.last() else {
        return Vec::new();
    };

    let mut cuts: Vec<f64> = (1..MAX_BINS)
        .map(|k| sorted[(k * sorted.len()) / MAX_BINS])
        .filter(|&c| c < max)
        .collect();
    cuts.dedup();
    cuts
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Growth parameters for one tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// L2 penalty on leaf values
    pub lambda: f64,
    /// Features considered per node (None = all)
    pub max_features: Option<usize>,
    /// Extra-trees mode: one random threshold per candidate feature
    pub random_splits: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

#[derive(Clone, Copy, Default)]
struct BinStat {
    g: f64,
    h: f64,
    n: usize,
}

struct Candidate {
    feature: usize,
    bin: usize,
    gain: f64,
}

impl RegressionTree {
    /// Grow a tree on `rows` of `data` with per-row targets `g` and weights `h`
    pub fn fit(
        data: &BinnedMatrix,
        rows: Vec<usize>,
        g: &[f64],
        h: &[f64],
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(data, rows, g, h, params, rng, 0);
        tree
    }

    #[allow(clippy::too_many_arguments)]
    fn grow(
        &mut self,
        data: &BinnedMatrix,
        rows: Vec<usize>,
        g: &[f64],
        h: &[f64],
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
        depth: usize,
    ) -> usize {
        let (sum_g, sum_h) = rows
            .iter()
            .fold((0.0, 0.0), |(sg, sh), &r| (sg + g[r], sh + h[r]));
        let leaf_value = leaf(sum_g, sum_h, params.lambda);

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: leaf_value });

        if depth >= params.max_depth || rows.len() < 2 * params.min_samples_leaf.max(1) {
            return id;
        }

        let Some(best) = best_split(data, &rows, g, h, sum_g, sum_h, params, rng) else {
            return id;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| data.bin(best.feature, r) <= best.bin);

        let threshold = data.cuts[best.feature][best.bin];
        let left = self.grow(data, left_rows, g, h, params, rng, depth + 1);
        let right = self.grow(data, right_rows, g, h, params, rng, depth + 1);

        self.nodes[id] = Node::Split {
            feature: best.feature,
            threshold,
            left,
            right,
        };
        id
    }

    /// Leaf value for one raw (unbinned) row
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes.get(id) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).copied().unwrap_or(0.0);
                    id = if x <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[inline]
fn leaf(sum_g: f64, sum_h: f64, lambda: f64) -> f64 {
    let denom = sum_h + lambda;
    if denom > 1e-12 {
        sum_g / denom
    } else {
        0.0
    }
}

#[inline]
fn score(sum_g: f64, sum_h: f64, lambda: f64) -> f64 {
    let denom = sum_h + lambda;
    if denom > 1e-12 {
        sum_g * sum_g / denom
    } else {
        0.0
    }
}

#[allow(clippy::too_many_arguments)]
fn best_split(
    data: &BinnedMatrix,
    rows: &[usize],
    g: &[f64],
    h: &[f64],
    sum_g: f64,
    sum_h: f64,
    params: &TreeParams,
    rng: &mut ChaCha8Rng,
) -> Option<Candidate> {
    let n_features = data.n_features();
    let features: Vec<usize> = match params.max_features {
        Some(k) if k < n_features => sample(rng, n_features, k.max(1)).into_vec(),
        _ => (0..n_features).collect(),
    };

    let parent = score(sum_g, sum_h, params.lambda);
    let min_leaf = params.min_samples_leaf.max(1);
    let mut best: Option<Candidate> = None;

    for feature in features {
        let n_bins = data.n_bins(feature);
        if n_bins < 2 {
            continue;
        }

        let mut hist = [BinStat::default(); MAX_BINS];
        for &r in rows {
            let stat = &mut hist[data.bin(feature, r)];
            stat.g += g[r];
            stat.h += h[r];
            stat.n += 1;
        }

        let candidate_bins: Vec<usize> = if params.random_splits {
            let occupied: Vec<usize> = (0..n_bins).filter(|&b| hist[b].n > 0).collect();
            match (occupied.first(), occupied.last()) {
                (Some(&lo), Some(&hi)) if hi > lo => vec![rng.gen_range(lo..hi)],
                _ => continue,
            }
        } else {
            (0..n_bins - 1).collect()
        };

        // Prefix sums let any candidate bin be scored in O(1)
        let mut prefix = Vec::with_capacity(n_bins);
        let mut acc = BinStat::default();
        for stat in hist.iter().take(n_bins) {
            acc.g += stat.g;
            acc.h += stat.h;
            acc.n += stat.n;
            prefix.push(acc);
        }

        for bin in candidate_bins {
            let left = prefix[bin];
            let right_n = rows.len() - left.n;
            if left.n < min_leaf || right_n < min_leaf {
                continue;
            }
            let gain = score(left.g, left.h, params.lambda)
                + score(sum_g - left.g, sum_h - left.h, params.lambda)
                - parent;
            if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(Candidate { feature, bin, gain });
            }
        }
    }

    best
}
