//! Robust Scaler - median / IQR normalization
//!
//! Fit on the training matrix, persisted as its own artifact, and applied to
//! every inference vector before the model sees it.

use ndarray::{ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Per-feature `(x - median) / IQR`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Linear-interpolated quantile of an ascending slice
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl RobustScaler {
    /// Pass-through scaler for `n` features
    pub fn identity(n: usize) -> Self {
        Self {
            center: vec![0.0; n],
            scale: vec![1.0; n],
        }
    }

    /// Fit on rows x features. A zero IQR keeps scale 1 so constant columns
    /// center to 0 instead of dividing by zero.
    pub fn fit(x: ArrayView2<'_, f64>) -> Self {
        let mut center = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());

        for column in x.axis_iter(Axis(1)) {
            let mut sorted: Vec<f64> = column.iter().copied().collect();
            sorted.sort_by(|a, b| a.total_cmp(b));

            let median = quantile_sorted(&sorted, 0.5);
            let iqr = quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25);

            center.push(median);
            scale.push(if iqr.abs() > 1e-12 { iqr } else { 1.0 });
        }

        Self { center, scale }
    }

    pub fn len(&self) -> usize {
        self.center.len()
    }

    pub fn is_empty(&self) -> bool {
        self.center.is_empty()
    }

    /// Scale one row in place
    pub fn transform_row(&self, row: &mut [f64]) {
        for ((value, center), scale) in row.iter_mut().zip(&self.center).zip(&self.scale) {
            *value = (*value - center) / scale;
        }
    }

    /// Scaled copy of a matrix
    pub fn transform(&self, x: ArrayView2<'_, f64>) -> ndarray::Array2<f64> {
        let mut out = x.to_owned();
        for mut row in out.axis_iter_mut(Axis(0)) {
            if let Some(slice) = row.as_slice_mut() {
                self.transform_row(slice);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_median_iqr() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [4.0, 5.0], [5.0, 5.0]];
        let scaler = RobustScaler::fit(x.view());
        assert_eq!(scaler.center, vec![3.0, 5.0]);
        assert_eq!(scaler.scale, vec![2.0, 1.0]);
    }

    #[test]
    fn test_transform_row() {
        let scaler = RobustScaler {
            center: vec![3.0, 5.0],
            scale: vec![2.0, 1.0],
        };
        let mut row = vec![7.0, 5.0];
        scaler.transform_row(&mut row);
        assert_eq!(row, vec![2.0, 0.0]);
    }

    #[test]
    fn test_transform_matrix_matches_rows() {
        let x = array![[1.0, 10.0], [3.0, 30.0], [9.0, 20.0]];
        let scaler = RobustScaler::fit(x.view());
        let scaled = scaler.transform(x.view());
        let mut first = vec![1.0, 10.0];
        scaler.transform_row(&mut first);
        assert_eq!(scaled.row(0).to_vec(), first);
    }
}
