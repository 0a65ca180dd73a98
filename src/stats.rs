//! Sample statistics for chain summaries.

use ndarray::{Array2, ArrayView2, Axis};
use num_traits::Float;

/// Column-wise percentiles with linear interpolation (NumPy convention).
///
/// `qs` are percent values in `[0, 100]`. Returns a `(qs.len(), n_params)`
/// array; an empty sample block yields zeros.
pub fn percentiles<T: Float>(samples: ArrayView2<'_, T>, qs: &[f64]) -> Array2<T> {
    let (n, n_params) = samples.dim();
    let mut out = Array2::zeros((qs.len(), n_params));
    if n == 0 {
        return out;
    }
    for (j, col) in samples.axis_iter(Axis(1)).enumerate() {
        let mut sorted: Vec<T> = col.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        for (qi, &q) in qs.iter().enumerate() {
            let rank = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = T::from(rank - lo as f64).unwrap();
            out[[qi, j]] = sorted[lo] * (T::one() - frac) + sorted[hi] * frac;
        }
    }
    out
}

/// The 16th/50th/84th percentiles of each parameter: a running
/// credible-interval summary in the usual astronomical convention.
pub fn credible_summary(samples: ArrayView2<'_, f64>) -> Array2<f64> {
    percentiles(samples, &[16.0, 50.0, 84.0])
}

/// Renders a `(3, n_params)` summary as one line per parameter.
pub fn format_summary(summary: ArrayView2<'_, f64>) -> String {
    let mut out = String::new();
    for (j, col) in summary.axis_iter(Axis(1)).enumerate() {
        out.push_str(&format!(
            "  param {j}: 16% {:>12.6}  50% {:>12.6}  84% {:>12.6}\n",
            col[0], col[1], col[2]
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn median_of_odd_column() {
        let samples = arr2(&[[1.0], [5.0], [3.0], [2.0], [4.0]]);
        let p = percentiles(samples.view(), &[50.0]);
        assert_abs_diff_eq!(p[[0, 0]], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn interpolates_between_order_statistics() {
        let samples = arr2(&[[0.0], [10.0]]);
        let p = percentiles(samples.view(), &[25.0]);
        assert_abs_diff_eq!(p[[0, 0]], 2.5, epsilon = 1e-12);
    }

    #[test]
    fn extremes_hit_min_and_max() {
        let samples = arr2(&[[2.0, -1.0], [8.0, 4.0], [5.0, 0.0]]);
        let p = percentiles(samples.view(), &[0.0, 100.0]);
        assert_abs_diff_eq!(p[[0, 0]], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[[1, 0]], 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[[0, 1]], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[[1, 1]], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn summary_has_three_rows_per_param() {
        let samples = arr2(&[[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]]);
        let summary = credible_summary(samples.view());
        assert_eq!(summary.shape(), &[3, 2]);
        let text = format_summary(summary.view());
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn empty_block_yields_zeros() {
        let samples = Array2::<f64>::zeros((0, 2));
        let p = percentiles(samples.view(), &[50.0]);
        assert_eq!(p.shape(), &[1, 2]);
    }
}
