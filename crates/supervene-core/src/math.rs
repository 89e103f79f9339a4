//! Statistics and resampling helpers
//!
//! Standardization here never produces NaN: a channel whose spread is
//! negligible next to its own magnitude (see [`is_degenerate`]) is centred
//! but left unscaled, and the caller is told which channels that happened
//! to.

use ndarray::{Array1, ArrayBase, ArrayView1, ArrayViewMut1, Axis, Data, DataMut, Dimension, Ix2};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Spread at or below this fraction of the peak magnitude counts as zero.
pub const DEGENERATE_SPREAD: f64 = 1e-10;

/// Delta degrees of freedom used for the standard deviation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ddof {
    /// Divide by `n` (population estimate)
    Population,
    /// Divide by `n - 1` (unbiased sample estimate)
    Sample,
}

impl Ddof {
    fn divisor(self, n: usize) -> f64 {
        match self {
            Self::Population => n as f64,
            Self::Sample => n.saturating_sub(1) as f64,
        }
    }
}

/// Mean and standard deviation of a 1-D signal.
///
/// Returns `(NaN, NaN)` for an empty signal; the sample standard deviation of
/// a single value is NaN as well.
#[must_use]
pub fn mean_std(values: ArrayView1<'_, f64>, ddof: Ddof) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.sum() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (mean, (ss / ddof.divisor(n)).sqrt())
}

/// Whether a signal is constant up to rounding.
///
/// Relative to the largest absolute value, so recordings in very small
/// physical units are not mistaken for flat ones. Empty signals and
/// non-finite spreads count as degenerate.
#[must_use]
pub fn is_degenerate(values: ArrayView1<'_, f64>, std: f64) -> bool {
    let peak = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    !(std.is_finite() && std > DEGENERATE_SPREAD * peak)
}

/// Z-score a signal in place.
///
/// Returns `false` when the signal had no usable spread; it is then only
/// centred.
pub fn standardize(mut values: ArrayViewMut1<'_, f64>, ddof: Ddof) -> bool {
    let (mean, std) = mean_std(values.view(), ddof);
    if !mean.is_finite() {
        return false;
    }
    if is_degenerate(values.view(), std) {
        values.mapv_inplace(|v| v - mean);
        false
    } else {
        values.mapv_inplace(|v| (v - mean) / std);
        true
    }
}

/// Z-score every column of a `[T, C]` matrix independently.
///
/// Returns the indices of columns that could only be centred.
pub fn standardize_columns<S>(matrix: &mut ArrayBase<S, Ix2>, ddof: Ddof) -> Vec<usize>
where
    S: DataMut<Elem = f64>,
{
    matrix
        .axis_iter_mut(Axis(1))
        .enumerate()
        .filter_map(|(c, column)| (!standardize(column, ddof)).then_some(c))
        .collect()
}

/// Keep every `factor`-th sample, starting with the first.
///
/// The output has `ceil(len / factor)` samples.
///
/// # Errors
///
/// Returns [`CoreError::InvalidParameter`] if `factor` is zero.
pub fn decimate(signal: ArrayView1<'_, f64>, factor: usize) -> CoreResult<Array1<f64>> {
    if factor == 0 {
        return Err(CoreError::InvalidParameter {
            parameter: "factor",
            reason: "decimation factor must be at least 1".into(),
        });
    }
    Ok(signal.iter().step_by(factor).copied().collect())
}

/// Mean and spread of a whole tensor, for logging.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TensorSummary {
    /// Number of elements
    pub count: usize,
    /// Mean over all elements
    pub mean: f64,
    /// Unbiased standard deviation over all elements
    pub std: f64,
}

impl TensorSummary {
    /// Summarize any `f32` array.
    pub fn of<S, D>(tensor: &ArrayBase<S, D>) -> Self
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        let values: Array1<f64> = tensor.iter().map(|&v| f64::from(v)).collect();
        let (mean, std) = mean_std(values.view(), Ddof::Sample);
        Self { count: values.len(), mean, std }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_mean_std_population_vs_sample() {
        let x = array![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let (mean, pop) = mean_std(x.view(), Ddof::Population);
        let (_, sample) = mean_std(x.view(), Ddof::Sample);
        assert_abs_diff_eq!(mean, 5.0);
        assert_abs_diff_eq!(pop, 2.0);
        assert_abs_diff_eq!(sample, (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_standardize_gives_unit_spread() {
        let mut x = array![1.0, 3.0, 8.0, -2.0, 0.5];
        assert!(standardize(x.view_mut(), Ddof::Sample));
        let (mean, std) = mean_std(x.view(), Ddof::Sample);
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_signal_is_centred_not_nan() {
        let mut x = Array1::from_elem(20, 4.25);
        assert!(!standardize(x.view_mut(), Ddof::Population));
        assert!(x.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_tiny_units_are_not_degenerate() {
        let mut x = Array1::from_iter((0..30).map(|t| 1e-13 * (f64::from(t) * 0.4).sin()));
        assert!(standardize(x.view_mut(), Ddof::Sample));
        assert!(is_degenerate(array![0.0, 0.0].view(), 0.0));
    }

    #[test]
    fn test_standardize_columns_reports_degenerate() {
        let mut m = Array2::from_shape_fn((50, 3), |(t, c)| match c {
            0 => t as f64,
            1 => 7.0,
            _ => (t as f64 * 0.3).sin() * 4.0 + 10.0,
        });
        let degenerate = standardize_columns(&mut m, Ddof::Population);
        assert_eq!(degenerate, vec![1]);

        for c in [0, 2] {
            let (mean, std) = mean_std(m.column(c), Ddof::Population);
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(std, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_decimate_keeps_every_nth_from_zero() {
        let x = Array1::from_iter((0..10).map(f64::from));
        assert_eq!(decimate(x.view(), 3).unwrap(), array![0.0, 3.0, 6.0, 9.0]);
        assert_eq!(decimate(x.view(), 1).unwrap(), x);
        assert!(decimate(x.view(), 0).is_err());
    }

    #[test]
    fn test_tensor_summary() {
        let t = array![[1.0f32, 2.0], [3.0, 4.0]];
        let summary = TensorSummary::of(&t);
        assert_eq!(summary.count, 4);
        assert_abs_diff_eq!(summary.mean, 2.5);
    }
}
