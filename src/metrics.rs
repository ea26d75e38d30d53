use std::fmt;

use ndarray::ArrayView1;

/// Goodness-of-fit summary for a regression model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub r2: f64,
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub mape: f64,
}

impl Metrics {
    /// Weighted sum of metric sets, field by field.
    pub fn weighted<'a, I>(items: I) -> Metrics
    where
        I: IntoIterator<Item = (&'a Metrics, f64)>,
    {
        items
            .into_iter()
            .fold(Metrics::default(), |acc, (m, w)| Metrics {
                r2: acc.r2 + m.r2 * w,
                mse: acc.mse + m.mse * w,
                rmse: acc.rmse + m.rmse * w,
                mae: acc.mae + m.mae * w,
                mape: acc.mape + m.mape * w,
            })
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "R2: {}", self.r2)?;
        writeln!(f, "MSE: {}", self.mse)?;
        writeln!(f, "RMSE: {}", self.rmse)?;
        writeln!(f, "MAE: {}", self.mae)?;
        write!(f, "MAPE: {}", self.mape)
    }
}

/// Compares predictions against the true targets.
///
/// Rows whose true value is exactly zero are left out of MAPE only. When the
/// targets have no spread, R2 is 1 for a perfect prediction and 0 otherwise.
pub fn evaluate(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Metrics {
    debug_assert_eq!(
        y_true.len(),
        y_pred.len(),
        "true and predicted vectors must have the same length"
    );
    let n = y_true.len();
    if n == 0 {
        return Metrics::default();
    }

    let mean = y_true.sum() / n as f64;
    let (mut ssr, mut sst, mut ae, mut ape) = (0.0, 0.0, 0.0, 0.0);
    let mut n_pct = 0usize;
    for (&y, &p) in y_true.iter().zip(y_pred.iter()) {
        let e = p - y;
        ssr += e * e;
        sst += (y - mean) * (y - mean);
        ae += e.abs();
        if y != 0.0 {
            ape += (e / y).abs();
            n_pct += 1;
        }
    }

    let r2 = if sst > 0.0 {
        1.0 - ssr / sst
    } else if ssr == 0.0 {
        1.0
    } else {
        0.0
    };
    let mse = ssr / n as f64;

    Metrics {
        r2,
        mse,
        rmse: mse.sqrt(),
        mae: ae / n as f64,
        mape: if n_pct > 0 { ape / n_pct as f64 } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_evaluate_known_values() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        let p = array![1.5, 2.0, 2.5, 4.0];
        let m = evaluate(y.view(), p.view());

        assert_abs_diff_eq!(m.mse, 0.125, epsilon = 1e-12);
        assert_abs_diff_eq!(m.rmse, 0.125f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(m.mae, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(m.r2, 1.0 - 0.5 / 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.mape, (0.5 + 0.0 + 0.5 / 3.0 + 0.0) / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mape_skips_zero_targets() {
        let y = array![0.0, 2.0];
        let p = array![1.0, 1.0];
        let m = evaluate(y.view(), p.view());
        assert_abs_diff_eq!(m.mape, 0.5, epsilon = 1e-12);
        assert!(m.mape.is_finite());
    }

    #[test]
    fn test_constant_targets() {
        let y = array![3.0, 3.0, 3.0];
        assert_eq!(evaluate(y.view(), y.view()).r2, 1.0);
        let p = array![3.0, 3.0, 4.0];
        assert_eq!(evaluate(y.view(), p.view()).r2, 0.0);
    }

    #[test]
    fn test_empty_is_default() {
        let y: ndarray::Array1<f64> = array![];
        assert_eq!(evaluate(y.view(), y.view()), Metrics::default());
    }

    #[test]
    fn test_weighted_combination() {
        let a = Metrics {
            r2: 1.0,
            mse: 2.0,
            rmse: 3.0,
            mae: 4.0,
            mape: 5.0,
        };
        let b = Metrics::default();
        let m = Metrics::weighted([(&a, 0.25), (&b, 0.75)]);
        assert_abs_diff_eq!(m.mse, 0.5);
        assert_abs_diff_eq!(m.mape, 1.25);
    }
}
