pub mod dataset;
pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod synthetic;
pub mod tree;

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

pub use dataset::Dataset;
pub use ensemble::{Bagging, Boosting};
pub use error::{Error, Result};
pub use metrics::Metrics;
pub use tree::RegressionTree;

/// Common contract of every model and ensemble.
///
/// An estimator owns its training data from construction. `fit` computes the
/// fitted state from scratch, after which `predict` and `metrics` may be
/// called any number of times. `metrics` returns zeros until the first
/// successful `fit`.
pub trait Estimator: Send + Sync {
    fn fit(&mut self) -> Result<()>;

    fn predict(&self, x: ArrayView1<f64>) -> Result<f64>;

    /// Metrics on the training data, captured at the end of the last `fit`.
    fn metrics(&self) -> Metrics;

    fn n_features(&self) -> usize;

    fn predict_batch(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        x.axis_iter(Axis(0))
            .map(|row| self.predict(row))
            .collect::<Result<Vec<f64>>>()
            .map(Array1::from)
    }
}

pub type BoxedEstimator = Box<dyn Estimator>;

/// Builds an unfitted estimator from its own training snapshot.
pub type EstimatorFactory = Arc<dyn Fn(Dataset) -> Result<BoxedEstimator> + Send + Sync>;

pub fn factory<F>(f: F) -> EstimatorFactory
where
    F: Fn(Dataset) -> Result<BoxedEstimator> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) fn check_features(expected: usize, x: ArrayView1<f64>) -> Result<()> {
    if x.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            found: x.len(),
        });
    }
    Ok(())
}

pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    })
}
