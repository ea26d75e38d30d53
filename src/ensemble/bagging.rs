use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    check_features,
    dataset::Dataset,
    error::{Error, Result},
    metrics::{evaluate, Metrics},
    resolve_seed, BoxedEstimator, Estimator, EstimatorFactory,
};

use super::params::BaggingParams;

#[cfg(feature = "use-rayon")]
use rayon::prelude::*;

/// Guards the reliability score against a perfect out-of-bag fit.
const RMSE_EPSILON: f64 = 1e-8;

/// One bootstrap bag.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Rows drawn with replacement, as many as the source dataset has.
    pub data: Dataset,
    /// Source rows never drawn into `data`, ascending.
    pub oob_indices: Vec<usize>,
}

/// Bootstrap aggregation with members weighted by out-of-bag accuracy.
pub struct Bagging {
    data: Dataset,
    seed: u64,
    samples: Vec<Sample>,
    estimators: Vec<BoxedEstimator>,
    weights: Vec<f64>,
    member_oob_metrics: Vec<Option<Metrics>>,
    oob_metrics: Option<Metrics>,
    metrics: Metrics,
}

impl Bagging {
    /// Draws every bootstrap sample up front and builds one unfitted member
    /// per sample.
    pub fn new(factory: EstimatorFactory, data: Dataset, params: &BaggingParams) -> Result<Self> {
        params.validate()?;
        let seed = resolve_seed(params.seed);
        let mut rng = StdRng::seed_from_u64(seed);

        let samples: Vec<Sample> = (0..params.n_estimators)
            .map(|_| bootstrap_sample(&data, &mut rng))
            .collect();
        let estimators = samples
            .iter()
            .map(|sample| factory(sample.data.clone()))
            .collect::<Result<Vec<BoxedEstimator>>>()?;

        Ok(Self {
            data,
            seed,
            samples,
            estimators,
            weights: Vec::new(),
            member_oob_metrics: Vec::new(),
            oob_metrics: None,
            metrics: Metrics::default(),
        })
    }

    pub fn factory(inner: EstimatorFactory, params: BaggingParams) -> EstimatorFactory {
        crate::factory(move |data| {
            let bagging = Bagging::new(inner.clone(), data, &params)?;
            Ok(Box::new(bagging) as BoxedEstimator)
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn estimators(&self) -> &[BoxedEstimator] {
        &self.estimators
    }

    /// Combination weights; empty before `fit`.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Out-of-bag rows of every member, in member order.
    pub fn oob_samples(&self) -> Vec<(Array2<f64>, Array1<f64>)> {
        self.samples
            .iter()
            .map(|sample| {
                (
                    self.data.x().select(Axis(0), &sample.oob_indices),
                    self.data.y().select(Axis(0), &sample.oob_indices),
                )
            })
            .collect()
    }

    /// Each member's metrics on its own out-of-bag rows; `None` for members
    /// whose bag drew every row.
    pub fn member_oob_metrics(&self) -> &[Option<Metrics>] {
        &self.member_oob_metrics
    }

    /// Weight-weighted combination of the members' out-of-bag metrics.
    pub fn oob_metrics(&self) -> Option<Metrics> {
        self.oob_metrics
    }

    fn evaluate_oob(&self, sample: &Sample, estimator: &BoxedEstimator) -> Result<Option<Metrics>> {
        if sample.oob_indices.is_empty() {
            return Ok(None);
        }
        let x = self.data.x().select(Axis(0), &sample.oob_indices);
        let y = self.data.y().select(Axis(0), &sample.oob_indices);
        let preds = estimator.predict_batch(x.view())?;
        Ok(Some(evaluate(y.view(), preds.view())))
    }
}

impl Estimator for Bagging {
    fn fit(&mut self) -> Result<()> {
        self.weights.clear();
        self.member_oob_metrics.clear();
        self.oob_metrics = None;

        #[cfg(not(feature = "use-rayon"))]
        let fitted: Result<()> = self.estimators.iter_mut().try_for_each(|e| e.fit());

        #[cfg(feature = "use-rayon")]
        let fitted: Result<()> = self.estimators.par_iter_mut().try_for_each(|e| e.fit());

        fitted?;

        let member_oob_metrics = self
            .samples
            .iter()
            .zip(&self.estimators)
            .map(|(sample, estimator)| self.evaluate_oob(sample, estimator))
            .collect::<Result<Vec<Option<Metrics>>>>()?;

        let scores: Vec<f64> = member_oob_metrics
            .iter()
            .map(|m| m.map_or(0.0, |m| 1.0 / (m.rmse + RMSE_EPSILON)))
            .collect();
        let total: f64 = scores.iter().sum();
        let n = scores.len();

        let n_empty = member_oob_metrics.iter().filter(|m| m.is_none()).count();
        if n_empty > 0 {
            log::warn!(
                "{} of {} bootstrap samples have no out-of-bag rows and get zero weight",
                n_empty,
                n
            );
        }

        let (weights, oob_metrics) = if total > 0.0 {
            let weights: Vec<f64> = scores.iter().map(|s| s / total).collect();
            let oob = Metrics::weighted(
                member_oob_metrics
                    .iter()
                    .zip(&weights)
                    .filter_map(|(m, &w)| m.as_ref().map(|m| (m, w))),
            );
            (weights, Some(oob))
        } else {
            log::warn!("no out-of-bag rows in any bag, falling back to uniform weights");
            (vec![1.0 / n as f64; n], None)
        };

        self.weights = weights;
        self.member_oob_metrics = member_oob_metrics;
        self.oob_metrics = oob_metrics;

        let preds = self.predict_batch(self.data.x())?;
        self.metrics = evaluate(self.data.y(), preds.view());

        log::info!(
            "fitted bagging ensemble of {} members: train RMSE {:.6}, OOB RMSE {}",
            n,
            self.metrics.rmse,
            self.oob_metrics
                .map_or_else(|| "n/a".to_string(), |m| format!("{:.6}", m.rmse))
        );
        Ok(())
    }

    fn predict(&self, x: ArrayView1<f64>) -> Result<f64> {
        if self.weights.is_empty() {
            return Err(Error::NotFitted);
        }
        check_features(self.data.n_features(), x)?;
        self.estimators
            .iter()
            .zip(&self.weights)
            .try_fold(0.0, |acc, (estimator, w)| Ok(acc + w * estimator.predict(x)?))
    }

    fn metrics(&self) -> Metrics {
        self.metrics
    }

    fn n_features(&self) -> usize {
        self.data.n_features()
    }
}

fn bootstrap_sample<R: Rng + ?Sized>(data: &Dataset, rng: &mut R) -> Sample {
    let n = data.n_rows();
    let drawn: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

    let mut in_bag = vec![false; n];
    for &i in &drawn {
        in_bag[i] = true;
    }
    let oob_indices = (0..n).filter(|&i| !in_bag[i]).collect();

    Sample {
        data: data.select(&drawn),
        oob_indices,
    }
}
