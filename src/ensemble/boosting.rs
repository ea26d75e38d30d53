use ndarray::{Array1, ArrayView1};

use crate::{
    check_features,
    dataset::Dataset,
    error::{Error, Result},
    metrics::{evaluate, Metrics},
    BoxedEstimator, Estimator, EstimatorFactory,
};

use super::params::BoostingParams;

const SSR_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostingState {
    Unfit,
    /// Stopped before `n_estimators` because the residual SSR stopped moving.
    EarlyStopped { stages: usize },
    Fitted,
}

/// Stage-wise additive model. Every stage after the first is fitted on the
/// residual of the ensemble built so far.
pub struct Boosting {
    factory: EstimatorFactory,
    data: Dataset,
    params: BoostingParams,
    stages: Vec<BoxedEstimator>,
    state: BoostingState,
    metrics: Metrics,
}

impl Boosting {
    pub fn new(factory: EstimatorFactory, data: Dataset, params: &BoostingParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            factory,
            data,
            params: params.clone(),
            stages: Vec::new(),
            state: BoostingState::Unfit,
            metrics: Metrics::default(),
        })
    }

    pub fn factory(inner: EstimatorFactory, params: BoostingParams) -> EstimatorFactory {
        crate::factory(move |data| {
            let boosting = Boosting::new(inner.clone(), data, &params)?;
            Ok(Box::new(boosting) as BoxedEstimator)
        })
    }

    pub fn stages(&self) -> &[BoxedEstimator] {
        &self.stages
    }

    pub fn state(&self) -> BoostingState {
        self.state
    }

    pub fn learning_rate(&self) -> f64 {
        self.params.learning_rate
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    /// Fits stages into `self.stages` and returns the training predictions
    /// along with whether the loop stopped early.
    fn fit_stages(&mut self) -> Result<(Array1<f64>, bool)> {
        let BoostingParams {
            n_estimators,
            learning_rate,
            tolerance,
        } = self.params;

        let y = self.data.y().to_owned();
        let mut predictions = Array1::<f64>::zeros(self.data.n_rows());
        // Residual SSR of the empty ensemble
        let mut prev_ssr = y.pow2().sum();

        for stage in 0..n_estimators {
            let target = if stage == 0 {
                y.clone()
            } else {
                let residual = &y - &predictions;
                let ssr = residual.pow2().sum();
                let change = (ssr - prev_ssr).abs() / (prev_ssr + SSR_EPSILON);
                log::debug!(
                    "boosting stage {}: residual SSR {:.6}, relative change {:.3e}",
                    stage,
                    ssr,
                    change
                );
                if change < tolerance {
                    log::info!(
                        "boosting stopped early after {} of {} stages",
                        stage,
                        n_estimators
                    );
                    return Ok((predictions, true));
                }
                prev_ssr = ssr;
                residual
            };

            let mut estimator = (self.factory)(self.data.with_targets(target)?)?;
            estimator.fit()?;
            predictions.scaled_add(learning_rate, &estimator.predict_batch(self.data.x())?);
            self.stages.push(estimator);
        }
        Ok((predictions, false))
    }
}

impl Estimator for Boosting {
    fn fit(&mut self) -> Result<()> {
        self.stages.clear();
        self.state = BoostingState::Unfit;

        let (predictions, stopped_early) = match self.fit_stages() {
            Ok(fitted) => fitted,
            Err(e) => {
                self.stages.clear();
                return Err(e);
            }
        };

        self.metrics = evaluate(self.data.y(), predictions.view());
        self.state = if stopped_early {
            BoostingState::EarlyStopped {
                stages: self.stages.len(),
            }
        } else {
            BoostingState::Fitted
        };
        log::info!(
            "fitted boosting ensemble of {} stages: train RMSE {:.6}",
            self.stages.len(),
            self.metrics.rmse
        );
        Ok(())
    }

    fn predict(&self, x: ArrayView1<f64>) -> Result<f64> {
        if self.state == BoostingState::Unfit {
            return Err(Error::NotFitted);
        }
        check_features(self.data.n_features(), x)?;
        let lr = self.params.learning_rate;
        self.stages
            .iter()
            .try_fold(0.0, |acc, stage| Ok(acc + lr * stage.predict(x)?))
    }

    fn metrics(&self) -> Metrics {
        self.metrics
    }

    fn n_features(&self) -> usize {
        self.data.n_features()
    }
}
