use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct BaggingParams {
    pub n_estimators: usize,
    pub seed: Option<u64>,
}

impl BaggingParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(Error::invalid_parameter(
                "n_estimators",
                "bagging needs at least one estimator",
            ));
        }
        Ok(())
    }
}

// Builder for BaggingParams
#[derive(Debug, Clone)]
pub struct BaggingParamsBuilder {
    n_estimators: usize,
    seed: Option<u64>,
}

impl BaggingParamsBuilder {
    pub fn new() -> Self {
        Self {
            n_estimators: 10,
            seed: None,
        }
    }

    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> BaggingParams {
        BaggingParams {
            n_estimators: self.n_estimators,
            seed: self.seed,
        }
    }
}

impl Default for BaggingParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for BaggingParams {
    fn default() -> Self {
        BaggingParamsBuilder::new().build()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoostingParams {
    pub n_estimators: usize,
    /// Shrinkage applied to every stage's prediction.
    pub learning_rate: f64,
    /// Relative SSR change below which boosting stops early.
    pub tolerance: f64,
}

impl BoostingParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(Error::invalid_parameter(
                "n_estimators",
                "boosting needs at least one stage",
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::invalid_parameter(
                "learning_rate",
                format!("must be finite and positive, got {}", self.learning_rate),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(Error::invalid_parameter(
                "tolerance",
                format!("must be finite and non-negative, got {}", self.tolerance),
            ));
        }
        Ok(())
    }
}

// Builder for BoostingParams
#[derive(Debug, Clone)]
pub struct BoostingParamsBuilder {
    n_estimators: usize,
    learning_rate: f64,
    tolerance: f64,
}

impl BoostingParamsBuilder {
    pub fn new() -> Self {
        Self {
            n_estimators: 10,
            learning_rate: 0.1,
            tolerance: 5e-4,
        }
    }

    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn build(self) -> BoostingParams {
        BoostingParams {
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            tolerance: self.tolerance,
        }
    }
}

impl Default for BoostingParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for BoostingParams {
    fn default() -> Self {
        BoostingParamsBuilder::new().build()
    }
}
