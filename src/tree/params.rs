use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; all of them when `None`.
    pub max_features: Option<usize>,
    /// Derived from the current time when `None`.
    pub seed: Option<u64>,
}

impl TreeParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_features == Some(0) {
            return Err(Error::invalid_parameter(
                "max_features",
                "must consider at least one feature",
            ));
        }
        Ok(())
    }
}

// Builder for TreeParams
#[derive(Debug, Clone)]
pub struct TreeParamsBuilder {
    max_depth: usize,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: Option<usize>,
    seed: Option<u64>,
}

impl TreeParamsBuilder {
    pub fn new() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: None,
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    pub fn min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    pub fn max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            seed: self.seed,
        }
    }
}

impl Default for TreeParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParamsBuilder::new().build()
    }
}
