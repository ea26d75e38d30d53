use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    check_features,
    dataset::Dataset,
    error::Result,
    metrics::{evaluate, Metrics},
    resolve_seed, BoxedEstimator, Error, Estimator, EstimatorFactory,
};

mod node;
pub mod params;
pub mod splitting;
#[cfg(test)]
mod tests;

pub use node::Node;
pub use params::{TreeParams, TreeParamsBuilder};
use splitting::{best_split, partition, sample_features};

/// Binary regression tree grown by greedy variance-reduction splits.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    data: Dataset,
    params: TreeParams,
    seed: u64,
    root: Option<Node>,
    metrics: Metrics,
}

impl RegressionTree {
    pub fn new(data: Dataset, params: TreeParams) -> Result<Self> {
        params.validate()?;
        let seed = resolve_seed(params.seed);
        Ok(Self {
            data,
            params,
            seed,
            root: None,
            metrics: Metrics::default(),
        })
    }

    pub fn factory(params: TreeParams) -> EstimatorFactory {
        crate::factory(move |data| {
            let tree = RegressionTree::new(data, params.clone())?;
            Ok(Box::new(tree) as BoxedEstimator)
        })
    }

    /// The seed actually used, including one derived from the clock.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, Node::depth)
    }

    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, Node::n_leaves)
    }

    /// Pre-order text rendering; empty before `fit`.
    pub fn render(&self) -> String {
        self.root
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Share of internal nodes splitting on each feature. Empty when the tree
    /// has no internal node.
    pub fn feature_importance(&self) -> BTreeMap<usize, f64> {
        let mut counts = BTreeMap::new();
        if let Some(root) = &self.root {
            root.count_splits(&mut counts);
        }
        let total: usize = counts.values().sum();
        if total == 0 {
            return BTreeMap::new();
        }
        counts
            .into_iter()
            .map(|(feature, count)| (feature, count as f64 / total as f64))
            .collect()
    }
}

impl Estimator for RegressionTree {
    fn fit(&mut self) -> Result<()> {
        let mut builder = TreeBuilder {
            x: self.data.x(),
            y: self.data.y(),
            params: &self.params,
            rng: StdRng::seed_from_u64(self.seed),
        };
        let root = builder.grow((0..self.data.n_rows()).collect(), 0);

        let preds = self
            .data
            .x()
            .axis_iter(Axis(0))
            .map(|row| root.predict(row))
            .collect::<Array1<f64>>();
        self.metrics = evaluate(self.data.y(), preds.view());

        log::debug!(
            "fitted regression tree: depth {}, {} leaves, seed {}, train RMSE {:.6}",
            root.depth(),
            root.n_leaves(),
            self.seed,
            self.metrics.rmse
        );
        self.root = Some(root);
        Ok(())
    }

    fn predict(&self, x: ArrayView1<f64>) -> Result<f64> {
        let root = self.root.as_ref().ok_or(Error::NotFitted)?;
        check_features(self.data.n_features(), x)?;
        Ok(root.predict(x))
    }

    fn metrics(&self) -> Metrics {
        self.metrics
    }

    fn n_features(&self) -> usize {
        self.data.n_features()
    }
}

struct TreeBuilder<'a, R> {
    x: ArrayView2<'a, f64>,
    y: ArrayView1<'a, f64>,
    params: &'a TreeParams,
    rng: R,
}

impl<R: Rng> TreeBuilder<'_, R> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> Node {
        if depth >= self.params.max_depth || indices.len() < self.params.min_samples_split {
            return self.leaf(&indices);
        }

        let features = sample_features(&mut self.rng, self.x.ncols(), self.params.max_features);
        let Some(split) = best_split(self.x, self.y, &indices, &features) else {
            return self.leaf(&indices);
        };

        let (left, right) = partition(self.x, &indices, split.feature, split.threshold);
        if left.len() < self.params.min_samples_leaf || right.len() < self.params.min_samples_leaf
        {
            return self.leaf(&indices);
        }

        Node::Internal {
            feature: split.feature,
            threshold: split.threshold,
            n_samples: indices.len(),
            left: Box::new(self.grow(left, depth + 1)),
            right: Box::new(self.grow(right, depth + 1)),
        }
    }

    fn leaf(&self, indices: &[usize]) -> Node {
        let sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        Node::Leaf {
            value: sum / indices.len() as f64,
            n_samples: indices.len(),
        }
    }
}
