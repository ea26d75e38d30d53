use std::{collections::BTreeMap, fmt};

use ndarray::ArrayView1;

/// A node of a fitted regression tree. Internal nodes own both children.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Internal {
        feature: usize,
        threshold: f64,
        n_samples: usize,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Walks to a leaf, going left when `x[feature] <= threshold`.
    pub fn predict(&self, x: ArrayView1<f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { value, .. } => return *value,
                Node::Internal {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Number of training rows that reached this node.
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Leaf { n_samples, .. } | Node::Internal { n_samples, .. } => *n_samples,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    pub(crate) fn count_splits(&self, counts: &mut BTreeMap<usize, usize>) {
        if let Node::Internal {
            feature,
            left,
            right,
            ..
        } = self
        {
            *counts.entry(*feature).or_insert(0) += 1;
            left.count_splits(counts);
            right.count_splits(counts);
        }
    }

    fn write_preorder(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Node::Leaf { value, .. } => writeln!(f, "{}Leaf: {:.4}", indent, value),
            Node::Internal {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                writeln!(f, "{}[Feature {} <= {:.4}]", indent, feature, threshold)?;
                left.write_preorder(f, depth + 1)?;
                right.write_preorder(f, depth + 1)
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_preorder(f, 0)
    }
}
