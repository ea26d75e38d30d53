use approx::assert_abs_diff_eq;
use ndarray::{array, ArrayView1, ArrayView2, Axis};

use super::*;
use crate::synthetic::friedman1;

fn staircase() -> Dataset {
    Dataset::from_rows(
        &[vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
        &[10.0, 20.0, 30.0, 40.0],
    )
    .unwrap()
}

fn fitted(data: Dataset, params: TreeParams) -> RegressionTree {
    let mut tree = RegressionTree::new(data, params).unwrap();
    tree.fit().unwrap();
    tree
}

/// Collects the training rows reaching each leaf, keyed by pre-order leaf id.
fn route_rows(root: &Node, x: ArrayView2<f64>) -> Vec<Vec<usize>> {
    fn leaf_id(node: &Node, row: ArrayView1<f64>, offset: usize) -> usize {
        match node {
            Node::Leaf { .. } => offset,
            Node::Internal {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                if row[*feature] <= *threshold {
                    leaf_id(left, row, offset)
                } else {
                    leaf_id(right, row, offset + left.n_leaves())
                }
            }
        }
    }

    let mut leaves = vec![Vec::new(); root.n_leaves()];
    for (i, row) in x.axis_iter(Axis(0)).enumerate() {
        leaves[leaf_id(root, row, 0)].push(i);
    }
    leaves
}

fn leaf_values(node: &Node, out: &mut Vec<(f64, usize)>) {
    match node {
        Node::Leaf { value, n_samples } => out.push((*value, *n_samples)),
        Node::Internal { left, right, .. } => {
            leaf_values(left, out);
            leaf_values(right, out);
        }
    }
}

fn assert_partitioned(node: &Node) {
    if let Node::Internal {
        n_samples,
        left,
        right,
        ..
    } = node
    {
        assert!(left.n_samples() > 0 && right.n_samples() > 0);
        assert_eq!(left.n_samples() + right.n_samples(), *n_samples);
        assert_partitioned(left);
        assert_partitioned(right);
    }
}

#[test]
fn test_staircase_splits_at_midpoint() {
    let params = TreeParamsBuilder::new()
        .max_depth(2)
        .min_samples_split(2)
        .min_samples_leaf(1)
        .seed(42)
        .build();
    let tree = fitted(staircase(), params);

    match tree.root().unwrap() {
        Node::Internal {
            feature, threshold, ..
        } => {
            assert_eq!(*feature, 0);
            assert_eq!(*threshold, 2.5);
        }
        Node::Leaf { .. } => panic!("root should split"),
    }
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.n_leaves(), 4);
    assert_eq!(tree.predict(array![2.0].view()).unwrap(), 20.0);
    assert_eq!(tree.predict(array![3.5].view()).unwrap(), 30.0);
    assert_abs_diff_eq!(tree.metrics().r2, 1.0);
}

#[test]
fn test_render_is_preorder() {
    let params = TreeParamsBuilder::new().max_depth(2).seed(1).build();
    let tree = fitted(staircase(), params);
    let expected = "\
[Feature 0 <= 2.5000]
  [Feature 0 <= 1.5000]
    Leaf: 10.0000
    Leaf: 20.0000
  [Feature 0 <= 3.5000]
    Leaf: 30.0000
    Leaf: 40.0000
";
    assert_eq!(tree.render(), expected);
}

#[test]
fn test_same_seed_same_tree() {
    let data = friedman1(200, 8, 0.5, 3).unwrap();
    let params = TreeParamsBuilder::new()
        .max_depth(6)
        .max_features(3)
        .seed(42)
        .build();
    let a = fitted(data.clone(), params.clone());
    let b = fitted(data.clone(), params);

    assert_eq!(a.root(), b.root());
    let pa = a.predict_batch(data.x()).unwrap();
    let pb = b.predict_batch(data.x()).unwrap();
    assert_eq!(pa, pb);
}

#[test]
fn test_refit_reproduces_tree() {
    let data = friedman1(100, 6, 0.5, 9).unwrap();
    let params = TreeParamsBuilder::new().max_features(2).seed(5).build();
    let mut tree = fitted(data, params);
    let first = tree.root().cloned();
    tree.fit().unwrap();
    assert_eq!(tree.root().cloned(), first);
}

#[test]
fn test_feature_sampling_depends_on_seed() {
    let data = friedman1(200, 10, 0.5, 11).unwrap();
    let trees: Vec<Node> = (0..5)
        .map(|seed| {
            let params = TreeParamsBuilder::new()
                .max_depth(4)
                .max_features(1)
                .seed(seed)
                .build();
            fitted(data.clone(), params).root().cloned().unwrap()
        })
        .collect();
    assert!(trees.iter().any(|t| t != &trees[0]));
}

#[test]
fn test_partition_and_leaf_means() {
    let data = friedman1(150, 5, 1.0, 21).unwrap();
    let params = TreeParamsBuilder::new()
        .max_depth(5)
        .min_samples_leaf(3)
        .seed(8)
        .build();
    let tree = fitted(data.clone(), params);
    let root = tree.root().unwrap();

    assert_eq!(root.n_samples(), data.n_rows());
    assert_partitioned(root);

    let routed = route_rows(root, data.x());
    let mut leaves = Vec::new();
    leaf_values(root, &mut leaves);
    assert_eq!(routed.iter().map(Vec::len).sum::<usize>(), data.n_rows());

    for (rows, (value, n_samples)) in routed.iter().zip(leaves) {
        assert_eq!(rows.len(), n_samples);
        assert!(rows.len() >= 3);
        let mean = rows.iter().map(|&i| data.y()[i]).sum::<f64>() / rows.len() as f64;
        assert_abs_diff_eq!(value, mean, epsilon = 1e-9);
    }
}

#[test]
fn test_xor_splits_without_first_level_gain() {
    let data = Dataset::from_rows(
        &[vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
        &[0.0, 1.0, 1.0, 0.0],
    )
    .unwrap();
    let params = TreeParamsBuilder::new().max_depth(2).seed(1).build();
    let tree = fitted(data, params);

    match tree.root().unwrap() {
        Node::Internal { threshold, .. } => assert_eq!(*threshold, 0.5),
        Node::Leaf { .. } => panic!("root should split"),
    }
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.predict(array![0.0, 1.0].view()).unwrap(), 1.0);
    assert_eq!(tree.predict(array![1.0, 1.0].view()).unwrap(), 0.0);
    assert_abs_diff_eq!(tree.metrics().r2, 1.0);
}

#[test]
fn test_identical_rows_make_a_single_leaf() {
    let data = Dataset::from_rows(
        &[vec![1.0, 2.0], vec![1.0, 2.0], vec![1.0, 2.0]],
        &[1.0, 2.0, 6.0],
    )
    .unwrap();
    let tree = fitted(data, TreeParams::default());
    assert_eq!(
        tree.root(),
        Some(&Node::Leaf {
            value: 3.0,
            n_samples: 3
        })
    );
    assert!(tree.feature_importance().is_empty());
}

#[test]
fn test_min_samples_split_and_depth_stop() {
    let params = TreeParamsBuilder::new().min_samples_split(5).seed(0).build();
    let tree = fitted(staircase(), params);
    assert!(tree.root().unwrap().is_leaf());
    assert_eq!(tree.predict(array![100.0].view()).unwrap(), 25.0);

    let params = TreeParamsBuilder::new().max_depth(0).seed(0).build();
    let tree = fitted(staircase(), params);
    assert!(tree.root().unwrap().is_leaf());
}

#[test]
fn test_min_samples_leaf_blocks_unbalanced_split() {
    let data = Dataset::from_rows(
        &[vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
        &[0.0, 0.0, 0.0, 100.0],
    )
    .unwrap();
    let params = TreeParamsBuilder::new()
        .max_depth(1)
        .min_samples_leaf(2)
        .seed(0)
        .build();
    let tree = fitted(data, params);
    // The best split isolates the last row, which leaves a single-row side.
    assert!(tree.root().unwrap().is_leaf());
}

#[test]
fn test_single_split_importance() {
    let data = Dataset::from_rows(
        &[
            vec![0.0, 7.0, 1.0],
            vec![0.0, 7.0, 2.0],
            vec![0.0, 7.0, 3.0],
            vec![0.0, 7.0, 4.0],
        ],
        &[1.0, 1.0, 5.0, 5.0],
    )
    .unwrap();
    let params = TreeParamsBuilder::new().max_depth(1).seed(0).build();
    let tree = fitted(data, params);
    let importance = tree.feature_importance();
    assert_eq!(importance.len(), 1);
    assert_eq!(importance[&2], 1.0);
}

#[test]
fn test_importance_sums_to_one() {
    let data = friedman1(300, 7, 0.5, 4).unwrap();
    let tree = fitted(data, TreeParamsBuilder::new().max_depth(6).seed(2).build());
    let total: f64 = tree.feature_importance().values().sum();
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
}

#[test]
fn test_predict_errors() {
    let tree = RegressionTree::new(staircase(), TreeParams::default()).unwrap();
    assert!(matches!(
        tree.predict(array![1.0].view()),
        Err(Error::NotFitted)
    ));
    assert_eq!(tree.metrics(), Metrics::default());
    assert_eq!(tree.render(), "");

    let tree = fitted(staircase(), TreeParams::default());
    assert!(matches!(
        tree.predict(array![1.0, 2.0].view()),
        Err(Error::DimensionMismatch {
            expected: 1,
            found: 2
        })
    ));
}

#[test]
fn test_zero_max_features_rejected() {
    let params = TreeParamsBuilder::new().max_features(0).build();
    assert!(matches!(
        RegressionTree::new(staircase(), params),
        Err(Error::InvalidParameter { .. })
    ));
}

#[test]
fn test_seed_is_recorded() {
    let tree = RegressionTree::new(staircase(), TreeParamsBuilder::new().seed(77).build()).unwrap();
    assert_eq!(tree.seed(), 77);

    let tree = RegressionTree::new(staircase(), TreeParams::default()).unwrap();
    let replay = RegressionTree::new(
        staircase(),
        TreeParamsBuilder::new().seed(tree.seed()).build(),
    )
    .unwrap();
    assert_eq!(replay.seed(), tree.seed());
}
