use itertools::Itertools;
use ndarray::{ArrayView1, ArrayView2};
use rand::{seq::SliceRandom, Rng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    pub feature: usize,
    pub threshold: f64,
    pub score: f64,
}

/// Shuffles all feature indices and keeps the first `max_features`.
pub fn sample_features<R: Rng + ?Sized>(
    rng: &mut R,
    n_features: usize,
    max_features: Option<usize>,
) -> Vec<usize> {
    let mut features: Vec<usize> = (0..n_features).collect();
    features.shuffle(rng);
    features.truncate(max_features.map_or(n_features, |m| m.min(n_features)));
    features
}

pub fn partition(
    x: ArrayView2<f64>,
    indices: &[usize],
    feature: usize,
    threshold: f64,
) -> (Vec<usize>, Vec<usize>) {
    indices
        .iter()
        .copied()
        .partition(|&i| x[[i, feature]] <= threshold)
}

/// Population variance of the targets at `indices`; zero for an empty set.
pub fn variance(y: ArrayView1<f64>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let n = indices.len() as f64;
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n;
    indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f64>() / n
}

/// Variance of the union minus the size-weighted variance of both sides.
pub fn variance_reduction(
    y: ArrayView1<f64>,
    total_variance: f64,
    left: &[usize],
    right: &[usize],
) -> f64 {
    let (n_left, n_right) = (left.len() as f64, right.len() as f64);
    let weighted =
        (n_left * variance(y, left) + n_right * variance(y, right)) / (n_left + n_right);
    total_variance - weighted
}

/// Scans midpoints between consecutive distinct values of every feature in
/// `features`, in the given order.
///
/// The first scored candidate is taken even when it reduces nothing; a later
/// candidate must score strictly higher to replace it.
pub fn best_split(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    indices: &[usize],
    features: &[usize],
) -> Option<SplitCandidate> {
    let total_variance = variance(y, indices);
    let mut best: Option<SplitCandidate> = None;

    for &feature in features {
        let values = indices
            .iter()
            .map(|&i| x[[i, feature]])
            .sorted_by(f64::total_cmp)
            .dedup()
            .collect_vec();
        if values.len() < 2 {
            continue;
        }

        for (lo, hi) in values.into_iter().tuple_windows() {
            let threshold = (lo + hi) / 2.0;
            let (left, right) = partition(x, indices, feature, threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let score = variance_reduction(y, total_variance, &left, &right);
            if best.map_or(true, |b| score > b.score) {
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }

    best
}
