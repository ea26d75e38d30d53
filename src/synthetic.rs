//! Seeded synthetic regression problems.

use std::f64::consts::PI;

use ndarray::{Array1, Array2};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    dataset::Dataset,
    error::{Error, Result},
};

/// Friedman #1 problem:
/// `y = 10 sin(pi x0 x1) + 20 (x2 - 0.5)^2 + 10 x3 + 5 x4 + noise`.
///
/// Features are uniform on `[0, 1)`; columns past the fifth carry no signal.
/// `noise` is the half-width of the uniform noise term.
pub fn friedman1(n_samples: usize, n_features: usize, noise: f64, seed: u64) -> Result<Dataset> {
    if n_features < 5 {
        return Err(Error::invalid_parameter(
            "n_features",
            format!("friedman1 needs at least 5 features, got {}", n_features),
        ));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n_samples, n_features), |_| rng.gen::<f64>());
    let y = x
        .rows()
        .into_iter()
        .map(|r| {
            10.0 * (PI * r[0] * r[1]).sin()
                + 20.0 * (r[2] - 0.5).powi(2)
                + 10.0 * r[3]
                + 5.0 * r[4]
                + uniform_noise(&mut rng, noise)
        })
        .collect::<Array1<f64>>();
    Dataset::new(x, y)
}

/// `y = x . coefficients + noise` with features uniform on `[-1, 1)`.
pub fn linear(n_samples: usize, coefficients: &[f64], noise: f64, seed: u64) -> Result<Dataset> {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n_samples, coefficients.len()), |_| {
        rng.gen_range(-1.0..1.0)
    });
    let w = Array1::from(coefficients.to_vec());
    let mut y = x.dot(&w);
    y.mapv_inplace(|v| v + uniform_noise(&mut rng, noise));
    Dataset::new(x, y)
}

fn uniform_noise<R: Rng + ?Sized>(rng: &mut R, noise: f64) -> f64 {
    if noise > 0.0 {
        rng.gen_range(-noise..noise)
    } else {
        0.0
    }
}
