//! Statistical checks of the rejection sampler and of mixture targets.

use mini_sampler::core::run;
use mini_sampler::distributions::{Distribution, Gaussian2D, Mixture, Sampleable, Uniform};
use mini_sampler::ks_test::{ks_test, uniform_cdf};
use mini_sampler::samplers::RejectionSampler;
use mini_sampler::stats::{accepted_points, covariance};

const SEED: u64 = 42;

#[test]
fn uniform_proposal_reproduces_uniform_marginals() {
    let target = Uniform::new(vec![-2.0, 0.0], vec![1.0, 0.5]).unwrap();
    let proposal = Uniform::new(vec![-2.0, 0.0], vec![1.0, 0.5])
        .unwrap()
        .set_seed(SEED);
    let mut rs = RejectionSampler::new(target, proposal).set_seed(SEED);
    let samples = run(&mut rs, 3_000).unwrap();
    assert!(samples.iter().all(|s| s.accepted));

    let mut xs: Vec<f64> = samples.iter().map(|s| s.value[0]).collect();
    let mut ys: Vec<f64> = samples.iter().map(|s| s.value[1]).collect();
    let result = ks_test(&mut xs, uniform_cdf(-2.0, 1.0), 0.001).unwrap();
    assert!(!result.is_rejected, "{result:?}");
    let result = ks_test(&mut ys, uniform_cdf(0.0, 0.5), 0.001).unwrap();
    assert!(!result.is_rejected, "{result:?}");
    // and the x marginal is not the y one
    let result = ks_test(&mut xs, uniform_cdf(0.0, 0.5), 0.001).unwrap();
    assert!(result.is_rejected);
}

#[test]
fn accepted_gaussian_draws_match_the_covariance() {
    let cov = ndarray::arr2(&[[0.04, 0.015], [0.015, 0.09]]);
    let target = Gaussian2D::new(cov.clone(), [0.1, -0.1]).unwrap();
    let mut rs = RejectionSampler::new(target, Uniform::default().set_seed(SEED)).set_seed(SEED);
    rs.fit_envelope();

    let samples = run(&mut rs, 100_000).unwrap();
    let points = accepted_points(&samples).unwrap();
    assert!(points.nrows() > 3_000, "only {} accepted", points.nrows());

    let empirical = covariance(&points).unwrap();
    for ((i, j), &c) in cov.indexed_iter() {
        assert!(
            (empirical[(i, j)] - c).abs() < 0.01,
            "covariance {empirical} vs {cov}"
        );
    }
    let mean = points.mean_axis(ndarray::Axis(0)).unwrap();
    assert!((mean[0] - 0.1).abs() < 0.02 && (mean[1] + 0.1).abs() < 0.02, "mean {mean}");
}

#[test]
fn mixture_modes_receive_their_weight() {
    let mut left = Gaussian2D::isotropic(0.15).unwrap();
    let mut right = Gaussian2D::isotropic(0.15).unwrap();
    left.set_origin(&[-0.5, 0.0]).unwrap();
    right.set_origin(&[0.5, 0.0]).unwrap();
    let mixture = Mixture::new(vec![Box::new(left), Box::new(right)], vec![1.0, 3.0]).unwrap();
    assert_eq!(mixture.min_coords(), vec![-1.0, -1.0]);

    let mut rs = RejectionSampler::new(mixture, Uniform::default().set_seed(SEED)).set_seed(SEED);
    rs.fit_envelope();
    let samples = run(&mut rs, 60_000).unwrap();
    let accepted: Vec<_> = samples.iter().filter(|s| s.accepted).collect();
    assert!(accepted.len() > 1_500);

    let left_share =
        accepted.iter().filter(|s| s.value[0] < 0.0).count() as f64 / accepted.len() as f64;
    assert!((left_share - 0.25).abs() < 0.04, "left share {left_share}");
}
