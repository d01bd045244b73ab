use std::f64::consts::PI;

use ndarray::{arr2, Array2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::{
    check_dim, in_bounds, validate_bounds, Distribution, Revision, Sampleable, DEFAULT_MAX_RETRIES,
};
use crate::error::{Result, SamplingError};
use crate::linalg::{check_square_2x2, Cholesky2};
use crate::sample::{probability_from_energy, Sample};

/// Standard deviation of the default isotropic proposal kernel.
pub const DEFAULT_PROPOSAL_STD: f64 = 0.1;

/**
A 2D Gaussian parameterized by a covariance matrix and an origin, clipped to a box.

The Cholesky factor of the covariance, its inverse and the log normalizer are cached and
recomputed on every covariance assignment. `energy(x) = ½‖L⁻¹(x - origin)‖² - log_inv_partition`
with `log_inv_partition = -½·ln((2π)²·det Σ)`, so the unclipped density integrates to one.
For the identity covariance `energy(origin) = ln 2π`.

This is not the form `‖L⁻¹(x - origin)‖² - ½·ln(2π·det Σ)` found in some visualizers, which
drops the ½ on the quadratic term and one factor of 2π. That form does not integrate to
one, so its densities disagree with this type's by a position-dependent factor.

Used as the proposal kernel of the MCMC samplers: [`Sampleable::set_origin`] recenters it
without touching the cached factorization.

# Examples

```rust
use mini_sampler::distributions::{Distribution, Gaussian2D};
use ndarray::arr2;

let g = Gaussian2D::new(arr2(&[[1.0, 0.0], [0.0, 1.0]]), [0.0, 0.0]).unwrap();
let p = g.pdf(&[0.0, 0.0]);
assert!((p - 1.0 / (2.0 * std::f64::consts::PI)).abs() < 1e-12);
assert_eq!(g.energy(&[0.0, 0.0]), -g.log_inv_partition());

// Non positive-definite covariances are rejected.
assert!(Gaussian2D::new(arr2(&[[1.0, 2.0], [2.0, 1.0]]), [0.0, 0.0]).is_err());
```
*/
#[derive(Debug, Clone)]
pub struct Gaussian2D {
    cov: Array2<f64>,
    chol: Cholesky2,
    log_inv_partition: f64,
    origin: Vec<f64>,
    min_coords: Vec<f64>,
    max_coords: Vec<f64>,
    max_retries: usize,
    revision: Revision,
    origin_revision: Revision,
    rng: SmallRng,
}

impl Gaussian2D {
    /// Creates a Gaussian over the default box `[-1, 1]²`.
    pub fn new(cov: Array2<f64>, origin: [f64; 2]) -> Result<Self> {
        let (chol, log_inv_partition) = factorize(&cov)?;
        Ok(Self {
            cov,
            chol,
            log_inv_partition,
            origin: origin.to_vec(),
            min_coords: vec![-1.0, -1.0],
            max_coords: vec![1.0, 1.0],
            max_retries: DEFAULT_MAX_RETRIES,
            revision: Revision::default(),
            origin_revision: Revision::default(),
            rng: SmallRng::from_entropy(),
        })
    }

    /// A Gaussian with covariance `std²·I` centered at the origin.
    pub fn isotropic(std: f64) -> Result<Self> {
        Self::new(isotropic_cov(std)?, [0.0, 0.0])
    }

    pub fn with_bounds(mut self, min_coords: Vec<f64>, max_coords: Vec<f64>) -> Result<Self> {
        self.set_bounds(min_coords, max_coords)?;
        Ok(self)
    }

    /// Caps the number of out-of-bounds redraws in [`Sampleable::sample`].
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Replaces the covariance. On error the previous covariance is kept.
    pub fn set_covariance(&mut self, cov: Array2<f64>) -> Result<()> {
        let (chol, log_inv_partition) = factorize(&cov)?;
        self.cov = cov;
        self.chol = chol;
        self.log_inv_partition = log_inv_partition;
        self.revision.bump();
        Ok(())
    }

    /// Makes the Gaussian isotropic with standard deviation `std`, keeping the origin.
    pub fn set_std(&mut self, std: f64) -> Result<()> {
        self.set_covariance(isotropic_cov(std)?)
    }

    pub fn set_bounds(&mut self, min_coords: Vec<f64>, max_coords: Vec<f64>) -> Result<()> {
        validate_bounds(2, &min_coords, &max_coords)?;
        self.min_coords = min_coords;
        self.max_coords = max_coords;
        self.revision.bump();
        Ok(())
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.cov
    }

    pub fn cholesky(&self) -> &Cholesky2 {
        &self.chol
    }

    /// `-½·ln((2π)²·det Σ)`, the log of the normalizing constant.
    pub fn log_inv_partition(&self) -> f64 {
        self.log_inv_partition
    }

    fn offset(&self, x: &[f64]) -> [f64; 2] {
        [x[0] - self.origin[0], x[1] - self.origin[1]]
    }
}

impl Default for Gaussian2D {
    /// The isotropic proposal kernel with standard deviation 0.1.
    fn default() -> Self {
        let std = DEFAULT_PROPOSAL_STD;
        let chol = Cholesky2::diagonal(std, std);
        let log_inv_partition = -(2.0 * PI).ln() - 0.5 * chol.log_det();
        Self {
            cov: chol.reconstruct(),
            chol,
            log_inv_partition,
            origin: vec![0.0, 0.0],
            min_coords: vec![-1.0, -1.0],
            max_coords: vec![1.0, 1.0],
            max_retries: DEFAULT_MAX_RETRIES,
            revision: Revision::default(),
            origin_revision: Revision::default(),
            rng: SmallRng::from_entropy(),
        }
    }
}

fn isotropic_cov(std: f64) -> Result<Array2<f64>> {
    if !(std > 0.0 && std.is_finite()) {
        return Err(SamplingError::invalid(
            "std",
            format!("standard deviation must be positive and finite, got {std}"),
        ));
    }
    let var = std * std;
    Ok(arr2(&[[var, 0.0], [0.0, var]]))
}

fn factorize(cov: &Array2<f64>) -> Result<(Cholesky2, f64)> {
    let chol = Cholesky2::decompose(cov)?;
    // ln((2π)² det Σ) / 2 = ln(2π) + ln(det Σ) / 2
    let log_inv_partition = -(2.0 * PI).ln() - 0.5 * chol.log_det();
    Ok((chol, log_inv_partition))
}

impl Distribution for Gaussian2D {
    fn dim(&self) -> usize {
        2
    }

    fn pdf(&self, x: &[f64]) -> f64 {
        probability_from_energy(self.energy(x))
    }

    fn energy(&self, x: &[f64]) -> f64 {
        let z = self.chol.whiten(self.offset(x));
        0.5 * (z[0] * z[0] + z[1] * z[1]) - self.log_inv_partition
    }

    fn min_coords(&self) -> Vec<f64> {
        self.min_coords.clone()
    }

    fn max_coords(&self) -> Vec<f64> {
        self.max_coords.clone()
    }

    fn e_min(&self) -> f64 {
        self.energy(&self.origin)
    }

    fn version(&self) -> u64 {
        self.revision.get()
    }
}

impl Sampleable for Gaussian2D {
    fn sample(&mut self) -> Result<Sample> {
        for _ in 0..self.max_retries {
            let z = [
                self.rng.sample(StandardNormal),
                self.rng.sample(StandardNormal),
            ];
            let lz = self.chol.apply(z);
            let x = vec![lz[0] + self.origin[0], lz[1] + self.origin[1]];
            if in_bounds(&x, &self.min_coords, &self.max_coords) {
                let p = self.pdf(&x);
                return Ok(Sample::new(x, p, false));
            }
        }
        Err(SamplingError::DomainStall {
            attempts: self.max_retries,
        })
    }

    fn origin(&self) -> &[f64] {
        &self.origin
    }

    fn set_origin(&mut self, origin: &[f64]) -> Result<()> {
        check_dim(2, origin.len())?;
        self.origin.copy_from_slice(origin);
        self.origin_revision.bump();
        Ok(())
    }

    fn origin_version(&self) -> u64 {
        self.origin_revision.get()
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
}

/**
A 2D Gaussian bump whose shape is given directly by a precision-like transform `T`.

`pdf(x) = exp(-Δᵀ·T·Δ) / √(2π·det T)` with `Δ = x - origin`. The expression is kept as
is, so the surface is not a normalized density for arbitrary `T`; it serves as a target
whose peak height grows with the transform.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionGaussian2D {
    transform: Array2<f64>,
    origin: Vec<f64>,
    min_coords: Vec<f64>,
    max_coords: Vec<f64>,
    revision: Revision,
}

impl PrecisionGaussian2D {
    pub fn new(transform: Array2<f64>, origin: [f64; 2]) -> Result<Self> {
        check_transform(&transform)?;
        Ok(Self {
            transform,
            origin: origin.to_vec(),
            min_coords: vec![-1.0, -1.0],
            max_coords: vec![1.0, 1.0],
            revision: Revision::default(),
        })
    }

    pub fn with_bounds(mut self, min_coords: Vec<f64>, max_coords: Vec<f64>) -> Result<Self> {
        self.set_bounds(min_coords, max_coords)?;
        Ok(self)
    }

    pub fn set_transform(&mut self, transform: Array2<f64>) -> Result<()> {
        check_transform(&transform)?;
        self.transform = transform;
        self.revision.bump();
        Ok(())
    }

    pub fn set_origin(&mut self, origin: [f64; 2]) {
        self.origin = origin.to_vec();
        self.revision.bump();
    }

    pub fn set_bounds(&mut self, min_coords: Vec<f64>, max_coords: Vec<f64>) -> Result<()> {
        validate_bounds(2, &min_coords, &max_coords)?;
        self.min_coords = min_coords;
        self.max_coords = max_coords;
        self.revision.bump();
        Ok(())
    }

    pub fn transform(&self) -> &Array2<f64> {
        &self.transform
    }

    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    fn det(&self) -> f64 {
        let t = &self.transform;
        t[(0, 0)] * t[(1, 1)] - t[(0, 1)] * t[(1, 0)]
    }
}

impl Default for PrecisionGaussian2D {
    fn default() -> Self {
        Self {
            transform: arr2(&[[10.0, 0.0], [0.0, 10.0]]),
            origin: vec![0.0, 0.0],
            min_coords: vec![-1.0, -1.0],
            max_coords: vec![1.0, 1.0],
            revision: Revision::default(),
        }
    }
}

fn check_transform(t: &Array2<f64>) -> Result<()> {
    check_square_2x2(t)?;
    let det = t[(0, 0)] * t[(1, 1)] - t[(0, 1)] * t[(1, 0)];
    if !(t[(0, 0)] > 0.0) {
        return Err(SamplingError::NotPositiveDefinite {
            pivot: 0,
            value: t[(0, 0)],
        });
    }
    if !(det > 0.0) {
        return Err(SamplingError::NotPositiveDefinite { pivot: 1, value: det });
    }
    Ok(())
}

impl Distribution for PrecisionGaussian2D {
    fn dim(&self) -> usize {
        2
    }

    fn pdf(&self, x: &[f64]) -> f64 {
        let d = [x[0] - self.origin[0], x[1] - self.origin[1]];
        let t = &self.transform;
        let quad = d[0] * (t[(0, 0)] * d[0] + t[(0, 1)] * d[1])
            + d[1] * (t[(1, 0)] * d[0] + t[(1, 1)] * d[1]);
        (-quad).exp() / (2.0 * PI * self.det()).sqrt()
    }

    fn min_coords(&self) -> Vec<f64> {
        self.min_coords.clone()
    }

    fn max_coords(&self) -> Vec<f64> {
        self.max_coords.clone()
    }

    fn e_min(&self) -> f64 {
        self.energy(&self.origin)
    }

    fn version(&self) -> u64 {
        self.revision.get()
    }
}
