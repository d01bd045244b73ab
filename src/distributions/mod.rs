/*!
Target and proposal distributions over bounded, axis-aligned boxes.

Every distribution implements [`Distribution`]: density, energy (`-ln density`), domain
bounds and density/energy extrema. Distributions that can draw points from themselves
additionally implement [`Sampleable`], which adds a movable origin used to recenter
proposal kernels.

Instead of pushing change events to listeners, each distribution carries version
counters. A renderer remembers the last version it saw and polls
[`Distribution::changed_since`]; recentring a [`Sampleable`] bumps the separate
[`Sampleable::origin_version`] so cheap re-highlighting can be told apart from full
geometry changes.

# Examples

```rust
use mini_sampler::distributions::{Distribution, Gaussian2D, Sampleable, Uniform};

let uniform = Uniform::new(vec![-1.0, -1.0], vec![1.0, 1.0]).unwrap();
assert_eq!(uniform.pdf(&[0.3, -0.2]), 0.25);

let mut proposal = Gaussian2D::isotropic(0.1).unwrap().set_seed(7);
let seen = proposal.origin_version();
proposal.set_origin(&[0.5, 0.5]).unwrap();
assert_ne!(proposal.origin_version(), seen);

let s = proposal.sample().unwrap();
assert!(!s.accepted);
```
*/

mod banana;
mod gaussian;
mod mixture;
mod uniform;

pub use banana::Banana2D;
pub use gaussian::{Gaussian2D, PrecisionGaussian2D};
pub use mixture::Mixture;
pub use uniform::Uniform;

use rand::Rng;

use crate::error::{Result, SamplingError};
use crate::sample::{energy_from_probability, probability_from_energy, Sample};

/// Default cap on domain-clipping retries inside [`Sampleable::sample`].
pub const DEFAULT_MAX_RETRIES: usize = 1_000_000;

/// A density over the box `[min_coords, max_coords]`.
pub trait Distribution {
    fn dim(&self) -> usize;

    /// Density at `x`. No domain check is performed.
    fn pdf(&self, x: &[f64]) -> f64;

    /// `-ln pdf(x)`; zero density yields `+∞`.
    fn energy(&self, x: &[f64]) -> f64 {
        energy_from_probability(self.pdf(x))
    }

    fn min_coords(&self) -> Vec<f64>;

    fn max_coords(&self) -> Vec<f64>;

    /// Lowest energy over the domain (the density peak).
    fn e_min(&self) -> f64;

    /// Highest energy over the domain, evaluated at the `2^dim` corners of the box.
    fn e_max(&self) -> f64 {
        corner_energy_max(self)
    }

    fn p_max(&self) -> f64 {
        probability_from_energy(self.e_min())
    }

    fn p_min(&self) -> f64 {
        probability_from_energy(self.e_max())
    }

    /// Counter bumped by every parameter change.
    fn version(&self) -> u64;

    fn changed_since(&self, version: u64) -> bool {
        self.version() != version
    }
}

/// A distribution that can draw points from itself and be recentered.
pub trait Sampleable: Distribution {
    /// Draws one in-bounds point. The returned sample is never accepted and carries
    /// this distribution's density at the draw.
    fn sample(&mut self) -> Result<Sample>;

    fn origin(&self) -> &[f64];

    fn set_origin(&mut self, origin: &[f64]) -> Result<()>;

    /// Counter bumped by every call to [`Sampleable::set_origin`].
    fn origin_version(&self) -> u64;

    /// Reseeds the random number generator in place.
    fn reseed(&mut self, seed: u64);

    /// Returns this distribution with its random number generator seeded by `seed`.
    fn set_seed(mut self, seed: u64) -> Self
    where
        Self: Sized,
    {
        self.reseed(seed);
        self
    }
}

impl<D: Distribution + ?Sized> Distribution for Box<D> {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn pdf(&self, x: &[f64]) -> f64 {
        (**self).pdf(x)
    }

    fn energy(&self, x: &[f64]) -> f64 {
        (**self).energy(x)
    }

    fn min_coords(&self) -> Vec<f64> {
        (**self).min_coords()
    }

    fn max_coords(&self) -> Vec<f64> {
        (**self).max_coords()
    }

    fn e_min(&self) -> f64 {
        (**self).e_min()
    }

    fn e_max(&self) -> f64 {
        (**self).e_max()
    }

    fn p_max(&self) -> f64 {
        (**self).p_max()
    }

    fn p_min(&self) -> f64 {
        (**self).p_min()
    }

    fn version(&self) -> u64 {
        (**self).version()
    }
}

impl<S: Sampleable + ?Sized> Sampleable for Box<S> {
    fn sample(&mut self) -> Result<Sample> {
        (**self).sample()
    }

    fn origin(&self) -> &[f64] {
        (**self).origin()
    }

    fn set_origin(&mut self, origin: &[f64]) -> Result<()> {
        (**self).set_origin(origin)
    }

    fn origin_version(&self) -> u64 {
        (**self).origin_version()
    }

    fn reseed(&mut self, seed: u64) {
        (**self).reseed(seed)
    }
}

/// Monotonic change counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Revision(u64);

impl Revision {
    pub(crate) fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub(crate) fn advance(&mut self, by: u64) {
        self.0 = self.0.wrapping_add(by);
    }

    pub(crate) fn get(self) -> u64 {
        self.0
    }
}

/// Checks that both bound vectors have length `dim` and that `min[i] <= max[i]`.
pub(crate) fn validate_bounds(dim: usize, min: &[f64], max: &[f64]) -> Result<()> {
    for found in [min.len(), max.len()] {
        if found != dim {
            return Err(SamplingError::DimensionMismatch {
                expected: dim,
                found,
            });
        }
    }
    for (axis, (&lo, &hi)) in min.iter().zip(max).enumerate() {
        if !(lo <= hi) {
            return Err(SamplingError::InvalidBounds {
                axis,
                min: lo,
                max: hi,
            });
        }
    }
    Ok(())
}

pub(crate) fn check_dim(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SamplingError::DimensionMismatch { expected, found })
    }
}

pub(crate) fn in_bounds(x: &[f64], min: &[f64], max: &[f64]) -> bool {
    x.iter()
        .zip(min.iter().zip(max))
        .all(|(&v, (&lo, &hi))| v >= lo && v <= hi)
}

/// Draws a point uniformly from the box `[min, max]`. Every axis must have finite
/// endpoints and a finite width.
pub fn uniform_point<R: Rng>(rng: &mut R, min: &[f64], max: &[f64]) -> Result<Vec<f64>> {
    min.iter()
        .zip(max)
        .enumerate()
        .map(|(axis, (&lo, &hi))| {
            if !(lo.is_finite() && hi.is_finite() && (hi - lo).is_finite()) {
                Err(SamplingError::InvalidBounds {
                    axis,
                    min: lo,
                    max: hi,
                })
            } else if lo < hi {
                Ok(rng.gen_range(lo..hi))
            } else {
                Ok(lo)
            }
        })
        .collect()
}

/// Maximum energy over all corners of the distribution's box.
pub fn corner_energy_max<D: Distribution + ?Sized>(dist: &D) -> f64 {
    let dim = dist.dim();
    let (min, max) = (dist.min_coords(), dist.max_coords());
    let mut corner = vec![0.0; dim];
    (0..1usize << dim)
        .map(|mask| {
            for (j, c) in corner.iter_mut().enumerate() {
                *c = if (mask >> j) & 1 == 1 { min[j] } else { max[j] };
            }
            dist.energy(&corner)
        })
        .fold(f64::NEG_INFINITY, f64::max)
}
