use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::{check_dim, uniform_point, validate_bounds, Distribution, Revision, Sampleable};
use crate::error::{Result, SamplingError};
use crate::sample::{energy_from_probability, Sample};

/**
Constant density over an axis-aligned box.

The density is `1 / Π(max_i - min_i)` and is returned for every query point; callers
clip to the box. The origin is tracked so the uniform can stand in as a proposal, but it
does not affect the density.

```rust
use mini_sampler::distributions::{Distribution, Sampleable, Uniform};

let mut u = Uniform::new(vec![0.0, 0.0], vec![2.0, 4.0]).unwrap().set_seed(1);
assert_eq!(u.pdf(&[1.0, 1.0]), 0.125);
let s = u.sample().unwrap();
assert!(s.value[1] >= 0.0 && s.value[1] <= 4.0);
```
*/
#[derive(Debug, Clone)]
pub struct Uniform {
    min_coords: Vec<f64>,
    max_coords: Vec<f64>,
    inv_volume: f64,
    origin: Vec<f64>,
    revision: Revision,
    origin_revision: Revision,
    rng: SmallRng,
}

impl Uniform {
    pub fn new(min_coords: Vec<f64>, max_coords: Vec<f64>) -> Result<Self> {
        let dim = min_coords.len();
        let inv_volume = inverse_volume(&min_coords, &max_coords)?;
        Ok(Self {
            min_coords,
            max_coords,
            inv_volume,
            origin: vec![0.0; dim],
            revision: Revision::default(),
            origin_revision: Revision::default(),
            rng: SmallRng::from_entropy(),
        })
    }

    pub fn set_bounds(&mut self, min_coords: Vec<f64>, max_coords: Vec<f64>) -> Result<()> {
        check_dim(self.dim(), min_coords.len())?;
        self.inv_volume = inverse_volume(&min_coords, &max_coords)?;
        self.min_coords = min_coords;
        self.max_coords = max_coords;
        self.revision.bump();
        Ok(())
    }
}

impl Default for Uniform {
    /// The square `[-1, 1]²`.
    fn default() -> Self {
        Self {
            min_coords: vec![-1.0, -1.0],
            max_coords: vec![1.0, 1.0],
            inv_volume: 0.25,
            origin: vec![0.0, 0.0],
            revision: Revision::default(),
            origin_revision: Revision::default(),
            rng: SmallRng::from_entropy(),
        }
    }
}

fn inverse_volume(min: &[f64], max: &[f64]) -> Result<f64> {
    validate_bounds(min.len(), min, max)?;
    let volume: f64 = min.iter().zip(max).map(|(lo, hi)| hi - lo).product();
    if volume > 0.0 && volume.is_finite() {
        Ok(1.0 / volume)
    } else {
        Err(SamplingError::invalid(
            "bounds",
            format!("uniform needs a finite, positive volume, got {volume}"),
        ))
    }
}

impl Distribution for Uniform {
    fn dim(&self) -> usize {
        self.min_coords.len()
    }

    fn pdf(&self, _x: &[f64]) -> f64 {
        self.inv_volume
    }

    fn min_coords(&self) -> Vec<f64> {
        self.min_coords.clone()
    }

    fn max_coords(&self) -> Vec<f64> {
        self.max_coords.clone()
    }

    fn e_min(&self) -> f64 {
        energy_from_probability(self.inv_volume)
    }

    fn e_max(&self) -> f64 {
        self.e_min()
    }

    fn p_max(&self) -> f64 {
        self.inv_volume
    }

    fn p_min(&self) -> f64 {
        self.inv_volume
    }

    fn version(&self) -> u64 {
        self.revision.get()
    }
}

impl Sampleable for Uniform {
    fn sample(&mut self) -> Result<Sample> {
        let x = uniform_point(&mut self.rng, &self.min_coords, &self.max_coords)?;
        Ok(Sample::new(x, self.inv_volume, false))
    }

    fn origin(&self) -> &[f64] {
        &self.origin
    }

    fn set_origin(&mut self, origin: &[f64]) -> Result<()> {
        check_dim(self.dim(), origin.len())?;
        self.origin = origin.to_vec();
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
