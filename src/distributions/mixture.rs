use super::{check_dim, Distribution, Revision};
use crate::error::{Result, SamplingError};
use crate::sample::energy_from_probability;

/**
A weighted sum of component distributions sharing one dimensionality.

Weights are normalized to sum to one whenever they are assigned. The mixture has its own
origin: `pdf(x) = Σ wᵢ·pdfᵢ(x - origin)`. Its bounds are the elementwise union of the
components' bounds.

`p_max`/`p_min` take the largest/smallest weighted component extremum. This is an
approximation rather than a bound: the true maximum of a mixture can lie where no single
component peaks.

```rust
use mini_sampler::distributions::{Distribution, Gaussian2D, Mixture, Uniform};

let mixture = Mixture::new(
    vec![
        Box::new(Uniform::default()) as Box<dyn Distribution>,
        Box::new(Gaussian2D::isotropic(0.2).unwrap()),
    ],
    vec![3.0, 1.0],
)
.unwrap();
assert_eq!(mixture.weights(), &[0.75, 0.25]);
```
*/
pub struct Mixture {
    components: Vec<Box<dyn Distribution>>,
    weights: Vec<f64>,
    origin: Vec<f64>,
    revision: Revision,
}

impl std::fmt::Debug for Mixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mixture")
            .field("components", &self.components.len())
            .field("weights", &self.weights)
            .field("origin", &self.origin)
            .finish()
    }
}

impl Mixture {
    /// Builds a mixture. All components must share the first component's dimension and
    /// there must be exactly one weight per component.
    pub fn new(components: Vec<Box<dyn Distribution>>, weights: Vec<f64>) -> Result<Self> {
        let dim = components
            .first()
            .ok_or(SamplingError::EmptyMixture)?
            .dim();
        for component in &components {
            check_dim(dim, component.dim())?;
        }
        let weights = normalize(weights, components.len())?;
        Ok(Self {
            components,
            weights,
            origin: vec![0.0; dim],
            revision: Revision::default(),
        })
    }

    pub fn components(&self) -> &[Box<dyn Distribution>] {
        &self.components
    }

    /// Swaps in a new component of the same dimension and returns the old one.
    pub fn replace_component(
        &mut self,
        index: usize,
        component: Box<dyn Distribution>,
    ) -> Result<Box<dyn Distribution>> {
        check_dim(self.dim(), component.dim())?;
        let count = self.components.len();
        let slot = self.components.get_mut(index).ok_or_else(|| {
            SamplingError::invalid("index", format!("{index} out of range for {count} components"))
        })?;
        let old = std::mem::replace(slot, component);
        // keeps version() strictly increasing across the swap
        self.revision.advance(old.version().wrapping_add(1));
        Ok(old)
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Replaces the weights, normalizing them to sum to one.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<()> {
        self.weights = normalize(weights, self.components.len())?;
        self.revision.bump();
        Ok(())
    }

    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    pub fn set_origin(&mut self, origin: &[f64]) -> Result<()> {
        check_dim(self.dim(), origin.len())?;
        self.origin = origin.to_vec();
        self.revision.bump();
        Ok(())
    }

    fn weighted(&self) -> impl Iterator<Item = (&Box<dyn Distribution>, f64)> + '_ {
        self.components.iter().zip(self.weights.iter().copied())
    }
}

fn normalize(weights: Vec<f64>, components: usize) -> Result<Vec<f64>> {
    if weights.len() != components {
        return Err(SamplingError::WeightCountMismatch {
            components,
            weights: weights.len(),
        });
    }
    if weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
        return Err(SamplingError::InvalidWeights);
    }
    let sum: f64 = weights.iter().sum();
    if !(sum > 0.0 && sum.is_finite()) {
        return Err(SamplingError::InvalidWeights);
    }
    Ok(weights.into_iter().map(|w| w / sum).collect())
}

impl Distribution for Mixture {
    fn dim(&self) -> usize {
        self.origin.len()
    }

    fn pdf(&self, x: &[f64]) -> f64 {
        let shifted: Vec<f64> = x.iter().zip(&self.origin).map(|(v, o)| v - o).collect();
        self.weighted().map(|(d, w)| w * d.pdf(&shifted)).sum()
    }

    fn min_coords(&self) -> Vec<f64> {
        self.components
            .iter()
            .map(|d| d.min_coords())
            .reduce(|acc, m| acc.iter().zip(&m).map(|(a, b)| a.min(*b)).collect())
            .unwrap_or_default()
    }

    fn max_coords(&self) -> Vec<f64> {
        self.components
            .iter()
            .map(|d| d.max_coords())
            .reduce(|acc, m| acc.iter().zip(&m).map(|(a, b)| a.max(*b)).collect())
            .unwrap_or_default()
    }

    fn e_min(&self) -> f64 {
        energy_from_probability(self.p_max())
    }

    fn e_max(&self) -> f64 {
        energy_from_probability(self.p_min())
    }

    fn p_max(&self) -> f64 {
        self.weighted()
            .map(|(d, w)| w * d.p_max())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    fn p_min(&self) -> f64 {
        self.weighted()
            .map(|(d, w)| w * d.p_min())
            .fold(f64::INFINITY, f64::min)
    }

    fn version(&self) -> u64 {
        self.components
            .iter()
            .fold(self.revision.get(), |acc, d| acc.wrapping_add(d.version()))
    }
}
