/*!
The record emitted by every sampler step.

A [`Sample`] keeps its probability and energy synchronized: setting one recomputes the
other (`energy = -ln(probability)`, `probability = exp(-energy)`). A probability of zero
maps to an energy of `+∞`.

```rust
use mini_sampler::sample::Sample;

let mut s = Sample::new(vec![0.0, 0.5], 0.25, false);
assert!((s.energy() - 4.0_f64.ln()).abs() < 1e-12);

s.set_energy(0.0);
assert_eq!(s.probability(), 1.0);
```
*/

/// Converts a density into an energy, mapping zero density to `+∞`.
pub fn energy_from_probability(p: f64) -> f64 {
    if p == 0.0 {
        f64::INFINITY
    } else {
        -p.ln()
    }
}

/// Converts an energy back into a density.
pub fn probability_from_energy(e: f64) -> f64 {
    (-e).exp()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Location of the sample in `dim`-dimensional space.
    pub value: Vec<f64>,
    /// Whether the sampler's acceptance rule kept this sample.
    pub accepted: bool,
    probability: f64,
    energy: f64,
}

impl Sample {
    pub fn new(value: Vec<f64>, probability: f64, accepted: bool) -> Self {
        Self {
            value,
            accepted,
            probability,
            energy: energy_from_probability(probability),
        }
    }

    /// Builds a sample from its energy instead of its density.
    pub fn from_energy(value: Vec<f64>, energy: f64, accepted: bool) -> Self {
        Self {
            value,
            accepted,
            probability: probability_from_energy(energy),
            energy,
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn set_probability(&mut self, probability: f64) {
        self.probability = probability;
        self.energy = energy_from_probability(probability);
    }

    pub fn set_energy(&mut self, energy: f64) {
        self.energy = energy;
        self.probability = probability_from_energy(energy);
    }

    pub fn dim(&self) -> usize {
        self.value.len()
    }
}
