//! Simulated annealing on top of the Metropolis-Hastings chain.

use tracing::{debug, trace};

use super::acceptance::Tempered;
use super::{MetropolisHastings, Sampler};
use crate::distributions::{Distribution, Sampleable};
use crate::error::{Result, SamplingError};
use crate::sample::Sample;

/// Temperature multiplier applied after every step.
pub const DEFAULT_COOLING_RATE: f64 = 0.999;

/// Temperature restored by [`Sampler::reset`].
pub const INITIAL_TEMPERATURE: f64 = 1.0;

/**
A Metropolis-Hastings chain whose acceptance is `min(1, exp(-(E_new - E_old) / T))` and
whose temperature `T` decays geometrically, `T ← T·rate`, after every step. As `T → 0`
uphill moves stop being accepted and the chain settles into a low-energy region.

```rust
use mini_sampler::distributions::{Banana2D, Gaussian2D, Sampleable};
use mini_sampler::samplers::{Sampler, SimulatedAnnealer};

let proposal = Gaussian2D::isotropic(0.1).unwrap().set_seed(0);
let mut sa = SimulatedAnnealer::new(Banana2D::default(), proposal).set_seed(0);
sa.reset().unwrap();
for _ in 0..3 {
    sa.step().unwrap();
}
assert!((sa.temperature() - 0.999_f64.powi(3)).abs() < 1e-15);
```
*/
#[derive(Debug, Clone)]
pub struct SimulatedAnnealer<D, Q> {
    chain: MetropolisHastings<D, Q, Tempered>,
    cooling_rate: f64,
}

impl<D, Q> SimulatedAnnealer<D, Q>
where
    D: Distribution,
    Q: Sampleable,
{
    pub fn new(target: D, proposal: Q) -> Self {
        Self {
            chain: MetropolisHastings::with_rule(
                target,
                proposal,
                Tempered::new(INITIAL_TEMPERATURE),
            ),
            cooling_rate: DEFAULT_COOLING_RATE,
        }
    }

    /// Sets the per-step cooling factor, which must lie in `(0, 1]`.
    pub fn with_cooling_rate(mut self, rate: f64) -> Result<Self> {
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(SamplingError::invalid(
                "cooling_rate",
                format!("must lie in (0, 1], got {rate}"),
            ));
        }
        self.cooling_rate = rate;
        Ok(self)
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.chain = self.chain.set_seed(seed);
        self
    }

    pub fn temperature(&self) -> f64 {
        self.chain.rule().temperature
    }

    /// Overrides the current temperature until the next reset.
    pub fn set_temperature(&mut self, temperature: f64) -> Result<()> {
        if !(temperature > 0.0 && temperature.is_finite()) {
            return Err(SamplingError::invalid(
                "temperature",
                format!("must be positive and finite, got {temperature}"),
            ));
        }
        self.chain.rule_mut().temperature = temperature;
        Ok(())
    }

    pub fn cooling_rate(&self) -> f64 {
        self.cooling_rate
    }

    pub fn last_sample(&self) -> Option<&Sample> {
        self.chain.last_sample()
    }

    pub fn sampling_distribution_mut(&mut self) -> &mut Q {
        self.chain.sampling_distribution_mut()
    }
}

impl<D, Q> Sampler for SimulatedAnnealer<D, Q>
where
    D: Distribution,
    Q: Sampleable,
{
    type Target = D;
    type Proposal = Q;

    /// One tempered chain step at the current temperature, then one cooling step.
    fn step(&mut self) -> Result<Sample> {
        let sample = self.chain.step()?;
        let rule = self.chain.rule_mut();
        rule.temperature *= self.cooling_rate;
        trace!(temperature = rule.temperature, "cooled");
        Ok(sample)
    }

    fn reset(&mut self) -> Result<()> {
        self.chain.reset()?;
        self.chain.rule_mut().temperature = INITIAL_TEMPERATURE;
        debug!(temperature = INITIAL_TEMPERATURE, "annealer reset");
        Ok(())
    }

    fn sampling_distribution(&self) -> &Q {
        self.chain.sampling_distribution()
    }

    fn target(&self) -> &D {
        self.chain.target()
    }

    fn target_mut(&mut self) -> &mut D {
        self.chain.target_mut()
    }

    fn set_target(&mut self, target: D) {
        self.chain.set_target(target);
    }
}
