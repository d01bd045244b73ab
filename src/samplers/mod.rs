/*!
Sampler state machines that turn a target and a proposal distribution into a stream of
accept/reject decisions.

All samplers implement [`Sampler`]: a driver assigns the target, calls
[`Sampler::reset`], then calls [`Sampler::step`] once per emitted [`Sample`].
Assigning a target never resets a sampler on its own.

- [`RejectionSampler`]: independent draws from a fixed envelope.
- [`MetropolisHastings`]: a random-walk chain whose proposal follows the last accepted
  sample; the acceptance formula is a pluggable [`AcceptanceRule`].
- [`SimulatedAnnealer`]: a Metropolis-Hastings chain with a tempered rule and a
  geometric cooling schedule.

# Example

```rust
use mini_sampler::distributions::{Banana2D, Gaussian2D, Sampleable};
use mini_sampler::samplers::{MetropolisHastings, Sampler};

let proposal = Gaussian2D::isotropic(0.2).unwrap().set_seed(3);
let mut mh = MetropolisHastings::new(Banana2D::default(), proposal).set_seed(3);
mh.reset().unwrap();

let first = mh.step().unwrap();
assert!(first.accepted);
for _ in 0..100 {
    let s = mh.step().unwrap();
    assert_eq!(s.value.len(), 2);
}
```
*/

mod acceptance;
mod annealing;
mod metropolis_hastings;
mod rejection;

pub use acceptance::{AcceptanceRule, DensityMetropolis, EnergyMetropolis, EnergyTerms, Tempered};
pub use annealing::{SimulatedAnnealer, DEFAULT_COOLING_RATE, INITIAL_TEMPERATURE};
pub use metropolis_hastings::MetropolisHastings;
pub use rejection::RejectionSampler;

use crate::distributions::{Distribution, Sampleable};
use crate::error::Result;
use crate::sample::Sample;

/// Common interface of all samplers.
pub trait Sampler {
    type Target: Distribution;
    type Proposal: Sampleable;

    /// Advances by exactly one proposal/decision and returns the proposed sample,
    /// accepted or not.
    fn step(&mut self) -> Result<Sample>;

    /// Clears retained state. Idempotent and valid before the first step.
    fn reset(&mut self) -> Result<()>;

    /// The distribution candidates are drawn from.
    fn sampling_distribution(&self) -> &Self::Proposal;

    fn target(&self) -> &Self::Target;

    fn target_mut(&mut self) -> &mut Self::Target;

    /// Replaces the target. Call [`Sampler::reset`] afterwards.
    fn set_target(&mut self, target: Self::Target);
}
