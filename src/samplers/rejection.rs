/*!
# Rejection Sampler

Draws independent candidates from a proposal distribution `q` and keeps each one with
probability `p(s) / (c·q(s))`. With an envelope `c` such that `c·q ≥ p` everywhere the
accepted samples follow the target exactly; [`RejectionSampler::fit_envelope`] picks
`c = p_max / q_min`, which satisfies that whenever the target's density extrema are exact.

```rust
use mini_sampler::distributions::{Gaussian2D, Sampleable, Uniform};
use mini_sampler::samplers::{RejectionSampler, Sampler};

let target = Gaussian2D::isotropic(1.0).unwrap();
let proposal = Uniform::default().set_seed(1);
let mut rs = RejectionSampler::new(target, proposal).set_seed(1);
rs.fit_envelope();

let accepted = (0..1_000).filter(|_| rs.step().unwrap().accepted).count();
assert!(accepted > 600 && accepted < 850);
```
*/

use rand::prelude::*;
use tracing::{debug, trace};

use super::Sampler;
use crate::distributions::{Distribution, Sampleable};
use crate::error::{Result, SamplingError};
use crate::sample::Sample;

/// Rejection sampler over a target `D` with a fixed proposal `Q`.
#[derive(Debug, Clone)]
pub struct RejectionSampler<D, Q> {
    pub target: D,
    proposal: Q,
    envelope: f64,
    pub seed: u64,
    rng: SmallRng,
}

impl<D, Q> RejectionSampler<D, Q>
where
    D: Distribution,
    Q: Sampleable,
{
    /// Creates a sampler with envelope constant `c = 1`.
    pub fn new(target: D, proposal: Q) -> Self {
        let seed = thread_rng().gen::<u64>();
        Self {
            target,
            proposal,
            envelope: 1.0,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn with_envelope(mut self, c: f64) -> Result<Self> {
        self.set_envelope(c)?;
        Ok(self)
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// The envelope constant `c`.
    pub fn envelope(&self) -> f64 {
        self.envelope
    }

    pub fn set_envelope(&mut self, c: f64) -> Result<()> {
        if !(c > 0.0 && c.is_finite()) {
            return Err(SamplingError::invalid(
                "envelope",
                format!("must be positive and finite, got {c}"),
            ));
        }
        self.envelope = c;
        Ok(())
    }

    /// Sets `c = target.p_max() / proposal.p_min()` and returns it. Leaves `c` unchanged
    /// when that ratio is not a positive finite number.
    pub fn fit_envelope(&mut self) -> f64 {
        let c = self.target.p_max() / self.proposal.p_min();
        if self.set_envelope(c).is_err() {
            trace!(c, "cannot fit envelope, keeping {}", self.envelope);
        }
        self.envelope
    }

    pub fn sampling_distribution_mut(&mut self) -> &mut Q {
        &mut self.proposal
    }
}

impl<D, Q> Sampler for RejectionSampler<D, Q>
where
    D: Distribution,
    Q: Sampleable,
{
    type Target = D;
    type Proposal = Q;

    /// Draws `s ~ q` and accepts it iff `u < p(s) / (c·q(s))` for `u ~ U[0, 1)`. The
    /// returned sample carries the target density.
    fn step(&mut self) -> Result<Sample> {
        let mut sample = self.proposal.sample()?;
        let q = sample.probability();
        let p = self.target.pdf(&sample.value);
        let u: f64 = self.rng.gen();
        sample.accepted = u < p / (self.envelope * q);
        sample.set_probability(p);
        if p == 0.0 {
            debug!(value = ?sample.value, "target density is zero at sample");
        }
        trace!(p, q, u, accepted = sample.accepted, "rejection step");
        Ok(sample)
    }

    /// Draws are independent, so there is nothing to forget.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    fn sampling_distribution(&self) -> &Q {
        &self.proposal
    }

    fn target(&self) -> &D {
        &self.target
    }

    fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    fn set_target(&mut self, target: D) {
        self.target = target;
    }
}
