/*!
# Metropolis–Hastings Sampler

A single random-walk Markov chain that emits every proposal, accepted or not, so a
renderer can show both. The proposal distribution is recentered on the last accepted
sample; the invariant `proposal.origin() == last_sample.value` holds after every step.

Evaluating the reverse proposal density requires moving the proposal to the candidate.
That move is a two-phase mutation: [`MetropolisHastings::recenter_proposal`] moves the
proposal and hands back the previous origin, and
[`MetropolisHastings::revert_proposal`] restores it bit-for-bit when the candidate is
rejected.

```rust
use mini_sampler::distributions::{Gaussian2D, Sampleable, Uniform};
use mini_sampler::samplers::{MetropolisHastings, Sampler};

let proposal = Gaussian2D::isotropic(0.1).unwrap().set_seed(42);
let mut mh = MetropolisHastings::new(Uniform::default(), proposal).set_seed(42);
mh.reset().unwrap();
for _ in 0..10 {
    mh.step().unwrap();
    let last = mh.last_sample().unwrap();
    assert_eq!(mh.sampling_distribution().origin(), last.value.as_slice());
}
```
*/

use rand::prelude::*;
use tracing::{debug, trace};

use super::acceptance::{AcceptanceRule, EnergyMetropolis, EnergyTerms};
use super::Sampler;
use crate::distributions::{uniform_point, Distribution, Sampleable};
use crate::error::Result;
use crate::sample::Sample;

/**
Metropolis–Hastings over a target `D` with proposal `Q`, deciding with rule `A`.

# Type Parameters
- `D`: The target distribution. Must implement [`Distribution`].
- `Q`: The proposal distribution. Must implement [`Sampleable`].
- `A`: The acceptance rule, [`EnergyMetropolis`] unless chosen otherwise.
*/
#[derive(Debug, Clone)]
pub struct MetropolisHastings<D, Q, A = EnergyMetropolis> {
    /// The target distribution we want to explore.
    pub target: D,
    /// The proposal distribution, kept centered on the last accepted sample.
    proposal: Q,
    rule: A,
    last_sample: Option<Sample>,
    /// The random seed.
    pub seed: u64,
    rng: SmallRng,
}

impl<D, Q> MetropolisHastings<D, Q, EnergyMetropolis>
where
    D: Distribution,
    Q: Sampleable,
{
    /// Creates a chain using the energy-domain Metropolis-Hastings rule.
    pub fn new(target: D, proposal: Q) -> Self {
        Self::with_rule(target, proposal, EnergyMetropolis)
    }
}

impl<D, Q, A> MetropolisHastings<D, Q, A>
where
    D: Distribution,
    Q: Sampleable,
    A: AcceptanceRule,
{
    pub fn with_rule(target: D, proposal: Q, rule: A) -> Self {
        let seed = thread_rng().gen::<u64>();
        Self {
            target,
            proposal,
            rule,
            last_sample: None,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Reseeds the random number generator used for acceptance draws and resets.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// The most recently accepted sample, if any.
    pub fn last_sample(&self) -> Option<&Sample> {
        self.last_sample.as_ref()
    }

    pub fn rule(&self) -> &A {
        &self.rule
    }

    pub fn rule_mut(&mut self) -> &mut A {
        &mut self.rule
    }

    /// Mutable access to the proposal, e.g. to change its spread. Recentering it by hand
    /// breaks the chain until the next [`Sampler::reset`].
    pub fn sampling_distribution_mut(&mut self) -> &mut Q {
        &mut self.proposal
    }

    /// Phase one: moves the proposal to `at` and returns the origin it had before.
    pub fn recenter_proposal(&mut self, at: &[f64]) -> Result<Vec<f64>> {
        let previous = self.proposal.origin().to_vec();
        self.proposal.set_origin(at)?;
        Ok(previous)
    }

    /// Phase two on rejection: puts the proposal back where it was.
    pub fn revert_proposal(&mut self, previous: Vec<f64>) -> Result<()> {
        self.proposal.set_origin(&previous)
    }

    fn first_step(&mut self, mut sample: Sample) -> Result<Sample> {
        sample.set_probability(self.target.pdf(&sample.value));
        sample.accepted = true;
        self.proposal.set_origin(&sample.value)?;
        Ok(sample)
    }

    fn chain_step(&mut self, mut sample: Sample, current: &[f64]) -> Result<Sample> {
        let forward = self.proposal.energy(&sample.value);
        let previous = self.recenter_proposal(&sample.value)?;
        let terms = EnergyTerms {
            new: self.target.energy(&sample.value),
            old: self.target.energy(current),
            forward,
            reverse: self.proposal.energy(current),
        };
        let p_accept = self.rule.acceptance_probability(&terms);
        let u: f64 = self.rng.gen();
        sample.accepted = u < p_accept;
        sample.set_energy(terms.new);

        if !sample.accepted {
            self.revert_proposal(previous)?;
        }
        trace!(?terms, p_accept, accepted = sample.accepted, "metropolis step");
        Ok(sample)
    }
}

impl<D, Q, A> Sampler for MetropolisHastings<D, Q, A>
where
    D: Distribution,
    Q: Sampleable,
    A: AcceptanceRule,
{
    type Target = D;
    type Proposal = Q;

    /**
    Performs one Metropolis–Hastings update.

    The first step after a reset accepts its draw unconditionally. Afterwards a candidate
    `s` is drawn around the current point `x`, and the rule receives the target energies
    at `s` and `x` and the proposal energies of `x → s` and `s → x`. An accepted
    candidate becomes the new current point; a rejected one leaves the chain, and the
    proposal, exactly where they were. Both are returned.
    */
    fn step(&mut self) -> Result<Sample> {
        let sample = self.proposal.sample()?;
        let sample = match self.last_sample.take() {
            None => self.first_step(sample)?,
            Some(last) => {
                let result = self.chain_step(sample, &last.value);
                if !matches!(&result, Ok(s) if s.accepted) {
                    self.last_sample = Some(last);
                }
                result?
            }
        };
        if sample.probability() == 0.0 {
            debug!(value = ?sample.value, "target density is zero at sample");
        }
        if sample.accepted {
            self.last_sample = Some(sample.clone());
        }
        Ok(sample)
    }

    /// Forgets the chain and recenters the proposal at a uniform draw over the target's
    /// bounds. Fails with `InvalidBounds` if that box is unbounded.
    fn reset(&mut self) -> Result<()> {
        self.last_sample = None;
        let start = uniform_point(
            &mut self.rng,
            &self.target.min_coords(),
            &self.target.max_coords(),
        )?;
        debug!(?start, "resetting chain");
        self.proposal.set_origin(&start)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{Banana2D, Gaussian2D, PrecisionGaussian2D, Uniform};
    use crate::samplers::DensityMetropolis;
    use ndarray::arr2;

    const SEED: u64 = 42;

    fn proposal(std: f64) -> Gaussian2D {
        Gaussian2D::isotropic(std).unwrap().set_seed(SEED)
    }

    #[test]
    fn first_step_after_reset_is_accepted() {
        let mut mh = MetropolisHastings::new(Banana2D::default(), proposal(0.3)).set_seed(SEED);
        for _ in 0..5 {
            mh.reset().unwrap();
            assert!(mh.last_sample().is_none());
            let s = mh.step().unwrap();
            assert!(s.accepted);
            assert_eq!(mh.last_sample(), Some(&s));
            assert_eq!(s.probability(), mh.target().pdf(&s.value));
            for _ in 0..20 {
                mh.step().unwrap();
            }
        }
    }

    #[test]
    fn reset_recenters_inside_target_bounds() {
        let target = Uniform::new(vec![2.0, -3.0], vec![2.5, -2.0]).unwrap();
        let q = proposal(0.1)
            .with_bounds(vec![0.0, -5.0], vec![5.0, 0.0])
            .unwrap();
        let mut mh = MetropolisHastings::new(target, q).set_seed(SEED);
        for _ in 0..100 {
            mh.reset().unwrap();
            let o = mh.sampling_distribution().origin();
            assert!((2.0..=2.5).contains(&o[0]) && (-3.0..=-2.0).contains(&o[1]));
        }
        // idempotent before any step
        mh.reset().unwrap();
        mh.reset().unwrap();
        assert!(mh.last_sample().is_none());
    }

    #[test]
    fn reset_on_unbounded_target_is_an_error() {
        let inf = f64::INFINITY;
        let target = Gaussian2D::isotropic(1.0)
            .unwrap()
            .with_bounds(vec![-inf, -inf], vec![inf, inf])
            .unwrap();
        let mut mh = MetropolisHastings::new(target, proposal(0.1)).set_seed(SEED);
        assert!(matches!(
            mh.reset(),
            Err(crate::error::SamplingError::InvalidBounds { axis: 0, .. })
        ));

        let wide = Banana2D::default()
            .with_bounds(vec![-1e308, -1e308], vec![1e308, 1e308])
            .unwrap();
        let mut mh = MetropolisHastings::new(wide, proposal(0.1)).set_seed(SEED);
        assert!(mh.reset().is_err());
        assert!(mh.last_sample().is_none());
    }

    #[test]
    fn proposal_follows_last_accepted_sample() {
        let target = PrecisionGaussian2D::new(arr2(&[[40.0, 0.0], [0.0, 40.0]]), [0.3, 0.3]).unwrap();
        let mut mh = MetropolisHastings::new(target, proposal(0.5)).set_seed(SEED);
        mh.reset().unwrap();
        let mut rejected = 0;
        for _ in 0..1_000 {
            let s = mh.step().unwrap();
            let last = mh.last_sample().unwrap().clone();
            if s.accepted {
                assert_eq!(last, s);
            } else {
                rejected += 1;
                assert_ne!(last.value, s.value);
            }
            let origin: Vec<u64> = mh
                .sampling_distribution()
                .origin()
                .iter()
                .map(|v| v.to_bits())
                .collect();
            let expected: Vec<u64> = last.value.iter().map(|v| v.to_bits()).collect();
            assert_eq!(origin, expected);
        }
        assert!(rejected > 100, "expected many rejections, got {rejected}");
    }

    #[test]
    fn revert_restores_bit_identical_origin() {
        let mut mh = MetropolisHastings::new(Uniform::default(), proposal(0.1)).set_seed(SEED);
        mh.reset().unwrap();
        let before: Vec<u64> = mh
            .sampling_distribution()
            .origin()
            .iter()
            .map(|v| v.to_bits())
            .collect();
        let previous = mh.recenter_proposal(&[0.123456789, -0.987654321]).unwrap();
        assert_eq!(mh.sampling_distribution().origin(), &[0.123456789, -0.987654321]);
        mh.revert_proposal(previous).unwrap();
        let after: Vec<u64> = mh
            .sampling_distribution()
            .origin()
            .iter()
            .map(|v| v.to_bits())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn uniform_target_with_uniform_proposal_always_accepts() {
        let q = Uniform::default().set_seed(SEED);
        let mut mh = MetropolisHastings::new(Uniform::default(), q).set_seed(SEED);
        mh.reset().unwrap();
        for _ in 0..500 {
            assert!(mh.step().unwrap().accepted);
        }
    }

    #[test]
    fn density_rule_makes_the_same_decisions() {
        let run = |density: bool| -> Vec<bool> {
            let target = Banana2D::default();
            let q = proposal(0.3);
            let mut out = Vec::new();
            if density {
                let mut mh = MetropolisHastings::with_rule(target, q, DensityMetropolis).set_seed(SEED);
                mh.reset().unwrap();
                for _ in 0..300 {
                    out.push(mh.step().unwrap().accepted);
                }
            } else {
                let mut mh = MetropolisHastings::new(target, q).set_seed(SEED);
                mh.reset().unwrap();
                for _ in 0..300 {
                    out.push(mh.step().unwrap().accepted);
                }
            }
            out
        };
        let energy = run(false);
        assert_eq!(energy, run(true));
        assert!(energy.iter().any(|a| !a));
    }

    #[test]
    fn set_target_does_not_reset() {
        let mut mh = MetropolisHastings::new(Banana2D::default(), proposal(0.2)).set_seed(SEED);
        mh.reset().unwrap();
        mh.step().unwrap();
        let mut other = Banana2D::default();
        other.set_bend(2.0).unwrap();
        mh.set_target(other);
        assert!(mh.last_sample().is_some());
        assert_eq!(mh.target().bend(), 2.0);
        mh.target_mut().set_bend(1.0).unwrap();
        assert_eq!(mh.target().bend(), 1.0);
    }

    #[test]
    fn stalled_proposal_keeps_chain_state() {
        let q = Gaussian2D::isotropic(0.1)
            .unwrap()
            .with_max_retries(10)
            .set_seed(SEED);
        let mut mh = MetropolisHastings::new(Uniform::default(), q).set_seed(SEED);
        mh.reset().unwrap();
        let first = mh.step().unwrap();
        mh.sampling_distribution_mut()
            .set_bounds(vec![10.0, 10.0], vec![11.0, 11.0])
            .unwrap();
        assert!(mh.step().is_err());
        assert_eq!(mh.last_sample(), Some(&first));
    }
}
