//! Acceptance-probability strategies for [`super::MetropolisHastings`].

use crate::sample::probability_from_energy;

/// Energies entering one Metropolis-Hastings decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyTerms {
    /// Target energy at the proposed point.
    pub new: f64,
    /// Target energy at the current point.
    pub old: f64,
    /// Proposal energy of moving from the current point to the proposed one.
    pub forward: f64,
    /// Proposal energy of moving back from the proposed point to the current one.
    pub reverse: f64,
}

/// Maps the energies of a proposed move to an acceptance probability in `[0, 1]`.
pub trait AcceptanceRule {
    fn acceptance_probability(&self, terms: &EnergyTerms) -> f64;
}

/// Metropolis-Hastings ratio evaluated in the energy domain:
/// `min(1, exp(-(E_new - E_old) - (E_reverse - E_forward)))`.
///
/// Stays finite where raw densities underflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnergyMetropolis;

impl AcceptanceRule for EnergyMetropolis {
    fn acceptance_probability(&self, t: &EnergyTerms) -> f64 {
        clamp_probability((-(t.new - t.old) - (t.reverse - t.forward)).exp())
    }
}

/// Metropolis-Hastings ratio evaluated on densities:
/// `min(1, (q_reverse / q_forward) · (p_new / p_old))`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DensityMetropolis;

impl AcceptanceRule for DensityMetropolis {
    fn acceptance_probability(&self, t: &EnergyTerms) -> f64 {
        let q_ratio = probability_from_energy(t.reverse) / probability_from_energy(t.forward);
        let p_ratio = probability_from_energy(t.new) / probability_from_energy(t.old);
        clamp_probability(q_ratio * p_ratio)
    }
}

/// Tempered Metropolis rule `min(1, exp(-(E_new - E_old) / T))`.
///
/// Treats every proposal as symmetric and ignores the forward/reverse terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempered {
    pub temperature: f64,
}

impl Tempered {
    pub fn new(temperature: f64) -> Self {
        Self { temperature }
    }
}

impl AcceptanceRule for Tempered {
    fn acceptance_probability(&self, t: &EnergyTerms) -> f64 {
        clamp_probability((-(t.new - t.old) / self.temperature).exp())
    }
}

/// Caps at one; undefined ratios (`∞ - ∞`, `0 / 0`) never accept.
fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.min(1.0)
    }
}
