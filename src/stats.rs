//! Running acceptance and moment statistics over a stream of samples.

use ndarray::prelude::*;
use ndarray_stats::errors::EmptyInput;
use ndarray_stats::CorrelationExt;
use std::collections::VecDeque;

use crate::distributions::check_dim;
use crate::error::{Result, SamplingError};
use crate::sample::Sample;

/// Number of most recent decisions kept for [`SampleTracker::recent_acceptance_rate`].
pub const ACCEPT_WINDOW: usize = 100;

/// Tracks acceptance counts and the running mean and second moment of accepted values.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTracker {
    dim: usize,
    n: u64,
    n_accepted: u64,
    mean: Array1<f64>,    // dim
    mean_sq: Array1<f64>, // dim
    accept_queue: VecDeque<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerStats {
    pub n: u64,
    pub n_accepted: u64,
    pub p_accept: f64,
    pub p_accept_recent: f64,
    pub mean: Array1<f64>,
    pub sm2: Array1<f64>,
}

impl SampleTracker {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            n: 0,
            n_accepted: 0,
            mean: Array1::zeros(dim),
            mean_sq: Array1::zeros(dim),
            accept_queue: VecDeque::with_capacity(ACCEPT_WINDOW + 1),
        }
    }

    /// Records one step. Only accepted samples enter the moments.
    pub fn observe(&mut self, sample: &Sample) -> Result<()> {
        check_dim(self.dim, sample.dim())?;
        self.n += 1;
        self.accept_queue.push_back(sample.accepted);
        if self.accept_queue.len() > ACCEPT_WINDOW {
            self.accept_queue.pop_front();
        }
        if !sample.accepted {
            return Ok(());
        }

        self.n_accepted += 1;
        let k = self.n_accepted as f64;
        let x = ArrayView1::from_shape(self.dim, &sample.value)?;
        self.mean = (&self.mean * (k - 1.0) + &x) / k;
        self.mean_sq = (&self.mean_sq * (k - 1.0) + &x.mapv(|v| v * v)) / k;
        Ok(())
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn n_accepted(&self) -> u64 {
        self.n_accepted
    }

    /// Fraction of all observed steps that were accepted; zero before any step.
    pub fn acceptance_rate(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.n_accepted as f64 / self.n as f64
        }
    }

    /// Acceptance rate over the last [`ACCEPT_WINDOW`] steps.
    pub fn recent_acceptance_rate(&self) -> f64 {
        if self.accept_queue.is_empty() {
            return 0.0;
        }
        let hits = self.accept_queue.iter().filter(|&&a| a).count();
        hits as f64 / self.accept_queue.len() as f64
    }

    pub fn accepted_mean(&self) -> Result<Array1<f64>> {
        if self.n_accepted == 0 {
            return Err(EmptyInput.into());
        }
        Ok(self.mean.clone())
    }

    /// Unbiased per-coordinate variance of the accepted values.
    pub fn accepted_variance(&self) -> Result<Array1<f64>> {
        if self.n_accepted < 2 {
            return Err(SamplingError::invalid(
                "samples",
                format!("variance needs two accepted samples, have {}", self.n_accepted),
            ));
        }
        let k = self.n_accepted as f64;
        Ok((&self.mean_sq - &self.mean.mapv(|m| m * m)) * k / (k - 1.0))
    }

    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            n: self.n,
            n_accepted: self.n_accepted,
            p_accept: self.acceptance_rate(),
            p_accept_recent: self.recent_acceptance_rate(),
            mean: self.mean.clone(),
            sm2: self
                .accepted_variance()
                .unwrap_or_else(|_| Array1::zeros(self.dim)),
        }
    }
}

/// Stacks the accepted samples into an `n_accepted × dim` matrix.
pub fn accepted_points(samples: &[Sample]) -> Result<Array2<f64>> {
    let accepted: Vec<&Sample> = samples.iter().filter(|s| s.accepted).collect();
    let dim = accepted.first().ok_or(EmptyInput)?.dim();
    let mut flat = Vec::with_capacity(accepted.len() * dim);
    for s in &accepted {
        check_dim(dim, s.dim())?;
        flat.extend_from_slice(&s.value);
    }
    Ok(Array2::from_shape_vec((accepted.len(), dim), flat)?)
}

/// Sample covariance of the rows of `points` (observations × coordinates).
pub fn covariance(points: &Array2<f64>) -> Result<Array2<f64>> {
    if points.nrows() < 2 {
        return Err(SamplingError::invalid(
            "points",
            format!("covariance needs two observations, have {}", points.nrows()),
        ));
    }
    Ok(points.t().cov(1.0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample(x: f64, y: f64, accepted: bool) -> Sample {
        Sample::new(vec![x, y], 1.0, accepted)
    }

    #[test]
    fn moments_use_only_accepted_samples() {
        let mut t = SampleTracker::new(2);
        for s in [
            sample(1.0, 2.0, true),
            sample(100.0, 100.0, false),
            sample(3.0, 6.0, true),
        ] {
            t.observe(&s).unwrap();
        }
        assert_eq!(t.n(), 3);
        assert_eq!(t.n_accepted(), 2);
        assert_abs_diff_eq!(t.acceptance_rate(), 2.0 / 3.0);
        assert_abs_diff_eq!(t.accepted_mean().unwrap(), array![2.0, 4.0], epsilon = 1e-12);
        assert_abs_diff_eq!(
            t.accepted_variance().unwrap(),
            array![2.0, 8.0],
            epsilon = 1e-12
        );
    }

    #[test]
    fn recent_rate_uses_a_sliding_window() {
        let mut t = SampleTracker::new(2);
        for _ in 0..ACCEPT_WINDOW {
            t.observe(&sample(0.0, 0.0, true)).unwrap();
        }
        for _ in 0..ACCEPT_WINDOW / 4 {
            t.observe(&sample(0.0, 0.0, false)).unwrap();
        }
        assert_abs_diff_eq!(t.recent_acceptance_rate(), 0.75);
        assert_abs_diff_eq!(t.acceptance_rate(), 100.0 / 125.0);
        let stats = t.stats();
        assert_eq!(stats.n, 125);
        assert_abs_diff_eq!(stats.p_accept_recent, 0.75);
    }

    #[test]
    fn empty_tracker() {
        let mut t = SampleTracker::new(2);
        assert_eq!(t.acceptance_rate(), 0.0);
        assert_eq!(t.recent_acceptance_rate(), 0.0);
        assert!(matches!(t.accepted_mean(), Err(SamplingError::EmptyInput(_))));
        assert!(t.accepted_variance().is_err());
        assert!(t.observe(&Sample::new(vec![1.0], 1.0, true)).is_err());
        assert_eq!(t.stats().sm2, array![0.0, 0.0]);
    }

    #[test]
    fn covariance_of_accepted_points() {
        let samples = vec![
            sample(0.0, 0.0, true),
            sample(9.0, 9.0, false),
            sample(1.0, 2.0, true),
            sample(2.0, 4.0, true),
        ];
        let points = accepted_points(&samples).unwrap();
        assert_eq!(points.dim(), (3, 2));
        let cov = covariance(&points).unwrap();
        assert_abs_diff_eq!(cov, array![[1.0, 2.0], [2.0, 4.0]], epsilon = 1e-12);

        assert!(accepted_points(&[sample(0.0, 0.0, false)]).is_err());
        assert!(covariance(&points.slice(s![..1, ..]).to_owned()).is_err());
    }
}
