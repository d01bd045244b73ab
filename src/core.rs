//! Driver loops that reset a sampler and collect a fixed number of steps.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::error::Result;
use crate::sample::Sample;
use crate::samplers::Sampler;

/// Resets `sampler` and collects `n_steps` samples, accepted and rejected alike.
pub fn run<S: Sampler>(sampler: &mut S, n_steps: usize) -> Result<Vec<Sample>> {
    sampler.reset()?;
    (0..n_steps).map(|_| sampler.step()).collect()
}

/// Like [`run`], advancing `pb` once per step.
pub fn run_with_progress<S: Sampler>(
    sampler: &mut S,
    n_steps: usize,
    pb: &ProgressBar,
) -> Result<Vec<Sample>> {
    sampler.reset()?;
    pb.set_length(n_steps as u64);

    let mut out = Vec::with_capacity(n_steps);
    for _ in 0..n_steps {
        out.push(sampler.step()?);
        pb.inc(1);
    }
    Ok(out)
}

/// Runs with a terminal progress bar and logs the overall acceptance rate.
pub fn run_progress<S: Sampler>(sampler: &mut S, n_steps: usize) -> Result<Vec<Sample>> {
    let pb = ProgressBar::new(n_steps as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let samples = run_with_progress(sampler, n_steps, &pb)?;
    let accepted = samples.iter().filter(|s| s.accepted).count();
    pb.finish_with_message("Done!");
    info!(
        n_steps,
        accepted,
        rate = accepted as f64 / n_steps.max(1) as f64,
        "sampling finished"
    );
    Ok(samples)
}
