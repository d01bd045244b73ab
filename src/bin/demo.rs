//! Runs the three samplers on the banana target and prints summary statistics.
//!
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=mini_sampler=trace`), defaulting to `info`.

use std::error::Error;

use mini_sampler::core::run_progress;
use mini_sampler::distributions::{Banana2D, Distribution, Gaussian2D, Sampleable, Uniform};
use mini_sampler::grid::density_grid;
use mini_sampler::sample::Sample;
use mini_sampler::samplers::{MetropolisHastings, RejectionSampler, Sampler, SimulatedAnnealer};
use mini_sampler::stats::{accepted_points, covariance, SampleTracker};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn summarize(name: &str, samples: &[Sample]) -> Result<(), Box<dyn Error>> {
    let mut tracker = SampleTracker::new(2);
    for s in samples {
        tracker.observe(s)?;
    }
    let stats = tracker.stats();
    println!("{name}");
    println!(
        "  steps: {}, accepted: {} ({:.1}%, last {} steps: {:.1}%)",
        stats.n,
        stats.n_accepted,
        100.0 * stats.p_accept,
        mini_sampler::stats::ACCEPT_WINDOW,
        100.0 * stats.p_accept_recent
    );
    println!("  mean: {:.3}", stats.mean);
    if let Ok(cov) = accepted_points(samples).and_then(|p| covariance(&p)) {
        println!("  covariance:\n{:.4}", cov);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    const STEPS: usize = 50_000;
    const SEED: u64 = 42;

    init_tracing();

    let target = Banana2D::default();
    let heights = density_grid(&target, (41, 41))?;
    info!(
        p_max = target.p_max(),
        p_min = target.p_min(),
        grid_peak = heights.iter().copied().fold(0.0, f64::max),
        "banana target"
    );

    let mut rs = RejectionSampler::new(target.clone(), Uniform::default().set_seed(SEED))
        .set_seed(SEED);
    let c = rs.fit_envelope();
    info!(c, "fitted rejection envelope");
    summarize("rejection", &run_progress(&mut rs, STEPS)?)?;

    let proposal = Gaussian2D::isotropic(0.1)?.set_seed(SEED);
    let mut mh = MetropolisHastings::new(target.clone(), proposal).set_seed(SEED);
    summarize("metropolis-hastings", &run_progress(&mut mh, STEPS)?)?;

    let proposal = Gaussian2D::isotropic(0.1)?.set_seed(SEED);
    let mut sa = SimulatedAnnealer::new(target, proposal).set_seed(SEED);
    let samples = run_progress(&mut sa, STEPS)?;
    summarize("simulated annealing", &samples)?;
    if let Some(last) = sa.last_sample() {
        println!(
            "  final temperature: {:.3e}, settled at {:.3?} (mode {:.3?})",
            sa.temperature(),
            last.value,
            sa.target().mode()
        );
    }
    Ok(())
}
