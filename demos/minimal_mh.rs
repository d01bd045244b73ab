use mini_sampler::core::run;
use mini_sampler::distributions::{Gaussian2D, Sampleable};
use mini_sampler::samplers::{MetropolisHastings, Sampler};
use ndarray::arr2;

fn main() {
    let target = Gaussian2D::new(arr2(&[[1.0, 0.0], [0.0, 1.0]]), [0.0, 0.0])
        .unwrap()
        .with_bounds(vec![-5.0, -5.0], vec![5.0, 5.0])
        .unwrap();
    let proposal = Gaussian2D::isotropic(0.5).unwrap().set_seed(42);

    let mut mh = MetropolisHastings::new(target, proposal).set_seed(42);

    // Every proposal is returned, accepted or not
    let samples = run(&mut mh, 1000).unwrap();
    assert_eq!(samples.len(), 1000);

    // The proposal sits on the last accepted sample
    let last = mh.last_sample().unwrap();
    assert_eq!(mh.sampling_distribution().origin(), last.value.as_slice());

    let accepted = samples.iter().filter(|s| s.accepted).count();
    println!("accepted {accepted} of {} proposals", samples.len());
}
