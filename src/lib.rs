//! Rejection sampling, Metropolis-Hastings and simulated annealing over 2D distributions.

pub mod core;
pub mod distributions;
pub mod error;
pub mod grid;
pub mod linalg;
pub mod sample;
pub mod samplers;
pub mod stats;
