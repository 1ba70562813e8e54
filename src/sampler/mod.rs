//! Samplers for discrete quadratic models.
//!
//! The [`DqmSampler`] trait is the seam to any optimization backend: it
//! receives a [`DiscreteQuadraticModel`](crate::dqm::DiscreteQuadraticModel)
//! and returns a [`SampleSet`] ordered by ascending energy.
//! [`AnnealingSampler`] is a local simulated-annealing backend.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"

mod config;
mod runner;
mod types;

pub use config::{CoolingSchedule, SamplerConfig};
pub use runner::AnnealingSampler;
pub use types::{DqmSampler, Sample, SampleSet};
