//! Discrete quadratic models.
//!
//! A discrete quadratic model (DQM) has variables that each select exactly
//! one of a finite set of cases, linear biases per case, and pairwise biases
//! between cases of different variables. Samplers minimize its energy.
//!
//! # Key Components
//!
//! - [`DiscreteQuadraticModel`]: integer-indexed storage, the payload handed
//!   to a [`DqmSampler`](crate::sampler::DqmSampler).
//! - [`CaseLabelDqm`]: addresses variables and cases by domain labels and
//!   translates samples back into label space.

mod labeled;
mod model;

pub use labeled::{CaseLabelDqm, Label};
pub use model::DiscreteQuadraticModel;
