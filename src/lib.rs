//! Crop rotation planning with discrete quadratic models.
//!
//! - **DQM**: an integer-indexed discrete quadratic model and a
//!   label-addressed wrapper, [`CaseLabelDqm`](dqm::CaseLabelDqm), that lets
//!   callers name variables and cases with any hashable values.
//! - **Sampler**: the [`DqmSampler`](sampler::DqmSampler) backend seam and a
//!   simulated-annealing implementation.
//! - **Rotation**: the periodic crop rotation encoder, its constraint
//!   validator, and solution evaluation.
//!
//! # Architecture
//!
//! The encoder is a pure, deterministic transformation from a validated
//! problem to a model. All search happens behind `DqmSampler`, so the same
//! model can be handed to a local annealer or to a remote solver.

pub mod dqm;
pub mod error;
pub mod rotation;
pub mod sampler;
