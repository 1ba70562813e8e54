//! Crop rotation scheduling as a discrete quadratic model.
//!
//! A farm has plots, some of them adjacent, and a planning horizon of
//! `time_units` periods that repeats cyclically. Each crop belongs to a
//! family, may only be planted inside its planting window, and occupies its
//! plot for `grow_time` consecutive periods.
//!
//! [`CropRotation`] encodes a [`RotationProblem`] into a [`RotationDqm`] with
//! one variable per `(plot, period)` whose cases are "no crop" and the crops
//! plantable in that period. The model is solved through any
//! [`DqmSampler`](crate::sampler::DqmSampler), and
//! [`CropRotation::validate`] re-checks the decoded schedule against the
//! constraints directly.
//!
//! # Examples
//!
//! ```
//! use u_rotation::rotation::{Crop, CropRotation, RotationProblem};
//! use u_rotation::sampler::{AnnealingSampler, SamplerConfig};
//!
//! let problem = RotationProblem::new(3)
//!     .with_plot("east", ["west"])
//!     .with_plot("west", ["east"])
//!     .with_crop("bean", Crop::new("legume", 1, 3, 2))
//!     .with_crop("pea", Crop::new("legume", 1, 3, 1));
//!
//! let rotation = CropRotation::new(problem);
//! let sampler = AnnealingSampler::new(SamplerConfig::default().with_seed(3));
//! let solution = rotation.solve(&sampler).unwrap();
//! assert!(solution.is_valid());
//! ```

mod encoder;
mod problem;
mod solution;
mod validate;

pub use encoder::{CaseInteraction, CropRotation, ModelStats, RotationDqm};
pub use problem::{Assignment, Crop, CropCase, CropId, Period, PlotId, RotationProblem, VarLabel};
pub use solution::RotationSolution;
pub use validate::{ConstraintSet, Violation};
