//! Sampler contract: samples, sample sets and the [`DqmSampler`] trait.

use crate::dqm::DiscreteQuadraticModel;
use crate::error::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One full assignment of a [`DiscreteQuadraticModel`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// Selected case index per variable, in variable index order.
    pub cases: Vec<usize>,
    /// Energy of the assignment. Lower is better.
    pub energy: f64,
}

/// Samples ordered by ascending energy.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Builds a sample set, sorting by energy. Equal energies keep their
    /// input order.
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by(|a, b| a.energy.total_cmp(&b.energy));
        Self { samples }
    }

    /// The lowest-energy sample.
    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    /// All samples, best first.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the set holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// A backend that minimizes a [`DiscreteQuadraticModel`].
///
/// Implementors may wrap remote or hardware solvers; the crate ships
/// [`AnnealingSampler`](super::AnnealingSampler) as an in-process backend.
/// Returned sets should be non-empty; callers treat an empty set as
/// [`Error::EmptySampleSet`](crate::error::Error::EmptySampleSet).
pub trait DqmSampler {
    /// Samples the model and returns candidates, best first.
    fn sample(&self, dqm: &DiscreteQuadraticModel) -> Result<SampleSet>;
}
