//! Solving a rotation problem with a sampler and evaluating the result.

use super::encoder::{CropRotation, RotationDqm};
use super::problem::{Assignment, CropId, VarLabel};
use super::validate::Violation;
use crate::error::{Error, Result};
use crate::sampler::{DqmSampler, Sample};

/// A decoded and evaluated rotation schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationSolution {
    /// Selected case of every variable.
    pub assignment: Assignment,
    /// Model energy reported by the sampler.
    pub energy: f64,
    /// Fraction of plot-periods occupied by a growing crop.
    pub utilization: f64,
    /// Violated constraints; empty when the schedule is feasible.
    pub violations: Vec<Violation>,
}

impl RotationSolution {
    /// Whether the schedule satisfies every constraint.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Planting decisions, ordered by plot and then period.
    pub fn planted(&self) -> Vec<(&VarLabel, &CropId)> {
        let mut planted: Vec<_> = self
            .assignment
            .iter()
            .filter_map(|(var, crop)| crop.as_ref().map(|c| (var, c)))
            .collect();
        planted.sort();
        planted
    }
}

impl CropRotation {
    /// Fraction of the `plots × time_units` plot-periods covered by the
    /// crops planted in `assignment`.
    pub fn utilization(&self, assignment: &Assignment) -> f64 {
        let capacity = self.problem().num_plots() as f64 * f64::from(self.problem().time_units);
        if capacity == 0.0 {
            return 0.0;
        }
        let occupied: u64 = assignment
            .values()
            .flatten()
            .map(|crop| u64::from(self.grow_time(crop)))
            .sum();
        occupied as f64 / capacity
    }

    /// Translates an index-space sample of `dqm` into a checked solution.
    pub fn decode(&self, dqm: &RotationDqm, sample: &Sample) -> Result<RotationSolution> {
        let raw = dqm.raw_sample(sample)?;
        let assignment = dqm.map_sample(&raw)?;
        let utilization = self.utilization(&assignment);
        let violations = self.validate(&assignment);
        Ok(RotationSolution {
            assignment,
            energy: sample.energy,
            utilization,
            violations,
        })
    }

    /// Builds the model, samples it and decodes the best sample.
    ///
    /// # Errors
    /// Model construction and decoding errors, sampler errors, and
    /// [`Error::EmptySampleSet`] when the sampler returns nothing.
    pub fn solve<S: DqmSampler + ?Sized>(&self, sampler: &S) -> Result<RotationSolution> {
        let dqm = self.build()?;
        let samples = sampler.sample(dqm.dqm())?;
        let best = samples.first().ok_or(Error::EmptySampleSet)?;
        let solution = self.decode(&dqm, best)?;

        tracing::info!(
            energy = solution.energy,
            utilization = solution.utilization,
            planted = solution.planted().len(),
            "crop rotation solved"
        );
        for violation in &solution.violations {
            tracing::warn!(%violation, "solution is invalid");
        }
        Ok(solution)
    }

    /// Builds the model, samples it and decodes every sample, best first.
    pub fn solve_all<S: DqmSampler + ?Sized>(&self, sampler: &S) -> Result<Vec<RotationSolution>> {
        let dqm = self.build()?;
        let samples = sampler.sample(dqm.dqm())?;
        if samples.is_empty() {
            return Err(Error::EmptySampleSet);
        }
        samples.iter().map(|s| self.decode(&dqm, s)).collect()
    }
}
